//! Batch reconciliation.
//!
//! Pages through every record of the selected entities and pushes each page
//! to the provider's batch capability. Pagination is offset based and stops
//! at the first empty page; records moving between pages during a run may be
//! skipped or sent twice.

mod reporter;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use merchant_search_repository::BatchIndexProvider;
use tracing::{error, info, instrument};

use crate::entities::EntitySynchronizer;
use crate::errors::BatchError;
use crate::selector::ProviderSelector;

pub use reporter::{BatchReport, BatchReporter, LogReporter, ReportLevel};

/// Page size used when none is given.
pub const DEFAULT_PER_PAGE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMethod {
    /// Upsert every record.
    Update,
    /// Remove every record.
    Delete,
}

impl FromStr for BatchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown batch method '{}'", other)),
        }
    }
}

impl fmt::Display for BatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => f.write_str("update"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchTarget {
    All,
    Entity(String),
}

impl From<&str> for BatchTarget {
    fn from(value: &str) -> Self {
        match value {
            "all" => Self::All,
            slug => Self::Entity(slug.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCommand {
    pub method: BatchMethod,
    pub target: BatchTarget,
    /// Provider to run against instead of the active one.
    pub provider: Option<String>,
    pub per_page: usize,
}

impl BatchCommand {
    pub fn new(method: BatchMethod, target: BatchTarget) -> Self {
        Self {
            method,
            target,
            provider: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub items: usize,
    pub skipped_entities: Vec<String>,
}

/// Drives batch runs over the loaded entities.
pub struct BatchReconciler {
    synchronizers: Vec<Arc<EntitySynchronizer>>,
    selector: Arc<ProviderSelector>,
}

impl BatchReconciler {
    pub fn new(
        synchronizers: Vec<Arc<EntitySynchronizer>>,
        selector: Arc<ProviderSelector>,
    ) -> Self {
        Self {
            synchronizers,
            selector,
        }
    }

    /// Run a batch command.
    ///
    /// Unknown or disabled entities are reported as warnings and skipped. A
    /// provider without batch support aborts the run. A failing page is
    /// reported and the run moves on to the next page.
    #[instrument(skip(self, reporter), fields(method = %command.method, per_page = command.per_page))]
    pub async fn run(
        &self,
        command: &BatchCommand,
        reporter: &dyn BatchReporter,
    ) -> Result<BatchSummary, BatchError> {
        let override_provider = match &command.provider {
            Some(name) => Some(self.selector.switch_provider(name)?),
            None => None,
        };

        let chosen = override_provider
            .clone()
            .unwrap_or_else(|| self.selector.provider());
        if chosen.as_batch().is_none() {
            return Err(BatchError::NotBatchable(chosen.slug().to_string()));
        }

        let targets: Vec<String> = match &command.target {
            BatchTarget::All => self
                .synchronizers
                .iter()
                .map(|sync| sync.slug().to_string())
                .collect(),
            BatchTarget::Entity(slug) => vec![slug.clone()],
        };

        let mut summary = BatchSummary::default();
        for slug in targets {
            let Some(loaded) = self.synchronizers.iter().find(|sync| sync.slug() == slug) else {
                reporter.warning(&format!(
                    "Entity '{}' not found or not enabled. Skipping.",
                    slug
                ));
                summary.skipped_entities.push(slug);
                continue;
            };

            let synchronizer = match &override_provider {
                Some(provider) => Arc::new(loaded.with_provider(provider.clone())),
                None => loaded.clone(),
            };

            let provider = synchronizer.provider().clone();
            let Some(batch) = provider.as_batch() else {
                return Err(BatchError::NotBatchable(provider.slug().to_string()));
            };

            info!(entity = %slug, provider = provider.slug(), "Reconciling entity");
            self.reconcile(&synchronizer, batch, command, reporter, &mut summary)
                .await;
        }

        Ok(summary)
    }

    async fn reconcile(
        &self,
        synchronizer: &EntitySynchronizer,
        batch: &dyn BatchIndexProvider,
        command: &BatchCommand,
        reporter: &dyn BatchReporter,
        summary: &mut BatchSummary,
    ) {
        let slug = synchronizer.slug();
        let collection = synchronizer.entity().descriptor().collection();
        let mut page = 1;

        loop {
            let (count, result) = match command.method {
                BatchMethod::Update => {
                    let items = match synchronizer.get_items(page, command.per_page).await {
                        Ok(items) => items,
                        Err(e) => {
                            reporter.error(&format!(
                                "Listing page {} of {} items failed: {}",
                                page, slug, e
                            ));
                            return;
                        }
                    };
                    if items.is_empty() {
                        break;
                    }
                    (items.len(), batch.batch_update_items(&items, collection).await)
                }
                BatchMethod::Delete => {
                    let ids = match synchronizer.get_items_ids(page, command.per_page).await {
                        Ok(ids) => ids,
                        Err(e) => {
                            reporter.error(&format!(
                                "Listing page {} of {} items failed: {}",
                                page, slug, e
                            ));
                            return;
                        }
                    };
                    if ids.is_empty() {
                        break;
                    }
                    (ids.len(), batch.batch_delete_items(&ids, collection).await)
                }
            };

            match result {
                Ok(true) => {
                    summary.pages_processed += 1;
                    summary.items += count;
                    reporter.success(&format!("Processed page {} of {} items", page, slug));
                }
                Ok(false) => {
                    summary.pages_failed += 1;
                    reporter.error(&format!("Failed to process page {} of {} items", page, slug));
                }
                Err(e) => {
                    error!(entity = slug, page, error = %e, "Batch write failed");
                    summary.pages_failed += 1;
                    reporter.error(&format!(
                        "Failed to process page {} of {} items: {}",
                        page, slug, e
                    ));
                }
            }

            page += 1;
        }
    }
}
