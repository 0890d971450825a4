//! Binds one entity type to the active index provider.
//!
//! Lifecycle hooks land here as `(kind, id, optional object)`. The synchronizer
//! resolves and maps the object, then issues a single provider write. Index
//! failures never leave this module: they are logged with the entity slug and
//! reported back as a [`SyncOutcome`] for callers that care.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use merchant_search_repository::{IndexProvider, SearchIndexError};
use merchant_search_shared::{DomainObject, IndexableRecord, RecordId};
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use super::EntityType;
use crate::errors::{panic_message, StoreError};
use crate::hooks::HookKind;
use crate::store::CommerceStore;

/// Result of handling one lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The provider accepted the write.
    Written,
    /// The provider reported failure.
    Rejected,
    /// The provider raised an error or panicked.
    Failed,
    /// Nothing was sent: wrong object kind, unknown object or missing id.
    Skipped,
}

pub struct EntitySynchronizer {
    entity: Arc<dyn EntityType>,
    store: Arc<dyn CommerceStore>,
    provider: Arc<dyn IndexProvider>,
}

impl EntitySynchronizer {
    pub fn new(
        entity: Arc<dyn EntityType>,
        store: Arc<dyn CommerceStore>,
        provider: Arc<dyn IndexProvider>,
    ) -> Self {
        Self {
            entity,
            store,
            provider,
        }
    }

    /// Same entity and store, writing to another provider.
    pub fn with_provider(&self, provider: Arc<dyn IndexProvider>) -> Self {
        Self::new(self.entity.clone(), self.store.clone(), provider)
    }

    pub fn entity(&self) -> &Arc<dyn EntityType> {
        &self.entity
    }

    pub fn provider(&self) -> &Arc<dyn IndexProvider> {
        &self.provider
    }

    pub fn slug(&self) -> &'static str {
        self.entity.slug()
    }

    /// Route a lifecycle event to the matching handler.
    #[instrument(skip(self, object), fields(entity = self.slug()))]
    pub async fn handle(
        &self,
        kind: HookKind,
        id: u64,
        object: Option<&DomainObject>,
    ) -> SyncOutcome {
        match kind {
            HookKind::Create => self.on_create(id, object).await,
            HookKind::Update => self.on_update(id, object).await,
            HookKind::Delete => self.on_delete(id, object).await,
        }
    }

    pub async fn on_create(&self, id: u64, object: Option<&DomainObject>) -> SyncOutcome {
        let Some(record) = self.prepare(id, object).await else {
            return SyncOutcome::Skipped;
        };
        let Some(record_id) = record.resolvable_id() else {
            debug!(entity = self.slug(), id, "Mapped record has no id, skipping");
            return SyncOutcome::Skipped;
        };

        let result = self
            .guarded(self.provider.create_item(&record, &record_id, self.collection()))
            .await;
        self.report("create", &record_id, result)
    }

    pub async fn on_update(&self, id: u64, object: Option<&DomainObject>) -> SyncOutcome {
        let Some(record) = self.prepare(id, object).await else {
            return SyncOutcome::Skipped;
        };
        let Some(record_id) = record.resolvable_id() else {
            debug!(entity = self.slug(), id, "Mapped record has no id, skipping");
            return SyncOutcome::Skipped;
        };

        let result = self
            .guarded(self.provider.update_item(&record, &record_id, self.collection()))
            .await;
        self.report("update", &record_id, result)
    }

    pub async fn on_delete(&self, id: u64, object: Option<&DomainObject>) -> SyncOutcome {
        if id == 0 {
            return SyncOutcome::Skipped;
        }

        let owned = match object {
            Some(object) => self.entity.accepts(object),
            None => match self.entity.owns(self.store.as_ref(), id).await {
                Ok(owned) => owned,
                Err(e) => {
                    warn!(entity = self.slug(), id, error = %e, "Could not check object type");
                    false
                }
            },
        };
        if !owned {
            return SyncOutcome::Skipped;
        }

        let record_id = RecordId::from(id);
        let result = match self
            .provider
            .as_entity_deleter()
            .filter(|deleter| deleter.handles_entity(self.slug()))
        {
            Some(deleter) => {
                self.guarded(deleter.delete_entity_item(self.slug(), &record_id))
                    .await
            }
            None => {
                self.guarded(self.provider.delete_item(&record_id, self.collection()))
                    .await
            }
        };
        self.report("delete", &record_id, result)
    }

    /// Built-in search against the commerce store, mapped to records.
    pub async fn search(&self, query: &str) -> Result<Vec<IndexableRecord>, StoreError> {
        let objects = self.entity.search(self.store.as_ref(), query).await?;
        Ok(self.map_all(&objects))
    }

    /// One 1-based page of mapped records. Empty means past the last page.
    pub async fn get_items(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<IndexableRecord>, StoreError> {
        let objects = self.entity.list(self.store.as_ref(), page, per_page).await?;
        Ok(self.map_all(&objects))
    }

    /// One page of record ids, listed without mapping when the entity can.
    pub async fn get_items_ids(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<RecordId>, StoreError> {
        if let Some(ids) = self
            .entity
            .list_ids(self.store.as_ref(), page, per_page)
            .await?
        {
            return Ok(ids.into_iter().map(RecordId::from).collect());
        }

        Ok(self
            .get_items(page, per_page)
            .await?
            .iter()
            .filter_map(IndexableRecord::id)
            .collect())
    }

    /// Restrict a record to the entity's display fields.
    pub fn display(&self, record: &IndexableRecord) -> IndexableRecord {
        record.project(&self.entity.descriptor().display_fields)
    }

    fn collection(&self) -> &'static str {
        self.entity.descriptor().collection()
    }

    fn map_all(&self, objects: &[DomainObject]) -> Vec<IndexableRecord> {
        objects
            .iter()
            .map(|object| self.entity.map(object))
            .filter(|record| !record.is_empty())
            .collect()
    }

    /// Resolve the event's object and map it. `None` means nothing to write.
    async fn prepare(&self, id: u64, object: Option<&DomainObject>) -> Option<IndexableRecord> {
        let resolved = match object {
            Some(object) if !self.entity.accepts(object) => return None,
            Some(object) => object.clone(),
            None => {
                if id == 0 {
                    return None;
                }
                match self.entity.resolve(self.store.as_ref(), id).await {
                    Ok(Some(object)) => object,
                    Ok(None) => return None,
                    Err(e) => {
                        warn!(entity = self.slug(), id, error = %e, "Could not load object");
                        return None;
                    }
                }
            }
        };

        let record = self.entity.map(&resolved);
        (!record.is_empty()).then_some(record)
    }

    /// Await a provider write. A panicking provider is reported as an error.
    async fn guarded(
        &self,
        write: impl Future<Output = Result<bool, SearchIndexError>>,
    ) -> Result<bool, SearchIndexError> {
        AssertUnwindSafe(write)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(SearchIndexError::unknown(format!(
                    "provider panicked: {}",
                    panic_message(payload.as_ref())
                )))
            })
    }

    fn report(
        &self,
        operation: &str,
        id: &RecordId,
        result: Result<bool, SearchIndexError>,
    ) -> SyncOutcome {
        match result {
            Ok(true) => {
                debug!(entity = self.slug(), id = %id, operation, "Index write succeeded");
                SyncOutcome::Written
            }
            Ok(false) => {
                warn!(entity = self.slug(), id = %id, operation, "Index write reported failure");
                SyncOutcome::Rejected
            }
            Err(e) => {
                error!(
                    entity = self.slug(),
                    id = %id,
                    operation,
                    error = %e,
                    "Error writing {} item to index",
                    self.slug()
                );
                SyncOutcome::Failed
            }
        }
    }
}

impl fmt::Debug for EntitySynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySynchronizer")
            .field("entity", &self.slug())
            .field("provider", &self.provider.slug())
            .finish()
    }
}
