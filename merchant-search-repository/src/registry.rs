//! Registry of available index providers.
//!
//! Providers are registered by slug as factories that build an instance from
//! persisted settings. Entries added from outside the crate arrive type-erased
//! and are only checked against the provider contract when resolved.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::SearchIndexError;
use crate::interfaces::IndexProvider;
use crate::local::{LocalProvider, LOCAL_PROVIDER_SLUG};
use crate::opensearch::{OpenSearchProvider, OPENSEARCH_PROVIDER_SLUG};
use crate::types::ProviderSettings;

type BuildFn =
    dyn Fn(&ProviderSettings) -> Result<Arc<dyn IndexProvider>, SearchIndexError> + Send + Sync;

/// Builds a provider instance from its settings.
#[derive(Clone)]
pub struct ProviderFactory {
    label: String,
    build: Arc<BuildFn>,
}

impl ProviderFactory {
    pub fn new<F>(label: impl Into<String>, build: F) -> Self
    where
        F: Fn(&ProviderSettings) -> Result<Arc<dyn IndexProvider>, SearchIndexError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            label: label.into(),
            build: Arc::new(build),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn build(&self, settings: &ProviderSettings) -> Result<Arc<dyn IndexProvider>, SearchIndexError> {
        (self.build)(settings)
    }
}

impl fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A registry entry. Anything that is not a [`ProviderFactory`] fails the
/// contract check at resolution time.
pub type RegisteredProvider = Arc<dyn Any + Send + Sync>;

/// Slug to provider map, kept in slug order.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    entries: BTreeMap<String, RegisteredProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the local provider and the OpenSearch provider.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            LOCAL_PROVIDER_SLUG,
            ProviderFactory::new("Default", |_| {
                let provider: Arc<dyn IndexProvider> = Arc::new(LocalProvider::new());
                Ok(provider)
            }),
        );
        registry.register(
            OPENSEARCH_PROVIDER_SLUG,
            ProviderFactory::new("OpenSearch", |settings| {
                let provider: Arc<dyn IndexProvider> =
                    Arc::new(OpenSearchProvider::from_settings(settings)?);
                Ok(provider)
            }),
        );
        registry
    }

    pub fn register(&mut self, slug: impl Into<String>, factory: ProviderFactory) {
        self.entries.insert(slug.into(), Arc::new(factory));
    }

    /// Register an entry without a static type check.
    pub fn register_entry(&mut self, slug: impl Into<String>, entry: RegisteredProvider) {
        self.entries.insert(slug.into(), entry);
    }

    pub fn remove(&mut self, slug: &str) -> Option<RegisteredProvider> {
        self.entries.remove(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    pub fn get(&self, slug: &str) -> Option<&RegisteredProvider> {
        self.entries.get(slug)
    }

    /// The factory registered under `slug`, if the entry is one.
    pub fn factory(&self, slug: &str) -> Option<&ProviderFactory> {
        self.entries
            .get(slug)
            .and_then(|entry| entry.downcast_ref::<ProviderFactory>())
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Slug and label of every entry that is a valid factory.
    pub fn labels(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(slug, entry)| {
                entry
                    .downcast_ref::<ProviderFactory>()
                    .map(|factory| (slug.clone(), factory.label().to_string()))
            })
            .collect()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}
