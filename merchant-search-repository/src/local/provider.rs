use async_trait::async_trait;
use merchant_search_shared::{IndexableRecord, RecordId};
use tracing::trace;

use crate::errors::SearchIndexError;
use crate::interfaces::IndexProvider;

/// Slug persisted in the main settings when the built-in provider is active.
pub const LOCAL_PROVIDER_SLUG: &str = "default";

/// Null-object provider.
///
/// Search requests against it are answered straight from the commerce store,
/// so every write is accepted and dropped. It does not implement
/// `BatchIndexProvider`: reconciling against it is reported as unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IndexProvider for LocalProvider {
    fn slug(&self) -> &str {
        LOCAL_PROVIDER_SLUG
    }

    fn label(&self) -> &str {
        "Default"
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn create_item(
        &self,
        _record: &IndexableRecord,
        id: &RecordId,
        collection: &str,
    ) -> Result<bool, SearchIndexError> {
        trace!(id = %id, collection, "Local provider ignoring create");
        Ok(true)
    }

    async fn update_item(
        &self,
        _record: &IndexableRecord,
        id: &RecordId,
        collection: &str,
    ) -> Result<bool, SearchIndexError> {
        trace!(id = %id, collection, "Local provider ignoring update");
        Ok(true)
    }

    async fn delete_item(&self, id: &RecordId, collection: &str) -> Result<bool, SearchIndexError> {
        trace!(id = %id, collection, "Local provider ignoring delete");
        Ok(true)
    }
}
