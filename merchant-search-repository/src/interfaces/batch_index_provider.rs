use async_trait::async_trait;
use merchant_search_shared::{IndexableRecord, RecordId};

use crate::errors::SearchIndexError;

/// Bulk write capability used by batch reconciliation.
///
/// Each call is a single round trip to the backend. A `false` result means
/// the batch as a whole should be treated as failed; callers do not retry.
#[async_trait]
pub trait BatchIndexProvider: Send + Sync {
    /// Add many records to a collection.
    async fn batch_create_items(
        &self,
        records: &[IndexableRecord],
        collection: &str,
    ) -> Result<bool, SearchIndexError>;

    /// Upsert many records in a collection.
    async fn batch_update_items(
        &self,
        records: &[IndexableRecord],
        collection: &str,
    ) -> Result<bool, SearchIndexError>;

    /// Remove many records from a collection.
    async fn batch_delete_items(
        &self,
        ids: &[RecordId],
        collection: &str,
    ) -> Result<bool, SearchIndexError>;
}
