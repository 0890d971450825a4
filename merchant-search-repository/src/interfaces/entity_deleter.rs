use async_trait::async_trait;
use merchant_search_shared::RecordId;

use crate::errors::SearchIndexError;

/// Entity-aware deletion.
///
/// Some backends store entities with cross references (e.g. orders embedded in
/// customer documents) and need more than a plain delete-by-id. Synchronizers
/// prefer this path whenever `handles_entity` returns true for their slug.
#[async_trait]
pub trait EntityDeleter: Send + Sync {
    fn handles_entity(&self, entity_slug: &str) -> bool;

    async fn delete_entity_item(
        &self,
        entity_slug: &str,
        id: &RecordId,
    ) -> Result<bool, SearchIndexError>;
}
