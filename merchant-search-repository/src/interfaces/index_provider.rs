//! Index provider trait definition.
//!
//! This module defines the abstract interface for index write operations,
//! allowing for different backends (the local null provider, OpenSearch, or
//! providers registered from outside the crate).

use async_trait::async_trait;
use merchant_search_shared::{IndexableRecord, RecordId};

use crate::errors::SearchIndexError;
use crate::interfaces::{BatchIndexProvider, EntityDeleter, SettingsCapable};

/// Abstracts the search backend that stores indexable records.
///
/// Every write reports success as a boolean. Built-in providers never return
/// `Err`: backend failures are logged and turned into `Ok(false)` at the
/// provider boundary. `Err` stays in the signature for providers registered from
/// outside the crate; callers must treat it exactly like `Ok(false)` plus a log
/// entry.
///
/// # Collections
///
/// Each entity type writes to exactly one collection, named after the entity
/// slug. How a collection maps to backend storage (index name, prefix) is up to
/// the provider, but the mapping must be one-to-one.
#[async_trait]
pub trait IndexProvider: Send + Sync {
    /// Stable identifier used in persisted settings (e.g. `default`, `opensearch`).
    fn slug(&self) -> &str;

    /// Human readable provider name.
    fn label(&self) -> &str;

    /// Cheap readiness check (credentials present, endpoint parseable).
    ///
    /// Must not perform I/O and must not panic.
    fn is_ready(&self) -> bool;

    /// Add a record to a collection.
    ///
    /// # Arguments
    ///
    /// * `record` - The mapped record
    /// * `id` - The record id, equal to the domain object's own id
    /// * `collection` - The entity collection name
    async fn create_item(
        &self,
        record: &IndexableRecord,
        id: &RecordId,
        collection: &str,
    ) -> Result<bool, SearchIndexError>;

    /// Replace a record in a collection, creating it if needed.
    async fn update_item(
        &self,
        record: &IndexableRecord,
        id: &RecordId,
        collection: &str,
    ) -> Result<bool, SearchIndexError>;

    /// Remove a record from a collection.
    ///
    /// Removing a record that does not exist counts as success.
    async fn delete_item(&self, id: &RecordId, collection: &str) -> Result<bool, SearchIndexError>;

    /// Batch write capability, if the provider supports it.
    fn as_batch(&self) -> Option<&dyn BatchIndexProvider> {
        None
    }

    /// Entity-specific deletion capability, if the provider supports it.
    fn as_entity_deleter(&self) -> Option<&dyn EntityDeleter> {
        None
    }

    /// Settings capability, if the provider is configurable.
    fn as_settings(&self) -> Option<&dyn SettingsCapable> {
        None
    }
}
