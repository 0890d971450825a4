//! Entity types exposed to search.
//!
//! Each entity type knows how to turn its domain objects into indexable
//! records, which host hooks it listens to, and how to list and search its
//! objects in the commerce store. [`EntitySynchronizer`] binds an entity type
//! to the active index provider.

mod customers;
mod orders;
mod products;
pub mod query;
mod synchronizer;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono::format::{Item, StrftimeItems};
use merchant_search_shared::{DomainObject, EntityDescriptor, IndexableRecord};
use tracing::warn;

use crate::errors::{EntityLoadError, StoreError};
use crate::hooks::filters::{display_fields_filter, item_data_filter, searchable_fields_filter};
use crate::hooks::{FilterRegistry, HookBinding};
use crate::store::{CommerceStore, ObjectKind};

pub use customers::Customers;
pub use orders::Orders;
pub use products::Products;
pub use synchronizer::{EntitySynchronizer, SyncOutcome};

/// Date format used when none is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Host-specific values needed to build record URLs and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapContext {
    admin_url: String,
    date_format: String,
}

impl MapContext {
    /// An invalid chrono format falls back to [`DEFAULT_DATE_FORMAT`].
    pub fn new(admin_url: impl Into<String>, date_format: impl Into<String>) -> Self {
        let mut admin_url = admin_url.into();
        if !admin_url.ends_with('/') {
            admin_url.push('/');
        }

        let mut date_format = date_format.into();
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            warn!(date_format = %date_format, "Invalid date format, using default");
            date_format = DEFAULT_DATE_FORMAT.to_string();
        }

        Self {
            admin_url,
            date_format,
        }
    }

    pub fn admin_url(&self) -> &str {
        &self.admin_url
    }

    pub fn edit_post_url(&self, id: u64) -> String {
        format!("{}post.php?post={}&action=edit", self.admin_url, id)
    }

    pub fn edit_user_url(&self, id: u64) -> String {
        format!("{}user-edit.php?user_id={}", self.admin_url, id)
    }

    /// Format a Unix timestamp with the configured date format.
    pub fn format_date(&self, timestamp: i64) -> String {
        DateTime::<Utc>::from_timestamp(timestamp, 0)
            .map(|date| date.format(&self.date_format).to_string())
            .unwrap_or_default()
    }
}

impl Default for MapContext {
    fn default() -> Self {
        Self::new("http://localhost/wp-admin/", DEFAULT_DATE_FORMAT)
    }
}

/// Shared state handed to entity constructors.
#[derive(Debug, Clone)]
pub struct EntityContext {
    pub filters: Arc<FilterRegistry>,
    pub map: MapContext,
}

impl EntityContext {
    pub fn new(filters: Arc<FilterRegistry>, map: MapContext) -> Self {
        Self { filters, map }
    }

    /// Apply the field-list filters to a descriptor.
    fn filter_descriptor(&self, mut descriptor: EntityDescriptor) -> EntityDescriptor {
        let slug = descriptor.slug;
        descriptor.searchable_fields = self
            .filters
            .apply_filters(&searchable_fields_filter(slug), descriptor.searchable_fields);
        descriptor.display_fields = self
            .filters
            .apply_filters(&display_fields_filter(slug), descriptor.display_fields);
        descriptor
    }

    /// Apply the per-entity record filter.
    fn filter_record(&self, slug: &str, record: IndexableRecord) -> IndexableRecord {
        self.filters.apply_filters(&item_data_filter(slug), record)
    }
}

impl Default for EntityContext {
    fn default() -> Self {
        Self::new(Arc::new(FilterRegistry::new()), MapContext::default())
    }
}

/// One searchable entity type.
///
/// `map` must be a pure function of the object: the same object always yields
/// the same record, and an object of another kind yields an empty record.
#[async_trait]
pub trait EntityType: Send + Sync {
    fn descriptor(&self) -> &EntityDescriptor;

    fn slug(&self) -> &'static str {
        self.descriptor().slug
    }

    /// Host hooks this entity is synchronized from.
    fn hooks(&self) -> &'static [HookBinding];

    /// Whether `object` is of this entity's kind.
    fn accepts(&self, object: &DomainObject) -> bool;

    fn map(&self, object: &DomainObject) -> IndexableRecord;

    /// Load an object of this kind by id.
    async fn resolve(
        &self,
        store: &dyn CommerceStore,
        id: u64,
    ) -> Result<Option<DomainObject>, StoreError>;

    /// Whether a delete hook for `id` targets this entity.
    ///
    /// Generic hooks fire for every post type, so entities backed by posts
    /// check the stored post type here.
    async fn owns(&self, _store: &dyn CommerceStore, _id: u64) -> Result<bool, StoreError> {
        Ok(true)
    }

    /// Which store collection holds this entity's objects, if any.
    fn stored_kind(&self) -> Option<ObjectKind> {
        None
    }

    /// Built-in free-text search against the commerce store.
    async fn search(
        &self,
        store: &dyn CommerceStore,
        query: &str,
    ) -> Result<Vec<DomainObject>, StoreError>;

    /// One 1-based page of objects.
    async fn list(
        &self,
        store: &dyn CommerceStore,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<DomainObject>, StoreError>;

    /// One page of ids, if the entity can list ids without loading objects.
    async fn list_ids(
        &self,
        _store: &dyn CommerceStore,
        _page: usize,
        _per_page: usize,
    ) -> Result<Option<Vec<u64>>, StoreError> {
        Ok(None)
    }
}

/// Builds an entity type. Failing factories disable their entity.
pub type EntityFactory =
    Arc<dyn Fn(&EntityContext) -> Result<Arc<dyn EntityType>, EntityLoadError> + Send + Sync>;

/// Ordered set of registered entity types.
#[derive(Clone, Default)]
pub struct EntityCatalog {
    entries: Vec<(String, String, EntityFactory)>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders, products and customers.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(
            orders::SLUG,
            "Orders",
            Arc::new(|context: &EntityContext| {
                let entity: Arc<dyn EntityType> = Arc::new(Orders::new(context));
                Ok(entity)
            }),
        );
        catalog.register(
            products::SLUG,
            "Products",
            Arc::new(|context: &EntityContext| {
                let entity: Arc<dyn EntityType> = Arc::new(Products::new(context));
                Ok(entity)
            }),
        );
        catalog.register(
            customers::SLUG,
            "Customers",
            Arc::new(|context: &EntityContext| {
                let entity: Arc<dyn EntityType> = Arc::new(Customers::new(context));
                Ok(entity)
            }),
        );
        catalog
    }

    /// Register or replace an entity type, keeping its original position.
    pub fn register(
        &mut self,
        slug: impl Into<String>,
        label: impl Into<String>,
        factory: EntityFactory,
    ) {
        let slug = slug.into();
        let label = label.into();
        match self.entries.iter_mut().find(|(s, _, _)| *s == slug) {
            Some(entry) => *entry = (slug, label, factory),
            None => self.entries.push((slug, label, factory)),
        }
    }

    pub fn remove(&mut self, slug: &str) {
        self.entries.retain(|(s, _, _)| s != slug);
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.iter().any(|(s, _, _)| s == slug)
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(slug, _, _)| slug.as_str())
    }

    /// Slug and label pairs, in registration order.
    pub fn labels(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(slug, label, _)| (slug.clone(), label.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityFactory)> {
        self.entries
            .iter()
            .map(|(slug, _, factory)| (slug.as_str(), factory))
    }
}

impl std::fmt::Debug for EntityCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.slugs()).finish()
    }
}

/// Record timestamp: creation date, else raw post date, else 0.
fn created_timestamp(
    date_created: Option<DateTime<Utc>>,
    post_date: Option<DateTime<Utc>>,
) -> i64 {
    date_created
        .or(post_date)
        .map(|date| date.timestamp())
        .unwrap_or(0)
}

/// Record timestamp: modification date, else the creation timestamp.
fn updated_timestamp(date_modified: Option<DateTime<Utc>>, created_at: i64) -> i64 {
    date_modified
        .map(|date| date.timestamp())
        .unwrap_or(created_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_context_urls() {
        let context = MapContext::new("https://shop.test/wp-admin", DEFAULT_DATE_FORMAT);
        assert_eq!(
            context.edit_post_url(12),
            "https://shop.test/wp-admin/post.php?post=12&action=edit"
        );
        assert_eq!(
            context.edit_user_url(3),
            "https://shop.test/wp-admin/user-edit.php?user_id=3"
        );
    }

    #[test]
    fn test_format_date() {
        let context = MapContext::default();
        // 2024-03-05T10:00:00Z
        assert_eq!(context.format_date(1_709_632_800), "March 5, 2024");
        assert_eq!(context.format_date(0), "January 1, 1970");
    }

    #[test]
    fn test_invalid_date_format_falls_back() {
        let context = MapContext::new("http://localhost/wp-admin/", "%Q%");
        assert_eq!(context.format_date(0), "January 1, 1970");
    }

    #[test]
    fn test_builtin_catalog_order() {
        let catalog = EntityCatalog::builtin();
        assert_eq!(
            catalog.slugs().collect::<Vec<_>>(),
            vec!["orders", "products", "customers"]
        );
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut catalog = EntityCatalog::builtin();
        catalog.register(
            "orders",
            "Sales",
            Arc::new(
                |_: &EntityContext| -> Result<Arc<dyn EntityType>, EntityLoadError> {
                    Err(EntityLoadError::new("orders", "disabled"))
                },
            ),
        );

        assert_eq!(catalog.labels()[0], ("orders".to_string(), "Sales".to_string()));
        assert_eq!(catalog.slugs().count(), 3);
    }

    #[test]
    fn test_timestamp_fallbacks() {
        let post_date = DateTime::<Utc>::from_timestamp(100, 0);
        assert_eq!(created_timestamp(None, post_date), 100);
        assert_eq!(created_timestamp(None, None), 0);
        assert_eq!(updated_timestamp(None, 100), 100);
    }
}
