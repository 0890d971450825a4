//! Filter registry: keyed chains of value transforms.
//!
//! A filter is a `Fn(T) -> T` registered under a string key. `apply_filters`
//! threads a value through every filter registered for the key, in
//! registration order; with no filters the value comes back unchanged. Keys are
//! not typed, so each entry remembers the value type it was registered for and
//! entries of another type are skipped.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

type Filter<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Filter applied to every mapped record of an entity.
pub fn item_data_filter(entity_slug: &str) -> String {
    format!("merchant_buddy_{}_item_data", entity_slug)
}

/// Filter applied to an entity's searchable field list.
pub fn searchable_fields_filter(entity_slug: &str) -> String {
    format!("merchant_buddy_{}_searchable_fields", entity_slug)
}

/// Filter applied to an entity's display field list.
pub fn display_fields_filter(entity_slug: &str) -> String {
    format!("merchant_buddy_{}_display_fields", entity_slug)
}

/// Filter applied to the provider registry.
pub const AVAILABLE_PROVIDERS_FILTER: &str = "merchant_buddy_available_providers";

/// Filter applied to the entity catalog.
pub const AVAILABLE_ENTITIES_FILTER: &str = "merchant_buddy_available_entities";

/// Filter deciding whether the palette opens as a modal dialog.
pub const INTERNAL_DIALOG_FILTER: &str = "merchant_buddy_internal_dialog";

/// Registry of filters, built once at startup and then shared read-only.
#[derive(Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Vec<Arc<dyn Any + Send + Sync>>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter to the chain for `key`.
    pub fn add_filter<T, F>(&mut self, key: impl Into<String>, filter: F)
    where
        T: 'static,
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        let filter: Filter<T> = Arc::new(filter);
        self.filters
            .entry(key.into())
            .or_default()
            .push(Arc::new(filter));
    }

    /// Run `value` through the chain for `key`.
    pub fn apply_filters<T: 'static>(&self, key: &str, value: T) -> T {
        let Some(chain) = self.filters.get(key) else {
            return value;
        };

        chain.iter().fold(value, |value, entry| match entry.downcast_ref::<Filter<T>>() {
            Some(filter) => filter(value),
            None => {
                warn!(filter = key, "Skipping filter registered for another value type");
                value
            }
        })
    }

    pub fn has_filters(&self, key: &str) -> bool {
        self.filters.get(key).is_some_and(|chain| !chain.is_empty())
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.filters.iter().map(|(key, chain)| (key, chain.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_returns_value() {
        let filters = FilterRegistry::new();
        assert_eq!(filters.apply_filters("missing", 5u32), 5);
        assert!(!filters.has_filters("missing"));
    }

    #[test]
    fn test_filters_run_in_registration_order() {
        let mut filters = FilterRegistry::new();
        filters.add_filter("names", |mut v: Vec<String>| {
            v.push("first".to_string());
            v
        });
        filters.add_filter("names", |mut v: Vec<String>| {
            v.push("second".to_string());
            v
        });

        let result = filters.apply_filters("names", Vec::<String>::new());
        assert_eq!(result, vec!["first", "second"]);
    }

    #[test]
    fn test_filter_of_other_type_is_skipped() {
        let mut filters = FilterRegistry::new();
        filters.add_filter("value", |v: u32| v + 1);
        filters.add_filter("value", |v: String| v + "!");

        assert_eq!(filters.apply_filters("value", 1u32), 2);
        assert_eq!(filters.apply_filters("value", "a".to_string()), "a!");
    }

    #[test]
    fn test_key_helpers() {
        assert_eq!(item_data_filter("orders"), "merchant_buddy_orders_item_data");
        assert_eq!(
            display_fields_filter("customers"),
            "merchant_buddy_customers_display_fields"
        );
        assert_eq!(
            searchable_fields_filter("products"),
            "merchant_buddy_products_searchable_fields"
        );
    }
}
