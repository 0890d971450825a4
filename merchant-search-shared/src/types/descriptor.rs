//! Static description of an entity type exposed to search.

use crate::types::layout::Layout;

/// Describes one searchable entity type (orders, products, customers).
///
/// The slug doubles as the collection name inside every index provider.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub slug: &'static str,
    pub label: &'static str,
    /// Field names eligible for query matching, by priority.
    pub searchable_fields: Vec<String>,
    /// Field names exposed to the UI. Empty means every field.
    pub display_fields: Vec<String>,
    pub layout: Layout,
}

impl EntityDescriptor {
    pub fn new(slug: &'static str, label: &'static str, layout: Layout) -> Self {
        Self {
            slug,
            label,
            searchable_fields: Vec::new(),
            display_fields: Vec::new(),
            layout,
        }
    }

    pub fn with_searchable_fields(mut self, fields: &[&str]) -> Self {
        self.searchable_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_display_fields(mut self, fields: &[&str]) -> Self {
        self.display_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Index collection this entity is stored in.
    pub fn collection(&self) -> &'static str {
        self.slug
    }
}
