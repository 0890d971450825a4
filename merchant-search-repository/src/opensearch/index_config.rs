//! OpenSearch index naming.

/// Identifier field added to every document submitted through `_bulk`.
pub const OBJECT_ID_FIELD: &str = "object_id";

/// Maps entity collections to index names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexConfig {
    /// Prepended to every collection name (e.g. `shop1_`).
    pub prefix: String,
}

impl IndexConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Index name for a collection.
    ///
    /// OpenSearch only accepts lowercase index names, so the result is
    /// lowercased. Distinct collections still map to distinct indices since
    /// entity slugs are lowercase already.
    pub fn index_name(&self, collection: &str) -> String {
        format!("{}{}", self.prefix, collection).to_lowercase()
    }
}
