use std::sync::Arc;

use merchant_search_shared::IndexableRecord;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use crate::entities::EntitySynchronizer;
use crate::errors::SearchApiError;

/// Entity path segment that searches every enabled entity.
pub const ALL_ENTITIES: &str = "all";

/// Shape of each search hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchView {
    /// The record restricted to the entity's display fields.
    #[default]
    Records,
    /// The record id plus every layout slot resolved against the record.
    Layout,
}

/// Built-in search over the enabled entities.
#[derive(Debug, Clone)]
pub struct SearchService {
    synchronizers: Vec<Arc<EntitySynchronizer>>,
}

impl SearchService {
    pub fn new(synchronizers: Vec<Arc<EntitySynchronizer>>) -> Self {
        Self { synchronizers }
    }

    pub fn entity_slugs(&self) -> Vec<&'static str> {
        self.synchronizers.iter().map(|sync| sync.slug()).collect()
    }

    /// Search one entity, or all of them.
    ///
    /// The result maps each entity slug to its hits, shaped by `view`.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        entity: &str,
        query: &str,
        view: SearchView,
    ) -> Result<Map<String, Value>, SearchApiError> {
        let selected: Vec<&Arc<EntitySynchronizer>> = if entity == ALL_ENTITIES {
            self.synchronizers.iter().collect()
        } else {
            let sync = self
                .synchronizers
                .iter()
                .find(|sync| sync.slug() == entity)
                .ok_or_else(|| SearchApiError::UnknownEntity(entity.to_string()))?;
            vec![sync]
        };

        let query = query.trim();
        let mut data = Map::new();
        for sync in selected {
            let records: Vec<Value> = sync
                .search(query)
                .await?
                .iter()
                .map(|record| Self::hit(sync, record, view))
                .collect();
            debug!(entity = sync.slug(), results = records.len(), "Search finished");
            data.insert(sync.slug().to_string(), Value::Array(records));
        }

        Ok(data)
    }

    fn hit(sync: &EntitySynchronizer, record: &IndexableRecord, view: SearchView) -> Value {
        match view {
            SearchView::Records => sync.display(record).into_value(),
            SearchView::Layout => json!({
                "id": record.get("id").cloned().unwrap_or(Value::Null),
                "slots": sync.entity().descriptor().layout.resolve(record),
            }),
        }
    }
}
