//! Shared fixtures for the integration tests: log capture, mock providers and
//! a store wrapper that counts listing calls.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use merchant_search::errors::StoreError;
use merchant_search::store::{CommerceStore, InMemoryStore, OrderQuery};
use merchant_search_repository::{BatchIndexProvider, IndexProvider, SearchIndexError};
use merchant_search_shared::{Customer, IndexableRecord, Order, Product, RecordId};
use serde_json::json;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

// Log capture

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: HashMap<String, String>,
}

/// Layer that keeps every event it sees.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .collect()
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let value = format!("{:?}", value);
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Install a capturing subscriber for the current thread.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    use tracing_subscriber::layer::SubscriberExt;

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(logs.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

// Providers

/// Records every single-item write.
#[derive(Default)]
pub struct RecordingProvider {
    calls: Mutex<Vec<(String, RecordId, String)>>,
}

impl RecordingProvider {
    pub fn calls(&self) -> Vec<(String, RecordId, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, id: &RecordId, collection: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), id.clone(), collection.to_string()));
    }
}

#[async_trait]
impl IndexProvider for RecordingProvider {
    fn slug(&self) -> &str {
        "recording"
    }

    fn label(&self) -> &str {
        "Recording"
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
        self.record("create", id, collection);
        Ok(true)
    }

    async fn update_item(
        &self,
        _record: &IndexableRecord,
        id: &RecordId,
        collection: &str,
    ) -> Result<bool, SearchIndexError> {
        self.record("update", id, collection);
        Ok(true)
    }

    async fn delete_item(&self, id: &RecordId, collection: &str) -> Result<bool, SearchIndexError> {
        self.record("delete", id, collection);
        Ok(true)
    }
}

/// Raises on every write.
pub struct ThrowingProvider;

#[async_trait]
impl IndexProvider for ThrowingProvider {
    fn slug(&self) -> &str {
        "throwing"
    }

    fn label(&self) -> &str {
        "Throwing"
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn create_item(
        &self,
        _record: &IndexableRecord,
        _id: &RecordId,
        _collection: &str,
    ) -> Result<bool, SearchIndexError> {
        Err(SearchIndexError::index("backend unreachable"))
    }

    async fn update_item(
        &self,
        _record: &IndexableRecord,
        _id: &RecordId,
        _collection: &str,
    ) -> Result<bool, SearchIndexError> {
        Err(SearchIndexError::index("backend unreachable"))
    }

    async fn delete_item(&self, _id: &RecordId, _collection: &str) -> Result<bool, SearchIndexError> {
        Err(SearchIndexError::delete("backend unreachable"))
    }
}

/// Panics on every write, like a client library with a bug.
pub struct PanickingProvider;

#[async_trait]
impl IndexProvider for PanickingProvider {
    fn slug(&self) -> &str {
        "panicking"
    }

    fn label(&self) -> &str {
        "Panicking"
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn create_item(
        &self,
        _record: &IndexableRecord,
        _id: &RecordId,
        _collection: &str,
    ) -> Result<bool, SearchIndexError> {
        panic!("client blew up")
    }

    async fn update_item(
        &self,
        _record: &IndexableRecord,
        _id: &RecordId,
        _collection: &str,
    ) -> Result<bool, SearchIndexError> {
        panic!("client blew up")
    }

    async fn delete_item(&self, _id: &RecordId, _collection: &str) -> Result<bool, SearchIndexError> {
        panic!("client blew up")
    }
}

/// Batch-capable provider counting batch calls and their sizes.
#[derive(Default)]
pub struct CountingBatchProvider {
    update_batches: Mutex<Vec<usize>>,
    delete_batches: Mutex<Vec<usize>>,
    /// Batch call (1-based) that reports failure.
    failing_call: Option<usize>,
}

impl CountingBatchProvider {
    pub fn failing_on(call: usize) -> Self {
        Self {
            failing_call: Some(call),
            ..Self::default()
        }
    }

    pub fn update_batches(&self) -> Vec<usize> {
        self.update_batches.lock().unwrap().clone()
    }

    pub fn delete_batches(&self) -> Vec<usize> {
        self.delete_batches.lock().unwrap().clone()
    }

    fn push(&self, batches: &Mutex<Vec<usize>>, size: usize) -> bool {
        let mut batches = batches.lock().unwrap();
        batches.push(size);
        self.failing_call != Some(batches.len())
    }
}

#[async_trait]
impl IndexProvider for CountingBatchProvider {
    fn slug(&self) -> &str {
        "counting"
    }

    fn label(&self) -> &str {
        "Counting"
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn create_item(
        &self,
        _record: &IndexableRecord,
        _id: &RecordId,
        _collection: &str,
    ) -> Result<bool, SearchIndexError> {
        Ok(true)
    }

    async fn update_item(
        &self,
        _record: &IndexableRecord,
        _id: &RecordId,
        _collection: &str,
    ) -> Result<bool, SearchIndexError> {
        Ok(true)
    }

    async fn delete_item(&self, _id: &RecordId, _collection: &str) -> Result<bool, SearchIndexError> {
        Ok(true)
    }

    fn as_batch(&self) -> Option<&dyn BatchIndexProvider> {
        Some(self)
    }
}

#[async_trait]
impl BatchIndexProvider for CountingBatchProvider {
    async fn batch_create_items(
        &self,
        records: &[IndexableRecord],
        _collection: &str,
    ) -> Result<bool, SearchIndexError> {
        Ok(self.push(&self.update_batches, records.len()))
    }

    async fn batch_update_items(
        &self,
        records: &[IndexableRecord],
        _collection: &str,
    ) -> Result<bool, SearchIndexError> {
        Ok(self.push(&self.update_batches, records.len()))
    }

    async fn batch_delete_items(
        &self,
        ids: &[RecordId],
        _collection: &str,
    ) -> Result<bool, SearchIndexError> {
        Ok(self.push(&self.delete_batches, ids.len()))
    }
}

// Store

/// In-memory store that counts listing calls.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryStore,
    listings: AtomicUsize,
}

impl CountingStore {
    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.listings.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CommerceStore for CountingStore {
    async fn get_order(&self, id: u64) -> Result<Option<Order>, StoreError> {
        self.inner.get_order(id).await
    }

    async fn get_product(&self, id: u64) -> Result<Option<Product>, StoreError> {
        self.inner.get_product(id).await
    }

    async fn get_customer(&self, id: u64) -> Result<Option<Customer>, StoreError> {
        self.inner.get_customer(id).await
    }

    async fn post_type(&self, id: u64) -> Result<Option<String>, StoreError> {
        self.inner.post_type(id).await
    }

    async fn list_orders(&self, page: usize, per_page: usize) -> Result<Vec<Order>, StoreError> {
        self.count();
        self.inner.list_orders(page, per_page).await
    }

    async fn list_order_ids(&self, page: usize, per_page: usize) -> Result<Vec<u64>, StoreError> {
        self.count();
        self.inner.list_order_ids(page, per_page).await
    }

    async fn list_products(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<Product>, StoreError> {
        self.count();
        self.inner.list_products(page, per_page).await
    }

    async fn list_product_ids(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<u64>, StoreError> {
        self.count();
        self.inner.list_product_ids(page, per_page).await
    }

    async fn list_customers(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<Customer>, StoreError> {
        self.count();
        self.inner.list_customers(page, per_page).await
    }

    async fn list_customer_ids(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<u64>, StoreError> {
        self.count();
        self.inner.list_customer_ids(page, per_page).await
    }

    async fn search_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, StoreError> {
        self.inner.search_orders(query).await
    }

    async fn search_products(&self, text: &str, limit: usize) -> Result<Vec<Product>, StoreError> {
        self.inner.search_products(text, limit).await
    }

    async fn search_customers(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<Customer>, StoreError> {
        self.inner.search_customers(text, limit).await
    }
}

// Fixtures

pub fn order(id: u64, email: &str) -> Order {
    serde_json::from_value(json!({
        "id": id,
        "status": "processing",
        "total": "19.90",
        "billing": { "first_name": "Ada", "last_name": "Lovelace", "email": email },
        "line_items": [{ "name": "Rest Mug", "quantity": 1 }],
        "date_created": "2024-03-05T10:00:00Z"
    }))
    .unwrap()
}

pub fn product(id: u64, name: &str, stock: Option<i64>) -> Product {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "permalink": format!("http://localhost/product/{}", id),
        "price": "12.00",
        "stock_quantity": stock,
    }))
    .unwrap()
}

pub fn customer(id: u64, email: &str) -> Customer {
    serde_json::from_value(json!({
        "id": id,
        "first_name": "Grace",
        "last_name": "Hopper",
        "email": email,
        "billing": { "phone": "555-0100" }
    }))
    .unwrap()
}
