//! Port to the host commerce store.
//!
//! Synchronizers resolve objects by id, page through listings for batch
//! reconciliation and run the built-in search through this trait. The host
//! integration implements it; [`InMemoryStore`] backs the binary and tests.
//! The hook ingress writes through [`CommerceStore::save`] and
//! [`CommerceStore::remove`] so the store follows the host's changes.

mod memory;

use async_trait::async_trait;
use merchant_search_shared::{Customer, DomainObject, Order, Product};

use crate::errors::StoreError;

pub use memory::{InMemoryStore, PostRecord, StoreSnapshot};

/// Kinds of objects the store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Order,
    Product,
    Customer,
}

/// Order search arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    /// Free text matched against order number, billing details and items.
    pub text: String,
    /// Exact billing email filter.
    pub billing_email: Option<String>,
    pub limit: usize,
}

#[async_trait]
pub trait CommerceStore: Send + Sync {
    async fn get_order(&self, id: u64) -> Result<Option<Order>, StoreError>;

    async fn get_product(&self, id: u64) -> Result<Option<Product>, StoreError>;

    async fn get_customer(&self, id: u64) -> Result<Option<Customer>, StoreError>;

    /// Post type stored for `id`, if any post exists with that id.
    async fn post_type(&self, id: u64) -> Result<Option<String>, StoreError>;

    /// One page of orders, ordered by id. `page` is 1-based.
    async fn list_orders(&self, page: usize, per_page: usize) -> Result<Vec<Order>, StoreError>;

    async fn list_order_ids(&self, page: usize, per_page: usize) -> Result<Vec<u64>, StoreError>;

    async fn list_products(&self, page: usize, per_page: usize)
        -> Result<Vec<Product>, StoreError>;

    async fn list_product_ids(&self, page: usize, per_page: usize)
        -> Result<Vec<u64>, StoreError>;

    async fn list_customers(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<Customer>, StoreError>;

    async fn list_customer_ids(&self, page: usize, per_page: usize)
        -> Result<Vec<u64>, StoreError>;

    async fn search_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, StoreError>;

    async fn search_products(&self, text: &str, limit: usize) -> Result<Vec<Product>, StoreError>;

    async fn search_customers(&self, text: &str, limit: usize)
        -> Result<Vec<Customer>, StoreError>;

    /// Record an object handed over by a lifecycle hook.
    ///
    /// Stores that only read from the host keep this default and refuse.
    async fn save(&self, _object: &DomainObject) -> Result<(), StoreError> {
        Err(StoreError::unavailable("Store is read-only"))
    }

    /// Drop an object after its delete hook. Returns whether it was stored.
    async fn remove(&self, _kind: ObjectKind, _id: u64) -> Result<bool, StoreError> {
        Err(StoreError::unavailable("Store is read-only"))
    }
}
