use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use merchant_search_shared::{
    Customer, DomainObject, Order, Product, ORDER_POST_TYPE, PRODUCT_POST_TYPE,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use super::{CommerceStore, ObjectKind, OrderQuery};
use crate::errors::StoreError;

/// A non-commerce post (page, attachment, ...) known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: u64,
    pub post_type: String,
}

/// Serialized store contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub orders: Vec<Order>,
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub posts: Vec<PostRecord>,
}

#[derive(Debug, Default)]
struct StoreData {
    orders: BTreeMap<u64, Order>,
    products: BTreeMap<u64, Product>,
    customers: BTreeMap<u64, Customer>,
    posts: BTreeMap<u64, String>,
}

/// Commerce store held in memory, ordered by id.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<StoreData>,
}

fn page_of<T>(items: impl Iterator<Item = T>, page: usize, per_page: usize) -> Vec<T> {
    if per_page == 0 {
        return Vec::new();
    }
    let offset = page.saturating_sub(1).saturating_mul(per_page);
    items.skip(offset).take(per_page).collect()
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let data = StoreData {
            orders: snapshot.orders.into_iter().map(|o| (o.id, o)).collect(),
            products: snapshot.products.into_iter().map(|p| (p.id, p)).collect(),
            customers: snapshot.customers.into_iter().map(|c| (c.id, c)).collect(),
            posts: snapshot
                .posts
                .into_iter()
                .map(|p| (p.id, p.post_type))
                .collect(),
        };
        Self {
            data: RwLock::new(data),
        }
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| StoreError::io(e.to_string()))?;
        let snapshot: StoreSnapshot =
            serde_json::from_str(&raw).map_err(|e| StoreError::serialization(e.to_string()))?;

        info!(
            path = %path.display(),
            orders = snapshot.orders.len(),
            products = snapshot.products.len(),
            customers = snapshot.customers.len(),
            "Loaded store snapshot"
        );

        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn upsert_order(&self, order: Order) {
        self.data.write().await.orders.insert(order.id, order);
    }

    pub async fn remove_order(&self, id: u64) -> Option<Order> {
        self.data.write().await.orders.remove(&id)
    }

    pub async fn upsert_product(&self, product: Product) {
        self.data.write().await.products.insert(product.id, product);
    }

    pub async fn remove_product(&self, id: u64) -> Option<Product> {
        self.data.write().await.products.remove(&id)
    }

    pub async fn upsert_customer(&self, customer: Customer) {
        self.data.write().await.customers.insert(customer.id, customer);
    }

    pub async fn remove_customer(&self, id: u64) -> Option<Customer> {
        self.data.write().await.customers.remove(&id)
    }

    pub async fn insert_post(&self, id: u64, post_type: impl Into<String>) {
        self.data.write().await.posts.insert(id, post_type.into());
    }
}

#[async_trait]
impl CommerceStore for InMemoryStore {
    async fn get_order(&self, id: u64) -> Result<Option<Order>, StoreError> {
        Ok(self.data.read().await.orders.get(&id).cloned())
    }

    async fn get_product(&self, id: u64) -> Result<Option<Product>, StoreError> {
        Ok(self.data.read().await.products.get(&id).cloned())
    }

    async fn get_customer(&self, id: u64) -> Result<Option<Customer>, StoreError> {
        Ok(self.data.read().await.customers.get(&id).cloned())
    }

    async fn post_type(&self, id: u64) -> Result<Option<String>, StoreError> {
        let data = self.data.read().await;
        if data.orders.contains_key(&id) {
            return Ok(Some(ORDER_POST_TYPE.to_string()));
        }
        if data.products.contains_key(&id) {
            return Ok(Some(PRODUCT_POST_TYPE.to_string()));
        }
        Ok(data.posts.get(&id).cloned())
    }

    async fn list_orders(&self, page: usize, per_page: usize) -> Result<Vec<Order>, StoreError> {
        let data = self.data.read().await;
        Ok(page_of(data.orders.values().cloned(), page, per_page))
    }

    async fn list_order_ids(&self, page: usize, per_page: usize) -> Result<Vec<u64>, StoreError> {
        let data = self.data.read().await;
        Ok(page_of(data.orders.keys().copied(), page, per_page))
    }

    async fn list_products(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<Product>, StoreError> {
        let data = self.data.read().await;
        Ok(page_of(data.products.values().cloned(), page, per_page))
    }

    async fn list_product_ids(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<u64>, StoreError> {
        let data = self.data.read().await;
        Ok(page_of(data.products.keys().copied(), page, per_page))
    }

    async fn list_customers(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<Customer>, StoreError> {
        let data = self.data.read().await;
        Ok(page_of(data.customers.values().cloned(), page, per_page))
    }

    async fn list_customer_ids(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<u64>, StoreError> {
        let data = self.data.read().await;
        Ok(page_of(data.customers.keys().copied(), page, per_page))
    }

    async fn search_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, StoreError> {
        let data = self.data.read().await;
        let text = query.text.to_lowercase();
        let email = query.billing_email.as_ref().map(|e| e.to_lowercase());

        let matches = data
            .orders
            .values()
            .filter(|order| match &email {
                Some(email) => order.billing.email.to_lowercase() == *email,
                None => true,
            })
            .filter(|order| {
                text.is_empty()
                    || contains(&order.order_number(), &text)
                    || contains(&order.billing.full_name(), &text)
                    || contains(&order.billing.email, &text)
                    || contains(&order.billing.phone, &text)
                    || order.line_items.iter().any(|item| contains(&item.name, &text))
            })
            .take(query.limit)
            .cloned()
            .collect();

        Ok(matches)
    }

    async fn search_products(&self, text: &str, limit: usize) -> Result<Vec<Product>, StoreError> {
        let data = self.data.read().await;
        let text = text.trim().to_lowercase();

        Ok(data
            .products
            .values()
            .filter(|product| text.is_empty() || contains(&product.name, &text))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_customers(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<Customer>, StoreError> {
        let data = self.data.read().await;
        let text = text.trim().to_lowercase();

        Ok(data
            .customers
            .values()
            .filter(|customer| {
                text.is_empty()
                    || contains(&customer.first_name, &text)
                    || contains(&customer.last_name, &text)
                    || contains(&customer.email, &text)
                    || contains(&customer.billing.phone, &text)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn save(&self, object: &DomainObject) -> Result<(), StoreError> {
        match object {
            DomainObject::Order(order) => self.upsert_order(order.clone()).await,
            DomainObject::Product(product) => self.upsert_product(product.clone()).await,
            DomainObject::Customer(customer) => self.upsert_customer(customer.clone()).await,
            DomainObject::Post { id, post_type } => self.insert_post(*id, post_type.clone()).await,
        }
        Ok(())
    }

    async fn remove(&self, kind: ObjectKind, id: u64) -> Result<bool, StoreError> {
        let removed = match kind {
            ObjectKind::Order => self.remove_order(id).await.is_some(),
            ObjectKind::Product => self.remove_product(id).await.is_some(),
            ObjectKind::Customer => self.remove_customer(id).await.is_some(),
        };
        Ok(removed)
    }
}
