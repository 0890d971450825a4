//! Commerce snapshot types.
//!
//! These mirror the parts of the host store's orders, products and customers
//! that the search index cares about. Every field that the host may leave
//! unset is optional so partially populated objects can still be mapped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post type used by the host for orders.
pub const ORDER_POST_TYPE: &str = "shop_order";

/// Post type used by the host for products.
pub const PRODUCT_POST_TYPE: &str = "product";

/// Postal address attached to an order or customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

impl Address {
    /// "First Last", trimmed when either part is missing.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    /// Display number; defaults to the id when the host does not customise it.
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub customer_id: u64,
    #[serde(default)]
    pub billing: Address,
    #[serde(default)]
    pub shipping: Address,
    #[serde(default)]
    pub line_items: Vec<OrderLineItem>,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_modified: Option<DateTime<Utc>>,
    /// Raw post date, used when the order carries no creation date.
    #[serde(default)]
    pub post_date: Option<DateTime<Utc>>,
}

impl Order {
    pub fn order_number(&self) -> String {
        self.number.clone().unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    /// Ids of child products (variations).
    #[serde(default)]
    pub children: Vec<u64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<ProductCategory>,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub post_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub billing: Address,
    #[serde(default)]
    pub shipping: Address,
}

/// Any object a lifecycle hook may hand over.
///
/// Generic host hooks (`untrashed_post`, `wp_trash_post`) fire for every post
/// type, so handlers receive `Post` for objects that are not commerce entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainObject {
    Order(Order),
    Product(Product),
    Customer(Customer),
    Post { id: u64, post_type: String },
}

impl DomainObject {
    pub fn id(&self) -> u64 {
        match self {
            DomainObject::Order(order) => order.id,
            DomainObject::Product(product) => product.id,
            DomainObject::Customer(customer) => customer.id,
            DomainObject::Post { id, .. } => *id,
        }
    }

    pub fn as_order(&self) -> Option<&Order> {
        match self {
            DomainObject::Order(order) => Some(order),
            _ => None,
        }
    }

    pub fn as_product(&self) -> Option<&Product> {
        match self {
            DomainObject::Product(product) => Some(product),
            _ => None,
        }
    }

    pub fn as_customer(&self) -> Option<&Customer> {
        match self {
            DomainObject::Customer(customer) => Some(customer),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_defaults_to_id() {
        let order: Order = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(order.order_number(), "42");
        assert!(order.date_created.is_none());
        assert!(order.line_items.is_empty());
    }

    #[test]
    fn test_domain_object_tagging() {
        let object: DomainObject =
            serde_json::from_str(r#"{"kind": "post", "id": 9, "post_type": "page"}"#).unwrap();
        assert_eq!(object.id(), 9);
        assert!(object.as_order().is_none());
        assert!(object.as_product().is_none());
    }

    #[test]
    fn test_address_full_name_trims() {
        let address = Address {
            first_name: "Jane".to_string(),
            ..Default::default()
        };
        assert_eq!(address.full_name(), "Jane");
    }
}
