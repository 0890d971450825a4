//! # Merchant Search Shared
//!
//! Data structures shared by the merchant search crates: the commerce
//! snapshots handed over by store lifecycle hooks, the flat records pushed to
//! index providers, and the static entity descriptors the palette renders.

pub mod types;

pub use types::{
    Address, Binding, Customer, DomainObject, EntityDescriptor, IndexableRecord, Layout, Order,
    OrderLineItem, Product, ProductCategory, RecordId, ResolvedSlot, Template, ID_FIELD,
    ORDER_POST_TYPE, PRODUCT_POST_TYPE,
};
