//! Core data structures shared across the merchant search crates.
//!
//! - [`record`]: indexable records and their ids
//! - [`commerce`]: snapshots of orders, products and customers
//! - [`descriptor`]: static entity descriptors
//! - [`layout`]: palette row templates and slot bindings

pub mod commerce;
pub mod descriptor;
pub mod layout;
pub mod record;

pub use commerce::{
    Address, Customer, DomainObject, Order, OrderLineItem, Product, ProductCategory,
    ORDER_POST_TYPE, PRODUCT_POST_TYPE,
};
pub use descriptor::EntityDescriptor;
pub use layout::{ActionBinding, Binding, Layout, ResolvedSlot, Template, TemplateStructure};
pub use record::{IndexableRecord, RecordId, ID_FIELD};
