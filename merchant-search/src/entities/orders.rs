use async_trait::async_trait;
use merchant_search_shared::{
    Address, Binding, DomainObject, EntityDescriptor, IndexableRecord, Layout, Order, Template,
    ORDER_POST_TYPE,
};
use serde_json::{json, Value};

use super::query::parse_order_query;
use super::{created_timestamp, updated_timestamp, EntityContext, EntityType};
use crate::errors::StoreError;
use crate::hooks::HookBinding;
use crate::store::{CommerceStore, ObjectKind, OrderQuery};

pub(super) const SLUG: &str = "orders";

/// Maximum orders returned by the built-in search.
const SEARCH_LIMIT: usize = 10;

const HOOKS: &[HookBinding] = &[
    HookBinding::create("woocommerce_new_order"),
    HookBinding::create("woocommerce_untrash_order"),
    HookBinding::create("untrashed_post"),
    HookBinding::update("woocommerce_update_order"),
    HookBinding::delete("woocommerce_delete_order"),
    HookBinding::delete("woocommerce_trash_order"),
    HookBinding::delete("wp_trash_post"),
];

/// Orders entity.
pub struct Orders {
    descriptor: EntityDescriptor,
    context: EntityContext,
}

impl Orders {
    pub fn new(context: &EntityContext) -> Self {
        let layout = Layout::new(
            Template::DoubleRow,
            [
                ("primary_image", Binding::icon("inbox")),
                ("primary_text", Binding::field("order_number")),
                (
                    "secondary_text",
                    Binding::fields(&["full_name", "created_at_formatted"]),
                ),
                ("primary_action", Binding::action("Edit", "edit_url")),
            ],
        );
        let descriptor = EntityDescriptor::new(SLUG, "Orders", layout)
            .with_searchable_fields(&["order_number", "billing", "items"])
            .with_display_fields(&["order_number", "full_name", "created_at_formatted", "edit_url"]);

        Self {
            descriptor: context.filter_descriptor(descriptor),
            context: context.clone(),
        }
    }

    fn map_order(&self, order: &Order) -> IndexableRecord {
        let created_at = created_timestamp(order.date_created, order.post_date);
        let updated_at = updated_timestamp(order.date_modified, created_at);
        let items: Vec<Value> = order
            .line_items
            .iter()
            .map(|item| Value::String(item.name.clone()))
            .collect();

        let record = IndexableRecord::new(order.id)
            .with("order_number", format!("#{}", order.order_number()))
            .with("status", order.status.clone())
            .with("total", order.total.clone())
            .with("customer_id", order.customer_id)
            .with("billing", billing_address(&order.billing))
            .with("shipping", shipping_address(&order.shipping))
            .with("full_name", order.billing.full_name())
            .with("items", items)
            .with("edit_url", self.context.map.edit_post_url(order.id))
            .with("created_at", created_at)
            .with(
                "created_at_formatted",
                format!("Placed on {}", self.context.map.format_date(created_at)),
            )
            .with("updated_at", updated_at);

        self.context.filter_record(SLUG, record)
    }
}

fn billing_address(address: &Address) -> Value {
    json!({
        "first_name": address.first_name,
        "last_name": address.last_name,
        "company": address.company,
        "email": address.email,
        "phone": address.phone,
        "address_1": address.address_1,
        "address_2": address.address_2,
        "city": address.city,
        "state": address.state,
        "postcode": address.postcode,
        "country": address.country,
    })
}

fn shipping_address(address: &Address) -> Value {
    json!({
        "first_name": address.first_name,
        "last_name": address.last_name,
        "company": address.company,
        "address_1": address.address_1,
        "address_2": address.address_2,
        "city": address.city,
        "state": address.state,
        "postcode": address.postcode,
        "country": address.country,
        "phone": address.phone,
    })
}

#[async_trait]
impl EntityType for Orders {
    fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    fn hooks(&self) -> &'static [HookBinding] {
        HOOKS
    }

    fn accepts(&self, object: &DomainObject) -> bool {
        object.as_order().is_some()
    }

    fn map(&self, object: &DomainObject) -> IndexableRecord {
        match object.as_order() {
            Some(order) => self.map_order(order),
            None => IndexableRecord::empty(),
        }
    }

    async fn resolve(
        &self,
        store: &dyn CommerceStore,
        id: u64,
    ) -> Result<Option<DomainObject>, StoreError> {
        Ok(store.get_order(id).await?.map(DomainObject::Order))
    }

    /// Orders may live outside the posts table, so a resolvable order counts
    /// as owned even when the post type does not match.
    async fn owns(&self, store: &dyn CommerceStore, id: u64) -> Result<bool, StoreError> {
        if store.post_type(id).await?.as_deref() == Some(ORDER_POST_TYPE) {
            return Ok(true);
        }
        Ok(store.get_order(id).await?.is_some())
    }

    fn stored_kind(&self) -> Option<ObjectKind> {
        Some(ObjectKind::Order)
    }

    async fn search(
        &self,
        store: &dyn CommerceStore,
        query: &str,
    ) -> Result<Vec<DomainObject>, StoreError> {
        let parsed = parse_order_query(query);
        let query = OrderQuery {
            text: parsed.text,
            billing_email: parsed.email,
            limit: SEARCH_LIMIT,
        };

        Ok(store
            .search_orders(&query)
            .await?
            .into_iter()
            .map(DomainObject::Order)
            .collect())
    }

    async fn list(
        &self,
        store: &dyn CommerceStore,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<DomainObject>, StoreError> {
        Ok(store
            .list_orders(page, per_page)
            .await?
            .into_iter()
            .map(DomainObject::Order)
            .collect())
    }

    async fn list_ids(
        &self,
        store: &dyn CommerceStore,
        page: usize,
        per_page: usize,
    ) -> Result<Option<Vec<u64>>, StoreError> {
        Ok(Some(store.list_order_ids(page, per_page).await?))
    }
}
