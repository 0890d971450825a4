use async_trait::async_trait;
use merchant_search_shared::{
    Binding, DomainObject, EntityDescriptor, IndexableRecord, Layout, Product, Template,
    PRODUCT_POST_TYPE,
};
use serde_json::{json, Value};

use super::{created_timestamp, updated_timestamp, EntityContext, EntityType};
use crate::errors::StoreError;
use crate::hooks::HookBinding;
use crate::store::{CommerceStore, ObjectKind};

pub(super) const SLUG: &str = "products";

const SEARCH_LIMIT: usize = 5;

const HOOKS: &[HookBinding] = &[
    HookBinding::create("woocommerce_new_product"),
    HookBinding::create("woocommerce_new_product_variation"),
    HookBinding::create("woocommerce_process_product_meta"),
    HookBinding::create("untrashed_post"),
    HookBinding::update("woocommerce_update_product"),
    HookBinding::update("woocommerce_update_product_variation"),
    HookBinding::update("woocommerce_update_product_meta"),
    HookBinding::delete("woocommerce_delete_product"),
    HookBinding::delete("woocommerce_trash_product"),
    HookBinding::delete("wp_trash_post"),
];

pub struct Products {
    descriptor: EntityDescriptor,
    context: EntityContext,
}

impl Products {
    pub fn new(context: &EntityContext) -> Self {
        let layout = Layout::new(
            Template::SingleRow,
            [
                ("primary_image", Binding::field("image_url")),
                ("primary_text", Binding::field("name")),
                (
                    "secondary_text",
                    Binding::fields(&["stock_quantity", "variations_count"]),
                ),
                ("primary_action", Binding::action("Edit", "edit_url")),
                ("secondary_action", Binding::action("View", "url")),
            ],
        );
        let descriptor = EntityDescriptor::new(SLUG, "Products", layout);

        Self {
            descriptor: context.filter_descriptor(descriptor),
            context: context.clone(),
        }
    }

    fn map_product(&self, product: &Product) -> IndexableRecord {
        let created_at = created_timestamp(product.date_created, product.post_date);
        let updated_at = updated_timestamp(product.date_modified, created_at);
        let categories: Vec<Value> = product
            .categories
            .iter()
            .map(|category| json!({ "id": category.id, "name": category.name }))
            .collect();

        let record = IndexableRecord::new(product.id)
            .with("name", product.name.clone())
            .with("url", product.permalink.clone())
            .with("edit_url", self.context.map.edit_post_url(product.id))
            .with("price", product.price.clone())
            .with("stock_quantity", stock_label(product.stock_quantity))
            .with("variations_count", variations_label(product.children.len()))
            .with("status", product.status.clone())
            .with("image_url", product.image_url.clone().unwrap_or_default())
            .with("categories", categories)
            .with("created_at", created_at)
            .with("updated_at", updated_at);

        self.context.filter_record(SLUG, record)
    }
}

/// "N in stock", or empty when stock is unmanaged or zero.
fn stock_label(quantity: Option<i64>) -> String {
    match quantity {
        Some(quantity) if quantity != 0 => format!("{} in stock", quantity),
        _ => String::new(),
    }
}

fn variations_label(count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    format!("{} variations", count)
}

#[async_trait]
impl EntityType for Products {
    fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    fn hooks(&self) -> &'static [HookBinding] {
        HOOKS
    }

    fn accepts(&self, object: &DomainObject) -> bool {
        object.as_product().is_some()
    }

    fn map(&self, object: &DomainObject) -> IndexableRecord {
        match object.as_product() {
            Some(product) => self.map_product(product),
            None => IndexableRecord::empty(),
        }
    }

    async fn resolve(
        &self,
        store: &dyn CommerceStore,
        id: u64,
    ) -> Result<Option<DomainObject>, StoreError> {
        Ok(store.get_product(id).await?.map(DomainObject::Product))
    }

    async fn owns(&self, store: &dyn CommerceStore, id: u64) -> Result<bool, StoreError> {
        Ok(store.post_type(id).await?.as_deref() == Some(PRODUCT_POST_TYPE))
    }

    fn stored_kind(&self) -> Option<ObjectKind> {
        Some(ObjectKind::Product)
    }

    async fn search(
        &self,
        store: &dyn CommerceStore,
        query: &str,
    ) -> Result<Vec<DomainObject>, StoreError> {
        Ok(store
            .search_products(query, SEARCH_LIMIT)
            .await?
            .into_iter()
            .map(DomainObject::Product)
            .collect())
    }

    async fn list(
        &self,
        store: &dyn CommerceStore,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<DomainObject>, StoreError> {
        Ok(store
            .list_products(page, per_page)
            .await?
            .into_iter()
            .map(DomainObject::Product)
            .collect())
    }

    async fn list_ids(
        &self,
        store: &dyn CommerceStore,
        page: usize,
        per_page: usize,
    ) -> Result<Option<Vec<u64>>, StoreError> {
        Ok(Some(store.list_product_ids(page, per_page).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn product(stock: Option<i64>, children: Vec<u64>) -> Product {
        Product {
            id: 77,
            name: "Rest Mug".to_string(),
            permalink: "https://shop.test/product/rest-mug".to_string(),
            price: "12.00".to_string(),
            stock_quantity: stock,
            children,
            status: "publish".to_string(),
            image_url: None,
            categories: vec![merchant_search_shared::ProductCategory {
                id: 4,
                name: "Kitchen".to_string(),
            }],
            date_created: None,
            date_modified: None,
            post_date: None,
        }
    }

    #[test]
    fn test_stock_and_variation_labels() {
        let products = Products::new(&EntityContext::default());

        let record = products.map(&DomainObject::Product(product(Some(25), vec![78, 79])));
        assert_eq!(record.get_str("stock_quantity"), Some("25 in stock"));
        assert_eq!(record.get_str("variations_count"), Some("2 variations"));
        assert_eq!(record.get_str("image_url"), Some(""));
        assert_eq!(record.get("categories"), Some(&json!([{"id": 4, "name": "Kitchen"}])));

        let record = products.map(&DomainObject::Product(product(Some(0), vec![])));
        assert_eq!(record.get_str("stock_quantity"), Some(""));
        assert_eq!(record.get_str("variations_count"), Some(""));

        let record = products.map(&DomainObject::Product(product(None, vec![])));
        assert_eq!(record.get_str("stock_quantity"), Some(""));
    }

    #[test]
    fn test_map_is_deterministic() {
        let products = Products::new(&EntityContext::default());
        let object = DomainObject::Product(product(Some(3), vec![]));
        assert_eq!(products.map(&object), products.map(&object));
    }

    #[test]
    fn test_declares_no_field_sets() {
        let products = Products::new(&EntityContext::default());
        assert!(products.descriptor().searchable_fields.is_empty());
        assert!(products.descriptor().display_fields.is_empty());
    }

    #[tokio::test]
    async fn test_owns_checks_post_type() {
        let products = Products::new(&EntityContext::default());
        let store = InMemoryStore::new();
        store.upsert_product(product(None, vec![])).await;
        store.insert_post(5, "page").await;

        assert!(products.owns(&store, 77).await.unwrap());
        assert!(!products.owns(&store, 5).await.unwrap());
        assert!(!products.owns(&store, 6).await.unwrap());
    }
}
