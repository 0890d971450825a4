//! Integration tests for the REST surface, driven through the router without a
//! listening socket.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use merchant_search::api::create_app;
use merchant_search::config::{Extensions, MemoryOptionStore, Settings, MAIN_SETTINGS_OPTION};
use merchant_search::entities::MapContext;
use merchant_search::store::InMemoryStore;
use merchant_search::Dependencies;
use merchant_search_repository::{IndexProvider, ProviderFactory};
use merchant_search_shared::{DomainObject, RecordId};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{customer, order, product, RecordingProvider};

const TOKEN: &str = "s3cret";

async fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.upsert_order(order(1, "ada@example.com")).await;
    store.upsert_order(order(2, "bob@example.com")).await;
    store.upsert_product(product(10, "Rest Mug", Some(25))).await;
    store.upsert_customer(customer(20, "grace@example.com")).await;
    store
}

fn router(mut deps: Dependencies) -> Router {
    deps.admin_token = Some(TOKEN.to_string());
    create_app(Arc::new(deps))
}

async fn app() -> Router {
    router(Dependencies::build(
        Settings::new(Arc::new(MemoryOptionStore::new())),
        seeded_store().await,
        Extensions::default(),
        MapContext::default(),
    ))
}

/// App whose active provider records every write.
async fn recording_app(provider: Arc<RecordingProvider>) -> Router {
    let mut extensions = Extensions::default();
    extensions.providers.register(
        "recording",
        ProviderFactory::new("Recording", move |_| {
            let provider: Arc<dyn IndexProvider> = provider.clone();
            Ok(provider)
        }),
    );
    let settings = Settings::new(Arc::new(MemoryOptionStore::with_values([(
        MAIN_SETTINGS_OPTION.to_string(),
        json!({ "provider": "recording" }),
    )])));

    router(Dependencies::build(
        settings,
        seeded_store().await,
        extensions,
        MapContext::default(),
    ))
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    request.body(Body::empty()).unwrap()
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    request.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let response = app().await.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_search_projects_display_fields() {
    let response = app()
        .await
        .oneshot(get(
            "/wc/merchant-buddy/default/search/orders?s=%20lovelace%20",
            Some(TOKEN),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);

    let first = orders[0].as_object().unwrap();
    let mut keys: Vec<&str> = first.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["created_at_formatted", "edit_url", "full_name", "id", "order_number"]
    );
    assert_eq!(first["order_number"], "#1");
    assert_eq!(first["full_name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_search_by_email_facet() {
    let response = app()
        .await
        .oneshot(get(
            "/wc/merchant-buddy/default/search/orders?s=email:bob@example.com",
            Some(TOKEN),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], 2);
}

#[tokio::test]
async fn test_search_all_entities() {
    let response = app()
        .await
        .oneshot(get("/wc/merchant-buddy/default/search/all?s=", Some(TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 2);
    assert_eq!(body["products"][0]["name"], "Rest Mug");
    assert_eq!(body["customers"][0]["email"], "grace@example.com");
}

#[tokio::test]
async fn test_unknown_entity_is_bad_request() {
    let response = app()
        .await
        .oneshot(get("/wc/merchant-buddy/default/search/coupons?s=x", Some(TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["code"], "rest_invalid_param");
    assert_eq!(body["data"]["status"], 400);
}

#[tokio::test]
async fn test_missing_and_wrong_tokens() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(get("/wc/merchant-buddy/default/search/orders?s=a", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], "woocommerce_rest_cannot_view");

    let response = app
        .oneshot(get("/wc/merchant-buddy/default/search/orders?s=a", Some("guess")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bootstrap_describes_enabled_entities() {
    let response = app()
        .await
        .oneshot(get("/wc/merchant-buddy/default/bootstrap", Some(TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let entities = body["entities"].as_object().unwrap();
    assert_eq!(
        entities.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["customers", "orders", "products"]
    );
    assert_eq!(body["main"]["provider"], "default");
    assert_eq!(body["main"]["initialEntries"][0], "/");
    assert_eq!(body["main"]["dialog"], true);
    assert_eq!(body["main"]["frontend"], false);
    assert!(body.get("provider").is_none());
}

#[tokio::test]
async fn test_layout_view_resolves_slots() {
    let response = app()
        .await
        .oneshot(get(
            "/wc/merchant-buddy/default/search/orders?s=email:ada@example.com&view=layout",
            Some(TOKEN),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let hit = &body["orders"][0];
    assert_eq!(hit["id"], 1);
    assert_eq!(hit["slots"]["primary_image"], "inbox");
    assert_eq!(hit["slots"]["primary_text"], "#1");
    assert_eq!(hit["slots"]["secondary_text"][0], "Ada Lovelace");
    assert_eq!(hit["slots"]["primary_action"]["label"], "Edit");
}

#[tokio::test]
async fn test_hooks_keep_store_and_index_in_step() {
    let provider = Arc::new(RecordingProvider::default());
    let app = recording_app(provider.clone()).await;
    let hooks = "/wc/merchant-buddy/default/hooks";
    let search = "/wc/merchant-buddy/default/search/orders?s=email:cy@example.com";

    let created = DomainObject::Order(order(3, "cy@example.com"));
    let response = app
        .clone()
        .oneshot(post(
            &format!("{}/woocommerce_new_order", hooks),
            Some(TOKEN),
            json!({ "id": 3, "object": created }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["hook"], "woocommerce_new_order");
    assert_eq!(
        body["outcomes"],
        json!([{ "entity": "orders", "outcome": "written" }])
    );

    let found = json_body(app.clone().oneshot(get(search, Some(TOKEN))).await.unwrap()).await;
    assert_eq!(found["orders"][0]["id"], 3);

    let response = app
        .clone()
        .oneshot(post(
            &format!("{}/woocommerce_delete_order", hooks),
            Some(TOKEN),
            json!({ "id": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let found = json_body(app.clone().oneshot(get(search, Some(TOKEN))).await.unwrap()).await;
    assert!(found["orders"].as_array().unwrap().is_empty());

    assert_eq!(
        provider.calls(),
        vec![
            ("create".to_string(), RecordId::from(3), "orders".to_string()),
            ("delete".to_string(), RecordId::from(3), "orders".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_hook_ingress_rejects_unknown_hooks_and_missing_tokens() {
    let provider = Arc::new(RecordingProvider::default());
    let app = recording_app(provider.clone()).await;

    let response = app
        .clone()
        .oneshot(post(
            "/wc/merchant-buddy/default/hooks/save_post",
            Some(TOKEN),
            json!({ "id": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "rest_invalid_param");

    let response = app
        .oneshot(post(
            "/wc/merchant-buddy/default/hooks/woocommerce_update_order",
            None,
            json!({ "id": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(provider.calls().is_empty());
}
