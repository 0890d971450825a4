//! REST surface: search, front end bootstrap data, hook ingress and health.

pub mod bootstrap;
pub mod handlers;
pub mod ingress;
pub mod search;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Dependencies;
use crate::AppError;

pub use bootstrap::BootstrapData;
pub use handlers::AppState;
pub use ingress::{HookOutcome, HookPayload, HookResponse};
pub use search::{SearchService, SearchView, ALL_ENTITIES};

/// Route prefix of the plugin endpoints.
pub const API_NAMESPACE: &str = "/wc/merchant-buddy/default";

/// CORS for the palette front end. Requests carry a bearer token, never
/// cookies, so any origin may call.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Create the application router.
pub fn create_app(deps: Arc<Dependencies>) -> Router {
    let state = AppState { deps };
    let api = Router::new()
        .route("/search/:entity", get(handlers::search_handler))
        .route("/bootstrap", get(handlers::bootstrap_handler))
        .route("/hooks/:hook", post(handlers::hook_handler));

    Router::new()
        .nest(API_NAMESPACE, api)
        .route("/health", get(handlers::health_check))
        .layer(create_cors_layer())
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Server listening on {}", addr);
    info!("- Search endpoint: http://{}{}/search/{{entity}}?s=", addr, API_NAMESPACE);
    info!("- Hook endpoint: http://{}{}/hooks/{{hook}}", addr, API_NAMESPACE);
    info!("- Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::server(e.to_string()))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await
        .map_err(|e| AppError::server(e.to_string()))
}
