// HTTP request handlers
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, warn};

use super::bootstrap::BootstrapData;
use super::ingress::{self, HookPayload, HookResponse};
use super::search::SearchView;
use crate::config::Dependencies;
use crate::errors::SearchApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<Dependencies>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub view: SearchView,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Merchant search is running")
}

/// `GET /search/{entity}?s=<query>[&view=layout]`
pub async fn search_handler(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Result<Json<Map<String, Value>>, SearchApiError> {
    authorize(&headers, state.deps.admin_token.as_deref())?;
    let data = state
        .deps
        .search
        .search(&entity, &params.s, params.view)
        .await?;
    Ok(Json(data))
}

/// `GET /bootstrap`
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BootstrapData>, SearchApiError> {
    authorize(&headers, state.deps.admin_token.as_deref())?;
    Ok(Json(BootstrapData::collect(&state.deps)))
}

/// `POST /hooks/{hook}` with a `{id, object?}` body.
pub async fn hook_handler(
    State(state): State<AppState>,
    Path(hook): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<HookPayload>,
) -> Result<Json<HookResponse>, SearchApiError> {
    authorize(&headers, state.deps.admin_token.as_deref())?;
    let response = ingress::ingest(&state.deps, &hook, payload).await?;
    Ok(Json(response))
}

/// Admin capability check: the request must carry the configured bearer token.
///
/// Without a configured token nobody holds the capability.
pub fn authorize(headers: &HeaderMap, admin_token: Option<&str>) -> Result<(), SearchApiError> {
    let supplied = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match (supplied, admin_token) {
        (None, _) => Err(SearchApiError::Unauthorized),
        (Some(token), Some(expected)) if !expected.is_empty() && token == expected => Ok(()),
        (Some(_), _) => {
            warn!("Rejected request with invalid admin token");
            Err(SearchApiError::Forbidden)
        }
    }
}

impl SearchApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            SearchApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            SearchApiError::Forbidden => StatusCode::FORBIDDEN,
            SearchApiError::UnknownEntity(_) | SearchApiError::UnknownHook(_) => {
                StatusCode::BAD_REQUEST
            }
            SearchApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            SearchApiError::Unauthorized | SearchApiError::Forbidden => {
                "woocommerce_rest_cannot_view"
            }
            SearchApiError::UnknownEntity(_) | SearchApiError::UnknownHook(_) => {
                "rest_invalid_param"
            }
            SearchApiError::Store(_) => "merchant_buddy_store_error",
        }
    }
}

impl IntoResponse for SearchApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "API request failed");
        }
        let message = match &self {
            SearchApiError::Unauthorized => SearchApiError::Forbidden.to_string(),
            other => other.to_string(),
        };

        (
            status,
            Json(json!({
                "code": self.code(),
                "message": message,
                "data": { "status": status.as_u16() }
            })),
        )
            .into_response()
    }
}
