//! HTTP request handlers for the web server.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::AppState;
use crate::services::{CatalogError, RecommendError};

/// Error answer: `{success: false, detail}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(d) => (StatusCode::BAD_REQUEST, d),
            ApiError::Forbidden(d) => (StatusCode::FORBIDDEN, d),
            ApiError::NotFound(d) => (StatusCode::NOT_FOUND, d),
            ApiError::Internal(d) => (StatusCode::INTERNAL_SERVER_ERROR, d),
        };
        (status, Json(json!({ "success": false, "detail": detail }))).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => ApiError::NotFound(err.to_string()),
            other => {
                error!("Search failed: {}", other);
                ApiError::Internal(format!("search failed: {other}"))
            }
        }
    }
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::NotFound(_) => ApiError::NotFound(err.to_string()),
            other => {
                error!("Recommendation failed: {}", other);
                ApiError::Internal(format!("recommendation failed: {other}"))
            }
        }
    }
}

/// Serialize `payload` and mark it successful.
fn success(payload: impl Serialize) -> Result<Json<Value>, ApiError> {
    let mut value =
        serde_json::to_value(payload).map_err(|e| ApiError::Internal(e.to_string()))?;
    if let Value::Object(map) = &mut value {
        map.insert("success".to_string(), Value::Bool(true));
    }
    Ok(Json(value))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "novelmind" }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Search a title, crawling it on a catalog miss.
pub async fn search_novels(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query parameter `q` is required".into()));
    }

    let outcome = state.catalog.search(query).await?;
    success(outcome)
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

/// Entries similar to the one with `id`.
pub async fn recommendations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, ApiError> {
    let summary = state.recommender.summary(id, params.limit).await?;
    success(summary)
}

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: String,
}

/// Relay an image from an allowlisted host.
pub async fn proxy_image(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> Result<Response, ApiError> {
    let url = params.url.trim();
    let is_http = url.starts_with("http://") || url.starts_with("https://");
    if !is_http || !state.site.is_proxy_allowed(url) {
        return Err(ApiError::Forbidden("unsupported image host".into()));
    }

    let referer = format!("{}/", state.site.base_url.trim_end_matches('/'));
    let image = state
        .images
        .fetch_passthrough(url, Some(&referer))
        .await
        .map_err(|e| {
            warn!("Image proxy fetch failed: {}", e);
            ApiError::NotFound(format!("image unavailable: {e}"))
        })?;

    let content_type = image
        .content_type
        .unwrap_or_else(|| "image/jpeg".to_string());
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        image.bytes,
    )
        .into_response())
}
