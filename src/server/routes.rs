//! Router configuration for the web server.

use axum::http::HeaderValue;
use axum::{routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/novels/search", get(handlers::search_novels))
        .route("/api/recommendations/:id", get(handlers::recommendations))
        .route("/api/proxy/image", get(handlers::proxy_image))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Permissive CORS unless specific origins are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
