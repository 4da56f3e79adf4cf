//! API Routes
//!
//! Configures the Axum router: administrative endpoints, the forwarding fallback
//! and the response cache layer in front of both.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_status_handler, clear_cache_handler, forward_handler, health_handler, AppState,
};
use crate::middleware::response_cache_layer;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /clear-response-cache` - Flush every cached response
/// - `GET /cache-status` - Cached entries and statistics
/// - `GET /health` - Health check endpoint
/// - anything else - Forwarded to the backend
///
/// # Middleware
/// - Response cache: classifies every request; administrative paths fall outside
///   every route family and pass straight through
/// - CORS: Allows any origin (the mobile client calls from arbitrary origins)
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/clear-response-cache", post(clear_cache_handler))
        .route("/cache-status", get(cache_status_handler))
        .route("/health", get(health_handler))
        .fallback(forward_handler)
        .layer(from_fn_with_state(state.cache.clone(), response_cache_layer))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
