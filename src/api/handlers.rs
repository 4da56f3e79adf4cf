//! API Handlers
//!
//! Administrative cache endpoints, the health check and the forwarding fallback.

use std::time::Duration;

use axum::{
    extract::{Query, Request, State},
    response::Response,
    Json,
};
use tracing::info;

use crate::cache::CacheService;
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::models::{CacheStatusResponse, FlushResponse, HealthResponse, StatusQuery};
use crate::routing::normalized_path_and_query;
use crate::upstream::BackendClient;

/// Largest request body accepted for forwarding.
const MAX_REQUEST_BODY: usize = 10 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared response cache
    pub cache: CacheService,
    /// Client for the backend business suite
    pub backend: BackendClient,
}

impl AppState {
    pub fn new(cache: CacheService, backend: BackendClient) -> Self {
        Self { cache, backend }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = CacheService::new(config.cache.clone());
        let backend = BackendClient::new(
            config.backend_url.clone(),
            Duration::from_secs(config.upstream_timeout),
        )?;
        Ok(Self::new(cache, backend))
    }
}

/// Handler for POST /clear-response-cache
///
/// Drops every cached response in one atomic step.
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<FlushResponse> {
    let cleared = state.cache.flush().await;
    info!(cleared, "administrative cache flush");
    Json(FlushResponse::new(cleared))
}

/// Handler for GET /cache-status
///
/// Lists stored entries (optionally for one family) with aggregate statistics.
pub async fn cache_status_handler(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Json<CacheStatusResponse> {
    Json(state.cache.status(query.family).await)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Fallback handler forwarding every other request to the backend.
pub async fn forward_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();

    let body = axum::body::to_bytes(body, MAX_REQUEST_BODY)
        .await
        .map_err(|e| ProxyError::InvalidRequest(format!("unreadable request body: {}", e)))?;

    // Same resolved path the cache layer classified on.
    let path_and_query = normalized_path_and_query(&parts.uri);

    state
        .backend
        .forward(parts.method, &path_and_query, &parts.headers, body)
        .await
}
