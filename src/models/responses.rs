//! Response DTOs for the administrative API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheEntry, CacheKey, CacheStats};
use crate::routing::RouteFamily;

/// Response body for `POST /clear-response-cache`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushResponse {
    pub success: bool,
    /// Number of entries dropped by the flush
    pub cleared_entries: usize,
}

impl FlushResponse {
    pub fn new(cleared_entries: usize) -> Self {
        Self {
            success: true,
            cleared_entries,
        }
    }
}

/// Metadata for one stored entry in `GET /cache-status`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStatus {
    pub key: CacheKey,
    pub family: RouteFamily,
    /// False when the TTL has elapsed but the sweep has not yet run
    pub present: bool,
    pub size_bytes: usize,
    pub ttl_remaining_secs: u64,
    pub age_secs: u64,
}

impl EntryStatus {
    pub fn new(key: &CacheKey, entry: &CacheEntry) -> Self {
        Self {
            key: key.clone(),
            family: key.family(),
            present: !entry.is_expired(),
            size_bytes: entry.value.size_bytes(),
            ttl_remaining_secs: entry.ttl_remaining().as_secs(),
            age_secs: entry.age().as_secs(),
        }
    }
}

/// Response body for `GET /cache-status`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatusResponse {
    pub success: bool,
    /// Whether the response cache middleware is active
    pub enabled: bool,
    pub max_entries: usize,
    /// Entries still within their TTL
    pub live_entries: usize,
    /// Sum of stored body sizes
    pub total_size_bytes: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    pub stats: CacheStats,
    pub entries: Vec<EntryStatus>,
}

impl CacheStatusResponse {
    pub fn new(
        enabled: bool,
        max_entries: usize,
        stats: CacheStats,
        entries: Vec<EntryStatus>,
    ) -> Self {
        Self {
            success: true,
            enabled,
            max_entries,
            live_entries: entries.iter().filter(|e| e.present).count(),
            total_size_bytes: entries.iter().map(|e| e.size_bytes).sum(),
            hit_rate: stats.hit_rate(),
            stats,
            entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
