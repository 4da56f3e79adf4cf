//! Cache Entry Module
//!
//! Defines the structure for individual cached responses with TTL support.

use std::time::Duration;

use axum::body::Bytes;
use tokio::time::Instant;

// == Cached Response ==
/// Payload replayed verbatim on a cache hit.
///
/// Only `200 OK` responses are ever stored, so the status is implied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// `Content-Type` of the original response, if it had one
    pub content_type: Option<String>,
    /// Raw response body
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(content_type: Option<String>, body: Bytes) -> Self {
        Self { content_type, body }
    }

    /// Serialized size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.body.len()
    }
}

// == Cache Entry ==
/// A cached response plus its expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: CachedResponse,
    /// When the entry was (last) written
    pub inserted_at: Instant,
    /// Lifetime fixed at insertion
    pub ttl: Duration,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: CachedResponse, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    /// Instant at which the entry stops being served.
    pub fn expires_at(&self) -> Instant {
        self.inserted_at + self.ttl
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches `inserted_at + ttl`, so a
    /// zero TTL is expired immediately.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at()
    }

    // == Time To Live ==
    /// Remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at().saturating_duration_since(Instant::now())
    }

    /// Time since the entry was written.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.inserted_at)
    }
}
