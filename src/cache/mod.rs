//! Cache Module
//!
//! In-memory response caching with per-family TTL and tag invalidation.

mod entry;
pub mod invalidation;
mod key;
mod service;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CachedResponse};
pub use key::CacheKey;
pub use service::CacheService;
pub use stats::CacheStats;
pub use store::CacheStore;
