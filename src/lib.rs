//! Fund Proxy - mobile API proxy with a selective response cache
//!
//! Caches portfolio, profile and transaction reads in memory and invalidates them
//! when a mutation through the proxy succeeds.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routing;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use cache::CacheService;
pub use config::Config;
pub use tasks::spawn_sweep_task;
