//! TTL Sweep Task
//!
//! Background task that periodically evicts expired responses, so keys that are
//! never requested again do not pin memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// Each run takes the same write lock as request-path lookups and writes.
///
/// # Arguments
/// * `store` - Shared store, from `CacheService::store`
/// * `interval_secs` - Seconds between sweeps (minimum 1)
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = CacheService::new(CacheSettings::default());
/// let sweep_handle = spawn_sweep_task(cache.store(), 1);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(store: Arc<RwLock<CacheStore>>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let (removed, remaining) = {
                let mut guard = store.write().await;
                let removed = guard.cleanup_expired();
                (removed, guard.len())
            };

            if removed > 0 {
                info!(removed, remaining, "TTL sweep evicted expired responses");
            } else {
                debug!(remaining, "TTL sweep: no expired responses");
            }
        }
    })
}
