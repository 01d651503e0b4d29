//! Expiry Sweep Task
//!
//! Reads already ignore expired entries; this task reclaims their memory
//! instead of waiting for the next lookup of the same key.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a task that periodically removes expired cache entries.
///
/// # Arguments
/// * `store` - Shared cache store
/// * `interval` - Time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(CacheStore::new(10_000));
/// let handle = spawn_cleanup_task(store.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<CacheStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting cache expiry sweep");

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = store.cleanup_expired();
            if removed > 0 {
                info!(removed, remaining = store.len(), "Expiry sweep removed entries");
            } else {
                debug!("Expiry sweep found nothing to remove");
            }
        }
    })
}
