//! TTL Sweep Task
//!
//! Background task that periodically removes expired route cache entries,
//! so stale routes do not linger until their next read.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::RouteCache;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. It acquires a write lock on the route cache to remove
/// expired entries.
///
/// # Arguments
/// * `cache` - Shared reference to the route cache
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<RouteCache>>,
    sweep_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            // Acquire write lock and sweep expired entries
            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.sweep_expired()
            };

            // Log sweep statistics
            if removed > 0 {
                info!("TTL sweep: removed {} expired routes", removed);
            } else {
                debug!("TTL sweep: no expired routes found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::{RouteMode, RoutePayload, RouteRequest};

    fn request(origin: &str) -> RouteRequest {
        RouteRequest {
            origin: origin.to_string(),
            destination: "Brno".to_string(),
            waypoints: vec![],
            use_highways: false,
            mode: RouteMode::Time,
            departure_time: None,
            traffic_model: None,
        }
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        // Entries expire after 100ms; the sweep runs every second.
        let cache = Arc::new(RwLock::new(RouteCache::new(
            20,
            Duration::from_millis(100),
        )));

        {
            let mut cache_guard = cache.write().await;
            cache_guard.put(&request("Prague"), RoutePayload::default());
        }

        let handle = spawn_cleanup_task(cache.clone(), 1);

        // Wait for the entry to expire and the sweep to run
        tokio::time::sleep(Duration::from_millis(1500)).await;

        {
            let cache_guard = cache.read().await;
            assert!(
                cache_guard.is_empty(),
                "Expired route should have been swept"
            );
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_fresh_entries() {
        let cache = Arc::new(RwLock::new(RouteCache::new(20, Duration::from_secs(3600))));

        {
            let mut cache_guard = cache.write().await;
            cache_guard.put(&request("Prague"), RoutePayload::default());
        }

        let handle = spawn_cleanup_task(cache.clone(), 1);

        // Wait for a sweep to run
        tokio::time::sleep(Duration::from_millis(1500)).await;

        {
            let cache_guard = cache.read().await;
            assert_eq!(cache_guard.len(), 1, "Fresh route should not be swept");
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = Arc::new(RwLock::new(RouteCache::new(20, Duration::from_secs(3600))));

        let handle = spawn_cleanup_task(cache, 1);

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
