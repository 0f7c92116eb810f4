//! Expiry Purge Task
//!
//! Background task that periodically removes expired entries from a
//! [`MemoryStore`]. Lazy expiry already drops an expired entry when a
//! read touches it; the purge sweep reclaims the entries nothing reads.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that periodically purges expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified
/// interval between sweeps.
///
/// # Arguments
/// * `store` - Shared reference to the in-memory store
/// * `purge_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the
/// task during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::new());
/// let purge_handle = spawn_purge_task(store.clone(), 1);
/// // Later, during shutdown:
/// purge_handle.abort();
/// ```
pub fn spawn_purge_task(store: Arc<MemoryStore>, purge_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(purge_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry purge task with interval of {} seconds",
            purge_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.purge_expired().await;

            if removed > 0 {
                info!("Expiry purge: removed {} expired entries", removed);
            } else {
                debug!("Expiry purge: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeyValueStore;

    #[tokio::test]
    async fn test_purge_task_removes_expired_entries() {
        let store = Arc::new(MemoryStore::new());

        store
            .string_set("expire_soon", "value", Some(Duration::from_millis(200)))
            .await
            .unwrap();

        let handle = spawn_purge_task(store.clone(), 1);

        // Wait for the entry to expire and the sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(store.len().await, 0, "Expired entry should have been purged");

        handle.abort();
    }

    #[tokio::test]
    async fn test_purge_task_preserves_valid_entries() {
        let store = Arc::new(MemoryStore::new());

        store
            .string_set("long_lived", "value", Some(Duration::from_secs(3600)))
            .await
            .unwrap();

        let handle = spawn_purge_task(store.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(
            store.string_get("long_lived").await.unwrap(),
            Some("value".to_string()),
            "Valid entry should not be removed"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_purge_task_can_be_aborted() {
        let store = Arc::new(MemoryStore::new());

        let handle = spawn_purge_task(store, 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
