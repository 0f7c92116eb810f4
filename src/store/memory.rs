//! In-Memory Store Module
//!
//! A [`KeyValueStore`] backend over a locked HashMap with store-owned
//! expiry. Serves as the default backend and as the test double: the
//! connection can be flipped down and transient faults can be injected
//! mid-call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use globset::Glob;
use tokio::sync::RwLock;

use crate::error::{CacheError, Result};
use crate::marshal::Field;
use crate::store::{KeyStream, KeyValueStore, StoreEntry, StoredValue};

// == Memory Store ==
/// In-memory key-value store with lazy expiry.
///
/// Expired entries are dropped the moment a read, existence check or
/// scan touches them; a [`purge_expired`](MemoryStore::purge_expired)
/// sweep removes the rest in bulk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key-value storage
    entries: RwLock<HashMap<String, StoreEntry>>,
    /// Simulated connection state; false fails every data operation
    disconnected: AtomicBool,
    /// Remaining operations to fail with an injected transient fault
    fault_budget: AtomicU32,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty, connected store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Test Knobs ==
    /// Flips the simulated connection state.
    pub fn set_connected(&self, connected: bool) {
        self.disconnected.store(!connected, Ordering::SeqCst);
    }

    /// Injects transient faults into the next `n` data operations.
    pub fn fail_next_ops(&self, n: u32) {
        self.fault_budget.store(n, Ordering::SeqCst);
    }

    /// Checks the simulated connection and fault budget before a data
    /// operation.
    fn check_faults(&self) -> Result<()> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(CacheError::StoreUnavailable);
        }
        if self
            .fault_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(CacheError::TransientStore(
                "injected transient fault".to_string(),
            ));
        }
        Ok(())
    }

    // == Purge Expired ==
    /// Removes all expired entries in bulk.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn string_set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.check_faults()?;

        let mut entries = self.entries.write().await;
        // ttl = None clears any previous expiry, matching an
        // unconditional string overwrite
        entries.insert(
            key.to_string(),
            StoreEntry::new(StoredValue::Scalar(value.to_string()), ttl),
        );
        Ok(())
    }

    async fn string_get(&self, key: &str) -> Result<Option<String>> {
        self.check_faults()?;

        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => match &entry.value {
                StoredValue::Scalar(value) => Ok(Some(value.clone())),
                // Representation mismatch reads as absent
                StoredValue::Fields(_) => Ok(None),
            },
            None => Ok(None),
        }
    }

    async fn field_map_set(&self, key: &str, fields: &[Field]) -> Result<()> {
        self.check_faults()?;

        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            // Merge into an existing live field map, preserving its expiry
            Some(entry) if !entry.is_expired() => {
                if let StoredValue::Fields(map) = &mut entry.value {
                    for field in fields {
                        map.insert(field.name.clone(), field.value.clone());
                    }
                    return Ok(());
                }
                // A scalar under this key is overwritten wholesale
                entry.value = StoredValue::Fields(collect_fields(fields));
                entry.expires_at = None;
                Ok(())
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    StoreEntry::new(StoredValue::Fields(collect_fields(fields)), None),
                );
                Ok(())
            }
        }
    }

    async fn field_map_get_all(&self, key: &str) -> Result<Vec<Field>> {
        self.check_faults()?;

        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(Vec::new())
            }
            Some(entry) => match &entry.value {
                StoredValue::Fields(map) => Ok(map
                    .iter()
                    .map(|(name, value)| Field::new(name.clone(), value.clone()))
                    .collect()),
                StoredValue::Scalar(_) => Ok(Vec::new()),
            },
            None => Ok(Vec::new()),
        }
    }

    async fn key_exists(&self, key: &str) -> Result<bool> {
        self.check_faults()?;

        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    async fn key_delete(&self, key: &str) -> Result<bool> {
        self.check_faults()?;

        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some())
    }

    async fn key_expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.check_faults()?;

        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expire_in(ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn scan_keys(&self, pattern: &str) -> Result<KeyStream> {
        self.check_faults()?;

        let matcher = Glob::new(pattern)
            .map_err(|e| CacheError::TransientStore(format!("bad scan pattern: {}", e)))?
            .compile_matcher();

        let entries = self.entries.read().await;
        let keys: Vec<String> = entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && matcher.is_match(key))
            .map(|(key, _)| key.clone())
            .collect();

        Ok(Box::pin(tokio_stream::iter(keys)))
    }

    fn is_connected(&self) -> bool {
        !self.disconnected.load(Ordering::SeqCst)
    }
}

// == Helpers ==
fn collect_fields(fields: &[Field]) -> HashMap<String, String> {
    fields
        .iter()
        .map(|f| (f.name.clone(), f.value.clone()))
        .collect()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_string_set_and_get() {
        let store = MemoryStore::new();

        store.string_set("k", "v", None).await.unwrap();

        assert_eq!(store.string_get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_string_get_absent() {
        let store = MemoryStore::new();

        assert_eq!(store.string_get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_string_set_with_ttl_expires() {
        let store = MemoryStore::new();

        store
            .string_set("k", "v", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(store.key_exists("k").await.unwrap());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(!store.key_exists("k").await.unwrap());
        assert_eq!(store.string_get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_string_overwrite_clears_ttl() {
        let store = MemoryStore::new();

        store
            .string_set("k", "v1", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        store.string_set("k", "v2", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(store.string_get("k").await.unwrap(), Some("v2".to_string()));
    }

    #[tokio::test]
    async fn test_field_map_set_and_get_all() {
        let store = MemoryStore::new();

        store
            .field_map_set("h", &[Field::new("a", "1"), Field::new("b", "2")])
            .await
            .unwrap();

        let mut fields = store.field_map_get_all("h").await.unwrap();
        fields.sort_by(|x, y| x.name.cmp(&y.name));

        assert_eq!(fields, vec![Field::new("a", "1"), Field::new("b", "2")]);
    }

    #[tokio::test]
    async fn test_field_map_set_merges_and_keeps_expiry() {
        let store = MemoryStore::new();

        store
            .field_map_set("h", &[Field::new("a", "1")])
            .await
            .unwrap();
        store
            .key_expire("h", Duration::from_millis(80))
            .await
            .unwrap();
        store
            .field_map_set("h", &[Field::new("b", "2")])
            .await
            .unwrap();

        let fields = store.field_map_get_all("h").await.unwrap();
        assert_eq!(fields.len(), 2);

        tokio::time::sleep(Duration::from_millis(110)).await;
        assert!(!store.key_exists("h").await.unwrap());
    }

    #[tokio::test]
    async fn test_representation_mismatch_reads_empty() {
        let store = MemoryStore::new();

        store.string_set("s", "plain", None).await.unwrap();
        store
            .field_map_set("h", &[Field::new("a", "1")])
            .await
            .unwrap();

        assert!(store.field_map_get_all("s").await.unwrap().is_empty());
        assert_eq!(store.string_get("h").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_key_delete() {
        let store = MemoryStore::new();

        store.string_set("k", "v", None).await.unwrap();

        assert!(store.key_delete("k").await.unwrap());
        assert!(!store.key_delete("k").await.unwrap());
        assert!(!store.key_exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_key_expire_on_missing_key() {
        let store = MemoryStore::new();

        let armed = store
            .key_expire("missing", Duration::from_secs(10))
            .await
            .unwrap();
        assert!(!armed);
    }

    #[tokio::test]
    async fn test_scan_keys_glob_pattern() {
        let store = MemoryStore::new();

        store.string_set("user:1", "a", None).await.unwrap();
        store.string_set("user:2", "b", None).await.unwrap();
        store.string_set("order:1", "c", None).await.unwrap();

        let mut keys: Vec<String> = store
            .scan_keys("user:*")
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;
        keys.sort();

        assert_eq!(keys, vec!["user:1".to_string(), "user:2".to_string()]);
    }

    #[tokio::test]
    async fn test_scan_skips_expired_keys() {
        let store = MemoryStore::new();

        store
            .string_set("user:1", "a", Some(Duration::from_millis(40)))
            .await
            .unwrap();
        store.string_set("user:2", "b", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(70)).await;

        let keys: Vec<String> = store
            .scan_keys("user:*")
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;

        assert_eq!(keys, vec!["user:2".to_string()]);
    }

    #[tokio::test]
    async fn test_disconnected_store_fails_operations() {
        let store = MemoryStore::new();
        store.set_connected(false);

        assert!(!store.is_connected());
        assert!(matches!(
            store.string_set("k", "v", None).await,
            Err(CacheError::StoreUnavailable)
        ));
        assert!(matches!(
            store.key_exists("k").await,
            Err(CacheError::StoreUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_fault_injection_consumes_budget() {
        let store = MemoryStore::new();
        store.fail_next_ops(1);

        assert!(matches!(
            store.key_exists("k").await,
            Err(CacheError::TransientStore(_))
        ));
        // Budget exhausted, next call succeeds
        assert!(!store.key_exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_expired_removes_in_bulk() {
        let store = MemoryStore::new();

        store
            .string_set("gone", "x", Some(Duration::from_millis(30)))
            .await
            .unwrap();
        store.string_set("kept", "y", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        let removed = store.purge_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.key_exists("kept").await.unwrap());
    }
}
