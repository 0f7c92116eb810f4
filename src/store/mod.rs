//! Store Module
//!
//! The key-value store boundary: the minimum contract the cache layer
//! requires from a backend, plus an in-memory implementation used as
//! the default backend and as the test double.

mod entry;
mod memory;

pub use entry::{current_timestamp_ms, StoreEntry, StoredValue};
pub use memory::MemoryStore;

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use tokio_stream::Stream;

use crate::error::Result;
use crate::marshal::Field;

// == Key Stream ==
/// Lazy sequence of keys produced by a pattern scan.
///
/// Bounded by the server-side result count; not restartable — each
/// scan call produces a fresh stream.
pub type KeyStream = Pin<Box<dyn Stream<Item = String> + Send>>;

// == Key Value Store Trait ==
/// Minimum contract a backend must provide.
///
/// All fallible operations return [`CacheError`](crate::CacheError):
/// implementations report a down connection as `StoreUnavailable` and
/// map any other transport failure to `TransientStore`. Expiry is owned
/// by the store; callers never re-check TTLs themselves.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Writes a flat string payload, with optional expiry set atomically.
    async fn string_set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Reads a flat string payload; `None` when absent or when the key
    /// holds a field map.
    async fn string_get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a field map, merging into an existing map under the key.
    async fn field_map_set(&self, key: &str, fields: &[Field]) -> Result<()>;

    /// Reads all fields of a field map; empty when the key is absent or
    /// holds a string payload.
    async fn field_map_get_all(&self, key: &str) -> Result<Vec<Field>>;

    /// Checks whether a key currently exists (and has not expired).
    async fn key_exists(&self, key: &str) -> Result<bool>;

    /// Deletes a key; returns whether it existed.
    async fn key_delete(&self, key: &str) -> Result<bool>;

    /// Arms or re-arms a key's expiry; returns whether the key existed.
    async fn key_expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Scans for keys matching a glob-style pattern.
    async fn scan_keys(&self, pattern: &str) -> Result<KeyStream>;

    /// Reports the connection state at this instant.
    fn is_connected(&self) -> bool;
}
