//! Cache Client Module
//!
//! Thin typed access to the key-value store plus the read-through
//! orchestration algorithm. The client is constructed explicitly around
//! a shared store handle and passed by reference; the convention is one
//! client per process sharing one handle, with thread-safety of the
//! handle delegated to the store implementation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::codec::{CacheCodec, Payload, Repr};
use crate::config::StoreConfig;
use crate::error::{CacheError, MarshalError, Result};
use crate::response::Response;
use crate::store::{KeyStream, KeyValueStore};

// == Cache Client ==
/// Typed cache access over a [`KeyValueStore`] handle.
///
/// The read-through path ([`try_get_or_compute`](Self::try_get_or_compute))
/// is best-effort by contract: it must never make the caller's critical
/// path less reliable than running the fallback computation directly,
/// so every store failure converges to "run the real computation" and
/// no store error is ever surfaced to the caller.
pub struct CacheClient<S> {
    /// Shared store handle
    store: Arc<S>,
    /// Connection surface forwarded to the backend's transport
    config: StoreConfig,
}

impl<S: KeyValueStore> CacheClient<S> {
    // == Constructors ==
    /// Creates a client over a shared store handle with default
    /// configuration.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, StoreConfig::default())
    }

    /// Creates a client carrying an explicit store configuration.
    pub fn with_config(store: Arc<S>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    /// Returns the connection configuration this client forwards to the
    /// store transport.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // == Set ==
    /// Writes a value under `key`, with optional TTL.
    ///
    /// Scalar types go through the string lane, record types through
    /// the field-map lane; the lane is fixed by the value's
    /// [`CacheCodec::REPR`]. When a TTL is given, an additional expiry
    /// call is issued after the write, best-effort: its failure is
    /// logged and the write still counts as successful, leaving an
    /// entry without expiry.
    ///
    /// # Errors
    /// - `InvalidKey` when `key` is empty
    /// - `StoreUnavailable` when the connection is down, checked before
    ///   the write is attempted
    pub async fn set<T: CacheCodec>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }
        if !self.store.is_connected() {
            return Err(CacheError::StoreUnavailable);
        }

        match value.encode()? {
            Payload::Scalar(scalar) => self.store.string_set(key, &scalar, ttl).await?,
            Payload::Fields(fields) => self.store.field_map_set(key, &fields).await?,
        }

        if let Some(ttl) = ttl {
            if let Err(err) = self.store.key_expire(key, ttl).await {
                warn!("failed to arm expiry for '{}': {}", key, err);
            }
        }

        Ok(())
    }

    // == Get ==
    /// Reads a value of type `T` under `key`.
    ///
    /// No existence pre-check: an absent key decodes from the empty
    /// payload of `T`'s lane, which for most types is the zero value.
    /// "Absent" and "found but empty" are distinguished only by a
    /// separate [`key_exists`](Self::key_exists) call.
    pub async fn get<T: CacheCodec>(&self, key: &str) -> Result<T> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }
        if !self.store.is_connected() {
            return Err(CacheError::StoreUnavailable);
        }

        let payload = match T::REPR {
            Repr::Scalar => {
                Payload::Scalar(self.store.string_get(key).await?.unwrap_or_default())
            }
            Repr::Record => Payload::Fields(self.store.field_map_get_all(key).await?),
        };

        Ok(T::decode(payload)?)
    }

    // == Key Exists ==
    /// Checks whether `key` currently exists on the store.
    pub async fn key_exists(&self, key: &str) -> Result<bool> {
        self.store.key_exists(key).await
    }

    // == Invalidate ==
    /// Deletes `key` from the store; returns whether it existed.
    pub async fn invalidate(&self, key: &str) -> Result<bool> {
        self.store.key_delete(key).await
    }

    // == Scan Keys ==
    /// Scans the store for keys matching a glob-style pattern.
    ///
    /// Lazy and not restartable; each call re-scans.
    pub async fn scan_keys(&self, pattern: &str) -> Result<KeyStream> {
        self.store.scan_keys(pattern).await
    }

    // == Try Get Or Compute ==
    /// The read-through algorithm.
    ///
    /// Decision sequence:
    /// 1. Connection down: run `compute` and return its envelope
    ///    unchanged, with no store interaction.
    /// 2. Key missing: run `compute`; if it succeeded (code `0`), store
    ///    its payload as a JSON string under `key` with `ttl`. The
    ///    computed envelope is returned whether or not the population
    ///    write succeeded.
    /// 3. Key present: read and decode the stored JSON. A payload that
    ///    fails to decode (or decodes to null) evicts the key and
    ///    yields the decode-failure envelope (code `-3`) — `compute` is
    ///    NOT run on this call; the next call finds a miss and
    ///    repopulates.
    /// 4. Any store error along the way: logged, then `compute` runs as
    ///    the fallback if it has not already run in this call.
    ///
    /// Two callers racing on the same missing key may both compute and
    /// both write; last write wins. No single-flight de-duplication is
    /// attempted.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use sidecache::{CacheClient, MemoryStore, Response};
    ///
    /// let client = CacheClient::new(Arc::new(MemoryStore::new()));
    /// let envelope = tokio_test::block_on(client.try_get_or_compute(
    ///     "answer",
    ///     Duration::from_secs(60),
    ///     || async { Response::success(42u32) },
    /// ));
    /// assert_eq!(envelope.data, Some(42));
    /// ```
    pub async fn try_get_or_compute<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Response<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Response<T>>,
    {
        if !self.store.is_connected() {
            return compute().await;
        }

        match self.store.key_exists(key).await {
            Ok(true) => match self.read_cached::<T>(key).await {
                Ok(envelope) => envelope,
                Err(err) => {
                    warn!("store error reading cached '{}': {}", key, err);
                    compute().await
                }
            },
            Ok(false) => {
                let computed = compute().await;
                if computed.is_success() {
                    if let Err(err) = self.populate(key, &computed.data, ttl).await {
                        warn!("failed to populate cache for '{}': {}", key, err);
                    }
                }
                computed
            }
            Err(err) => {
                warn!("store error checking '{}': {}", key, err);
                compute().await
            }
        }
    }

    // == Hit Path ==
    /// Reads and decodes a known-present key.
    ///
    /// A decode failure is self-healing: the corrupt entry is evicted
    /// so the next call repopulates, but the failure envelope is still
    /// surfaced this one time. Store errors propagate to the caller's
    /// fallback match.
    async fn read_cached<T: DeserializeOwned>(&self, key: &str) -> Result<Response<T>> {
        let raw = self.get::<String>(key).await?;

        match decode_stored::<T>(key, &raw) {
            Ok(data) => Ok(Response::success(data)),
            Err(err) => {
                warn!("{}", err);
                if let Err(del_err) = self.store.key_delete(key).await {
                    warn!("failed to evict corrupt key '{}': {}", key, del_err);
                }
                Ok(Response::decode_failure(key))
            }
        }
    }

    // == Miss Path ==
    /// Serializes a computed payload as JSON and writes it through the
    /// scalar lane.
    async fn populate<T: Serialize>(
        &self,
        key: &str,
        data: &Option<T>,
        ttl: Duration,
    ) -> Result<()> {
        let json = serde_json::to_string(data).map_err(MarshalError::Json)?;
        self.set(key, &json, Some(ttl)).await
    }
}

// == Helpers ==
/// Decodes a stored JSON payload, treating a JSON null the same as
/// unparseable text.
fn decode_stored<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    match serde_json::from_str::<Option<T>>(raw) {
        Ok(Some(data)) => Ok(data),
        Ok(None) => Err(CacheError::DecodeFailure {
            key: key.to_string(),
            reason: "stored payload is null".to_string(),
        }),
        Err(err) => Err(CacheError::DecodeFailure {
            key: key.to_string(),
            reason: err.to_string(),
        }),
    }
}
