//! sidecache - a read-through cache layer over a key-value store
//!
//! Provides cache-aside orchestration (check the cache, fall back to
//! the real computation, populate on miss) plus a record-to-field-map
//! marshaling scheme so arbitrary typed values can be stored as flat
//! strings or field maps.
//!
//! The read-through path is best-effort by contract: a down or
//! misbehaving store never makes the caller's critical path less
//! reliable than running the computation directly.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod marshal;
pub mod response;
pub mod store;
pub mod tasks;

pub use client::CacheClient;
pub use codec::{CacheCodec, Payload, Repr};
pub use config::{StoreConfig, TtlPriority};
pub use error::{CacheError, MarshalError, Result};
pub use marshal::{from_fields, to_fields, Field, FieldRecord, FieldSpec, ScalarKind};
pub use response::{Response, DECODE_FAILURE_CODE, SUCCESS_CODE};
pub use store::{KeyStream, KeyValueStore, MemoryStore};
pub use tasks::spawn_purge_task;
