//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::codec::Repr;
use crate::marshal::ScalarKind;

// == Marshal Error Enum ==
/// Errors produced while converting records to and from field maps.
#[derive(Error, Debug)]
pub enum MarshalError {
    /// A stored scalar could not be converted into its target field type.
    ///
    /// Raised per-field during reconstruction; the whole record is
    /// abandoned rather than returned half-coerced.
    #[error("cannot coerce {raw:?} into {kind} field '{field}'")]
    TypeCoercion {
        /// Name of the field being reconstructed
        field: &'static str,
        /// Declared scalar kind of the target field
        kind: ScalarKind,
        /// The stored string that failed to parse
        raw: String,
    },

    /// The stored payload shape does not match the requested type.
    #[error("stored payload is not a {expected} representation")]
    ReprMismatch {
        /// Representation the requested type expects
        expected: Repr,
    },

    /// A list-valued field could not be JSON-encoded or decoded.
    #[error("JSON conversion failed: {0}")]
    Json(#[from] serde_json::Error),
}

// == Cache Error Enum ==
/// Unified error type for store-facing operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The store connection reported itself down at call time
    #[error("store connection is down")]
    StoreUnavailable,

    /// The cache key is empty
    #[error("cache key must not be empty")]
    InvalidKey,

    /// A cached payload could not be decoded into the expected type
    #[error("cached payload for '{key}' could not be decoded: {reason}")]
    DecodeFailure {
        /// Key whose payload failed to decode
        key: String,
        /// Human-readable decode failure description
        reason: String,
    },

    /// Any other failure during a store call (e.g. a mid-operation drop)
    #[error("store operation failed: {0}")]
    TransientStore(String),

    /// Marshaling failure while encoding or decoding a record payload
    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
