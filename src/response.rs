//! Response envelope for fallback computations
//!
//! Every computation handed to the read-through path produces a
//! `Response<T>`: a payload, a human-readable message and a numeric
//! status code. The code space belongs to the computation's own domain;
//! the cache layer reserves only the decode-failure sentinel.

use serde::{Deserialize, Serialize};

// == Status Codes ==
/// Status code of a successful computation. Only envelopes carrying this
/// code are persisted to the cache.
pub const SUCCESS_CODE: i32 = 0;

/// Reserved status code reported when a cached payload could not be
/// decoded into the expected type.
pub const DECODE_FAILURE_CODE: i32 = -3;

// == Response Envelope ==
/// The (payload, message, status code) triple returned by all
/// computations crossing the cache boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response<T> {
    /// The payload value, absent on failure
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Numeric status code; `0` means success
    pub code: i32,
}

impl<T> Response<T> {
    // == Constructors ==
    /// Creates a successful envelope wrapping `data`.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: String::new(),
            code: SUCCESS_CODE,
        }
    }

    /// Creates a failed envelope with a domain-owned status code.
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            code,
        }
    }

    /// Creates the envelope returned when the cached payload under `key`
    /// could not be decoded.
    pub fn decode_failure(key: &str) -> Self {
        Self {
            data: None,
            message: format!("cached payload for '{}' could not be decoded", key),
            code: DECODE_FAILURE_CODE,
        }
    }

    // == Predicates ==
    /// Returns true if the envelope carries the success code.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}
