//! Store Entry Module
//!
//! Defines the structure of a single stored entry with expiry support.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Stored Value ==
/// The payload of a store entry: a flat string or a field map.
///
/// An entry never holds both representations; which one a key carries
/// is decided entirely by the type used at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    /// Single string payload
    Scalar(String),
    /// Field-name -> value map
    Fields(HashMap<String, String>),
}

// == Store Entry ==
/// A stored value plus its expiry metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored payload
    pub value: StoredValue,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry with optional TTL.
    pub fn new(value: StoredValue, ttl: Option<Duration>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = ttl.map(|ttl| now + ttl.as_millis() as u64);

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or
    /// equal to the expiration time; entries without a TTL never
    /// expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Expire At ==
    /// Re-arms the entry's expiry `ttl` from now.
    pub fn expire_in(&mut self, ttl: Duration) {
        self.expires_at = Some(current_timestamp_ms() + ttl.as_millis() as u64);
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
