//! Configuration Module
//!
//! Handles loading and managing the store-connection configuration from
//! environment variables. The cache layer does not implement the store
//! transport; this surface is accepted and forwarded to whichever
//! backend the caller constructs.

use std::env;
use std::time::Duration;

// == Blocked Commands ==
/// Administrative commands withheld from the store connection by default.
pub const DEFAULT_BLOCKED_COMMANDS: [&str; 6] =
    ["INFO", "CONFIG", "CLUSTER", "PING", "ECHO", "CLIENT"];

// == Store Config ==
/// Connection parameters forwarded to the key-value store backend.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store host name or address
    pub host: String,
    /// Store port
    pub port: u16,
    /// Optional connection credential
    pub password: Option<String>,
    /// Keep-alive interval for the connection
    pub keep_alive: Duration,
    /// Timeout applied to synchronous store calls
    pub sync_timeout: Duration,
    /// Number of connection attempts before giving up
    pub connect_retry: u32,
    /// Administrative commands the connection must refuse to issue
    pub blocked_commands: Vec<String>,
}

impl StoreConfig {
    /// Creates a new StoreConfig by loading values from environment variables.
    ///
    /// # Env Variables
    /// - `STORE_HOST` - Store host (default: 127.0.0.1)
    /// - `STORE_PORT` - Store port (default: 6379)
    /// - `STORE_PASSWORD` - Connection credential (default: none)
    /// - `STORE_KEEP_ALIVE` - Keep-alive interval in seconds (default: 180)
    /// - `STORE_SYNC_TIMEOUT` - Synchronous call timeout in milliseconds (default: 600000)
    /// - `STORE_CONNECT_RETRY` - Connection attempts (default: 3)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("STORE_HOST").unwrap_or(defaults.host),
            port: env::var("STORE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            password: env::var("STORE_PASSWORD").ok(),
            keep_alive: env::var("STORE_KEEP_ALIVE")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.keep_alive),
            sync_timeout: env::var("STORE_SYNC_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.sync_timeout),
            connect_retry: env::var("STORE_CONNECT_RETRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.connect_retry),
            blocked_commands: defaults.blocked_commands,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            keep_alive: Duration::from_secs(180),
            sync_timeout: Duration::from_millis(600_000),
            connect_retry: 3,
            blocked_commands: DEFAULT_BLOCKED_COMMANDS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

// == TTL Priority ==
/// Expiration ladder for cached data.
///
/// Data whose freshness matters more sits in the shorter slots; the
/// priority names map to fixed hour counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlPriority {
    /// 12 hours
    VeryLow,
    /// 8 hours
    Low,
    /// 4 hours
    Normal,
    /// 2 hours
    High,
    /// 1 hour
    VeryHigh,
}

impl TtlPriority {
    /// Returns the number of hours this priority keeps an entry alive.
    pub fn hours(self) -> u64 {
        match self {
            TtlPriority::VeryLow => 12,
            TtlPriority::Low => 8,
            TtlPriority::Normal => 4,
            TtlPriority::High => 2,
            TtlPriority::VeryHigh => 1,
        }
    }

    /// Returns the priority as a TTL duration.
    pub fn ttl(self) -> Duration {
        Duration::from_secs(self.hours() * 3600)
    }
}
