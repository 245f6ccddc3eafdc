//! Binary configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The library itself never reads
//! configuration; this module serves the demo binary only.

use std::time::Duration;

use crate::backoff::BackoffPolicy;
use crate::stream::StreamConfig;

/// Top-level configuration for the dashboard demo binary.
///
/// Loaded once at startup via [`IngestConfig::from_env`].
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// SSE stream URL to subscribe to.
    pub stream_url: String,

    /// User-profile endpoint fetched once at startup.
    pub profile_url: String,

    /// Enable TCP keep-alive on the streaming connection.
    pub keep_alive: bool,

    /// Fixed delay between reconnect attempts, in milliseconds.
    pub reconnect_delay_ms: u64,

    /// Reconnect budget. `0` means unbounded.
    pub max_reconnect_attempts: u32,
}

impl IngestConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let stream_url = std::env::var("SSE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/dashboard/stream".to_string());
        let profile_url = std::env::var("PROFILE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/dashboard".to_string());

        let keep_alive = parse_env_bool("KEEP_ALIVE", true);
        let reconnect_delay_ms = parse_env("RECONNECT_DELAY_MS", 15_000);
        let max_reconnect_attempts = parse_env("MAX_RECONNECT_ATTEMPTS", 0);

        Self {
            stream_url,
            profile_url,
            keep_alive,
            reconnect_delay_ms,
            max_reconnect_attempts,
        }
    }

    /// Converts the env-level settings into a per-connection config.
    #[must_use]
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            keep_alive: self.keep_alive,
            backoff: BackoffPolicy::fixed(Duration::from_millis(self.reconnect_delay_ms)),
            max_reconnect_attempts: match self.max_reconnect_attempts {
                0 => None,
                n => Some(n),
            },
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("TRUE") | Some("1") => true,
        Some("false") | Some("FALSE") | Some("0") => false,
        _ => default,
    }
}
