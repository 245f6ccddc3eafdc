//! Reconnect delay policies.
//!
//! [`BackoffPolicy`] decides how long the connection waits between
//! reconnect attempts. The default is a fixed delay, matching the
//! observed behavior of the original dashboard client; the exponential
//! variant is the hardened alternative for production deployments.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default fixed reconnect delay in milliseconds.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 15_000;
/// Default base delay for exponential backoff in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
/// Default maximum delay between reconnects in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;
/// Default jitter factor (0.0–1.0).
pub const DEFAULT_JITTER_FACTOR: f64 = 0.2;

/// Delay strategy applied between reconnect attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BackoffPolicy {
    /// Wait the same duration before every retry.
    Fixed {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Exponential backoff with symmetric jitter.
    ///
    /// Formula: `min(max, base * 2^attempt)` scaled by a random factor
    /// in `[1 - jitter, 1 + jitter]`.
    Exponential {
        /// Base delay in milliseconds.
        base_ms: u64,
        /// Cap on the computed delay in milliseconds.
        max_ms: u64,
        /// Jitter range (0.0–1.0).
        jitter: f64,
    },
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::Fixed {
            delay_ms: DEFAULT_RECONNECT_DELAY_MS,
        }
    }
}

impl BackoffPolicy {
    /// Fixed policy with the given delay.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn fixed(delay: Duration) -> Self {
        Self::Fixed {
            delay_ms: delay.as_millis() as u64,
        }
    }

    /// Exponential policy with default cap and jitter.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn exponential(base: Duration) -> Self {
        Self::Exponential {
            base_ms: base.as_millis() as u64,
            max_ms: DEFAULT_MAX_DELAY_MS,
            jitter: DEFAULT_JITTER_FACTOR,
        }
    }

    /// Computes the delay before reconnect attempt `attempt` (zero-based).
    ///
    /// `server_hint` is the advisory delay from an SSE `retry:` field, if
    /// one was seen. For the fixed policy it replaces the configured
    /// delay; for the exponential policy it acts as a floor (the larger
    /// value wins).
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn delay_for(&self, attempt: u32, server_hint: Option<Duration>) -> Duration {
        match *self {
            Self::Fixed { delay_ms } => {
                server_hint.unwrap_or(Duration::from_millis(delay_ms))
            }
            Self::Exponential { base_ms, max_ms, jitter } => {
                let exp = base_ms.saturating_mul(2u64.saturating_pow(attempt));
                let capped = exp.min(max_ms);
                let factor = if jitter > 0.0 {
                    rand::rng().random_range(1.0 - jitter..=1.0 + jitter)
                } else {
                    1.0
                };
                let jittered = Duration::from_millis((capped as f64 * factor) as u64);
                server_hint.map_or(jittered, |hint| jittered.max(hint))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fixed_fifteen_seconds() {
        let policy = BackoffPolicy::default();
        assert_eq!(
            policy.delay_for(0, None),
            Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS)
        );
    }

    #[test]
    fn fixed_ignores_attempt_number() {
        let policy = BackoffPolicy::fixed(Duration::from_millis(500));
        assert_eq!(policy.delay_for(0, None), policy.delay_for(10, None));
    }

    #[test]
    fn fixed_server_hint_overrides() {
        let policy = BackoffPolicy::fixed(Duration::from_secs(15));
        let delay = policy.delay_for(2, Some(Duration::from_millis(250)));
        assert_eq!(delay, Duration::from_millis(250));
    }

    #[test]
    fn exponential_doubles_until_cap() {
        let policy = BackoffPolicy::Exponential {
            base_ms: 100,
            max_ms: 1_000,
            jitter: 0.0,
        };
        assert_eq!(policy.delay_for(0, None), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1, None), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2, None), Duration::from_millis(400));
        assert_eq!(policy.delay_for(5, None), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(30, None), Duration::from_millis(1_000));
    }

    #[test]
    fn exponential_jitter_stays_in_band() {
        let policy = BackoffPolicy::Exponential {
            base_ms: 1_000,
            max_ms: 60_000,
            jitter: 0.2,
        };
        for _ in 0..50 {
            let d = policy.delay_for(0, None).as_millis() as u64;
            assert!((800..=1_200).contains(&d), "delay {d} outside jitter band");
        }
    }

    #[test]
    fn exponential_server_hint_is_floor() {
        let policy = BackoffPolicy::Exponential {
            base_ms: 10,
            max_ms: 1_000,
            jitter: 0.0,
        };
        let delay = policy.delay_for(0, Some(Duration::from_millis(500)));
        assert_eq!(delay, Duration::from_millis(500));
    }

    #[test]
    fn serde_round_trip() {
        let policy = BackoffPolicy::exponential(Duration::from_secs(1));
        let json = serde_json::to_string(&policy).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        assert!(json.contains("exponential"));
        let back: Result<BackoffPolicy, _> = serde_json::from_str(&json);
        assert!(back.is_ok());
    }
}
