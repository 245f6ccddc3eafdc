//! Connection lifecycle states.
//!
//! [`ConnectionState`] is owned exclusively by the connection task and
//! published through a [`tokio::sync::watch`] channel for observation.
//! `Closed` is terminal; no transition leaves it.

use serde::Serialize;

/// Lifecycle state of one [`crate::stream::EventStreamConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Constructed, not yet opened.
    Idle,
    /// Attempting to establish the transport.
    Connecting,
    /// Transport established; frames are flowing.
    Open,
    /// Transport lost; waiting out the backoff delay.
    Reconnecting,
    /// Terminal. Reached via `close()` or retry exhaustion.
    Closed,
}

impl ConnectionState {
    /// Returns `true` if this is the terminal state.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns the state name as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
        }
    }

    /// Returns `true` if `next` is a legal transition from this state.
    ///
    /// Legal transitions: `Idle → Connecting`, `Connecting → Open`,
    /// `Connecting → Reconnecting` (connect attempt failed),
    /// `Open → Reconnecting` (transport lost), `Reconnecting →
    /// Connecting`, and any non-terminal state `→ Closed`.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Connecting)
                | (Self::Connecting, Self::Open | Self::Reconnecting)
                | (Self::Open, Self::Reconnecting)
                | (Self::Reconnecting, Self::Connecting)
                | (Self::Idle | Self::Connecting | Self::Open | Self::Reconnecting, Self::Closed)
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        assert!(ConnectionState::Idle.can_transition_to(ConnectionState::Connecting));
        assert!(ConnectionState::Connecting.can_transition_to(ConnectionState::Open));
        assert!(ConnectionState::Open.can_transition_to(ConnectionState::Reconnecting));
        assert!(ConnectionState::Reconnecting.can_transition_to(ConnectionState::Connecting));
    }

    #[test]
    fn failed_connect_attempt_can_reenter_reconnecting() {
        // A connect attempt that errors before the stream opens goes
        // back to waiting out the backoff delay.
        assert!(ConnectionState::Connecting.can_transition_to(ConnectionState::Reconnecting));
    }

    #[test]
    fn every_live_state_can_close() {
        for state in [
            ConnectionState::Idle,
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Reconnecting,
        ] {
            assert!(state.can_transition_to(ConnectionState::Closed), "{state:?}");
        }
    }

    #[test]
    fn closed_is_terminal() {
        for next in [
            ConnectionState::Idle,
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Reconnecting,
            ConnectionState::Closed,
        ] {
            assert!(!ConnectionState::Closed.can_transition_to(next), "{next:?}");
        }
    }

    #[test]
    fn no_skip_from_idle_to_open() {
        assert!(!ConnectionState::Idle.can_transition_to(ConnectionState::Open));
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ConnectionState::Reconnecting).unwrap_or_default();
        assert_eq!(json, "\"reconnecting\"");
    }
}
