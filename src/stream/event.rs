//! Decoded wire frames.
//!
//! [`RawEvent`] is one decoded SSE frame: a kind plus an opaque text
//! payload. Produced by the connection task, consumed exactly once by
//! the [`crate::hub::NotificationHub`], and not retained.

use serde::Serialize;

/// Frame kind discriminator.
///
/// The SSE `event:` field maps onto this case-insensitively. A bare
/// `data:` line has the protocol-default name `message` and becomes
/// [`EventKind::Message`], as does any unrecognized event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Application payload; the only kind that carries data to parse.
    Message,
    /// Server-reported error frame. Observed, never forwarded.
    Error,
    /// Marks successful (re)entry to the open state. Informational.
    Connected,
}

impl EventKind {
    /// Classifies an SSE event name.
    #[must_use]
    pub fn from_event_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("connected") {
            Self::Connected
        } else if name.eq_ignore_ascii_case("error") {
            Self::Error
        } else {
            Self::Message
        }
    }

    /// Returns the kind as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Error => "error",
            Self::Connected => "connected",
        }
    }
}

/// One decoded frame from the wire.
#[derive(Debug, Clone, Serialize)]
pub struct RawEvent {
    /// Frame kind.
    pub kind: EventKind,
    /// Opaque payload text. Present only for [`EventKind::Message`].
    pub payload: Option<String>,
}

impl RawEvent {
    /// Builds a `RawEvent` from a decoded SSE frame's name and data.
    #[must_use]
    pub fn from_frame(event_name: &str, data: String) -> Self {
        let kind = EventKind::from_event_name(event_name);
        let payload = match kind {
            EventKind::Message => Some(data),
            EventKind::Error | EventKind::Connected => None,
        };
        Self { kind, payload }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_event_name_is_message() {
        assert_eq!(EventKind::from_event_name("message"), EventKind::Message);
    }

    #[test]
    fn connected_is_case_insensitive() {
        assert_eq!(EventKind::from_event_name("CONNECTED"), EventKind::Connected);
        assert_eq!(EventKind::from_event_name("connected"), EventKind::Connected);
    }

    #[test]
    fn unknown_names_fall_back_to_message() {
        assert_eq!(EventKind::from_event_name("status-count"), EventKind::Message);
    }

    #[test]
    fn message_frame_keeps_payload() {
        let ev = RawEvent::from_frame("message", r#"{"pending":4}"#.to_string());
        assert_eq!(ev.kind, EventKind::Message);
        assert_eq!(ev.payload.as_deref(), Some(r#"{"pending":4}"#));
    }

    #[test]
    fn connected_frame_drops_payload() {
        let ev = RawEvent::from_frame("CONNECTED", "ignored".to_string());
        assert_eq!(ev.kind, EventKind::Connected);
        assert!(ev.payload.is_none());
    }

    #[test]
    fn error_frame_drops_payload() {
        let ev = RawEvent::from_frame("error", "boom".to_string());
        assert_eq!(ev.kind, EventKind::Error);
        assert!(ev.payload.is_none());
    }
}
