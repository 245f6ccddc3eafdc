//! Parsed application payloads.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One parsed notification, as delivered to subscribers.
///
/// Ephemeral: exists only for the duration of one fan-out dispatch.
/// The payload is arbitrary structured data; shape validation beyond
/// "parseable JSON" is the embedding application's concern.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Parsed payload of the wire frame.
    pub payload: serde_json::Value,
    /// When the frame was interpreted by the hub.
    pub received_at: DateTime<Utc>,
}

impl Notification {
    /// Parses a wire payload's text into a notification.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if the text is not
    /// valid JSON.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let payload = serde_json::from_str(text)?;
        Ok(Self {
            payload,
            received_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_counts() {
        let n = Notification::parse(r#"{"pending":4,"confirmed":12}"#);
        let Ok(n) = n else {
            panic!("expected valid payload");
        };
        assert_eq!(n.payload.get("pending").and_then(serde_json::Value::as_i64), Some(4));
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(Notification::parse("{bad json").is_err());
    }

    #[test]
    fn accepts_any_json_shape() {
        assert!(Notification::parse("[1,2,3]").is_ok());
        assert!(Notification::parse("\"plain string\"").is_ok());
    }
}
