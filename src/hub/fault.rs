//! Owner-facing fault channel payloads.
//!
//! Subscribers have no error channel by design: transport transience is
//! absorbed by the reconnect loop and malformed payloads are dropped.
//! What remains observable goes to the hub owner as a [`HubFault`].

/// Diagnostic delivered to the hub owner on its fault channel.
#[derive(Debug, thiserror::Error)]
pub enum HubFault {
    /// A single event's payload failed to parse. The event was dropped;
    /// the stream and all subscriptions continue.
    #[error("malformed payload dropped: {error}")]
    MalformedPayload {
        /// The parse failure.
        error: serde_json::Error,
        /// The offending payload text, for diagnostics.
        payload: String,
    },

    /// The connection's reconnect budget ran out. Terminal: the
    /// underlying connection is `Closed` and will not recover.
    #[error("connection exhausted after {attempts} reconnect attempts")]
    ConnectionExhausted {
        /// Number of reconnect attempts that were made.
        attempts: u32,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn malformed_fault_keeps_offending_text() {
        let Some(error) = serde_json::from_str::<serde_json::Value>("{bad").err() else {
            panic!("expected parse failure");
        };
        let fault = HubFault::MalformedPayload {
            error,
            payload: "{bad".to_string(),
        };
        let HubFault::MalformedPayload { payload, .. } = &fault else {
            panic!("wrong variant");
        };
        assert_eq!(payload, "{bad");
    }
}
