//! Ingestion error taxonomy.
//!
//! [`IngestError`] is the central error type for the crate. Transient
//! transport failures are absorbed by the reconnect loop and never reach
//! callers per-event; only construction-time validation and terminal
//! retry exhaustion are surfaced outward.

/// Error enum covering every failure class of the ingestion client.
///
/// # Propagation policy
///
/// | Variant               | Surfaced to                                |
/// |-----------------------|--------------------------------------------|
/// | `InvalidEndpoint`     | caller of `open`/`start`, synchronously    |
/// | `Transport`           | absorbed internally by the retry loop      |
/// | `ConnectionExhausted` | hub owner, exactly once, via fault channel |
/// | `MalformedPayload`    | hub owner as a diagnostic; event dropped   |
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The endpoint URL failed construction-time validation.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Network or decode failure while streaming. Recovered locally via
    /// reconnection; never propagated per-event.
    #[error("transport error: {0}")]
    Transport(String),

    /// The reconnect budget was exhausted without re-establishing the
    /// stream. Terminal: the connection is `Closed` after this.
    #[error("connection exhausted after {attempts} reconnect attempts")]
    ConnectionExhausted {
        /// Number of reconnect attempts that were made.
        attempts: u32,
    },

    /// A single event's payload failed to parse as JSON. The event is
    /// dropped; the stream and all subscriptions continue.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
