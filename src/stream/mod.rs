//! Streaming layer: SSE transport, wire decode, and reconnection.
//!
//! [`EventStreamConnection`] owns a single long-lived streaming HTTP
//! connection, decodes SSE framing into [`RawEvent`]s, and applies the
//! reconnect policy on transport failure. It is the leaf of the crate:
//! the [`crate::hub`] layer builds on it.

pub mod connection;
pub mod event;
pub mod state;

pub use connection::{EventStreamConnection, StreamConfig};
pub use event::{EventKind, RawEvent};
pub use state::ConnectionState;
