//! # sse-ingest
//!
//! Resilient Server-Sent-Events ingestion client with reconnection,
//! backpressure-safe delivery, and exactly-once-per-event fan-out to
//! local subscribers.
//!
//! ## Architecture
//!
//! ```text
//! Embedding application
//!     │
//!     ├── NotificationHub (hub/)
//!     │       parse payloads, fan out to SubscriberSet,
//!     │       fault channel for the owner
//!     │
//!     ├── EventStreamConnection (stream/)
//!     │       SSE decode, reconnect with BackoffPolicy,
//!     │       ConnectionState observation
//!     │
//!     └── HTTP transport (reqwest + eventsource-stream)
//! ```
//!
//! A caller constructs a [`hub::NotificationHub`], starts it against an
//! [`endpoint::Endpoint`], and registers callbacks. Transient transport
//! failures are absorbed by the reconnect loop; subscribers only ever
//! see a steady stream of notifications. Terminal retry exhaustion and
//! per-event parse failures reach the hub owner on a fault channel.

pub mod backoff;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod hub;
pub mod profile;
pub mod stream;
