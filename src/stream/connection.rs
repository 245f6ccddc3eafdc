//! Single logical SSE subscription with reconnection.
//!
//! [`EventStreamConnection::open`] validates its input synchronously,
//! then spawns a task that connects, decodes frames, and reconnects on
//! transport failure according to the configured [`BackoffPolicy`].
//! Decoded [`RawEvent`]s reach the owner through a bounded channel in
//! receipt order; there is no replay across a reconnect boundary (the
//! protocol has no resume cursor).
//!
//! Both suspension points — waiting for the next frame and waiting out
//! the backoff delay — are cancellable: [`EventStreamConnection::close`]
//! aborts either wait and transitions directly to `Closed`.

use std::time::Duration;

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use super::event::{EventKind, RawEvent};
use super::state::ConnectionState;
use crate::backoff::BackoffPolicy;
use crate::endpoint::Endpoint;
use crate::error::IngestError;

/// Capacity of the event channel between the connection task and its
/// owner. When full, the task stops reading frames until the owner
/// drains, pushing backpressure onto the transport.
const EVENT_BUFFER: usize = 256;

/// TCP keep-alive probe interval used when `keep_alive` is enabled.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Per-connection configuration, supplied by the embedding application.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Enable TCP keep-alive probes on the underlying connection.
    pub keep_alive: bool,
    /// Delay policy applied between reconnect attempts.
    pub backoff: BackoffPolicy,
    /// Reconnect budget. `None` retries forever.
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            backoff: BackoffPolicy::default(),
            max_reconnect_attempts: None,
        }
    }
}

impl StreamConfig {
    /// Config with a fixed reconnect delay, the simplest tuning knob.
    #[must_use]
    pub fn with_reconnect_delay(delay: Duration) -> Self {
        Self {
            backoff: BackoffPolicy::fixed(delay),
            ..Self::default()
        }
    }
}

/// Owner-side handle to a single logical SSE subscription.
///
/// At most one underlying transport connection is open per instance at
/// any time. The connection task tears the transport down on every exit
/// path: explicit [`close`](Self::close), exhausted retries, or owner
/// disposal (the handle cancels on drop).
#[derive(Debug)]
pub struct EventStreamConnection {
    cancel: CancellationToken,
    state_rx: watch::Receiver<ConnectionState>,
    events: Option<mpsc::Receiver<RawEvent>>,
    terminal: Option<oneshot::Receiver<IngestError>>,
}

impl EventStreamConnection {
    /// Begins connecting to `endpoint` and spawns the connection task.
    ///
    /// Network failures are never reported here: they are handled
    /// internally by the reconnect loop. Only construction-time failures
    /// surface synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Transport`] if the HTTP client cannot be
    /// constructed. Malformed endpoints are rejected earlier, by
    /// [`Endpoint::parse`].
    pub fn open(endpoint: Endpoint, config: StreamConfig) -> Result<Self, IngestError> {
        let mut builder = reqwest::Client::builder();
        if config.keep_alive {
            builder = builder.tcp_keepalive(Some(KEEP_ALIVE_INTERVAL));
        }
        let client = builder.build()?;

        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (terminal_tx, terminal_rx) = oneshot::channel();

        let task = ConnectionTask {
            client,
            endpoint,
            config,
            state: state_tx,
            events: event_tx,
            cancel: cancel.clone(),
        };
        tokio::spawn(task.run(terminal_tx));

        Ok(Self {
            cancel,
            state_rx,
            events: Some(event_rx),
            terminal: Some(terminal_rx),
        })
    }

    /// Takes the event receiver. Yields `Some` exactly once.
    ///
    /// Events arrive in receipt order until the connection closes.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<RawEvent>> {
        self.events.take()
    }

    /// Takes the terminal-failure receiver. Yields `Some` exactly once.
    ///
    /// The receiver resolves with [`IngestError::ConnectionExhausted`]
    /// if the retry budget runs out, and is dropped unresolved when the
    /// connection closes for any other reason.
    pub fn take_terminal(&mut self) -> Option<oneshot::Receiver<IngestError>> {
        self.terminal.take()
    }

    /// Returns a watch receiver observing [`ConnectionState`] transitions.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Tears the connection down. Idempotent.
    ///
    /// Aborts an in-flight frame wait or backoff wait; the connection
    /// transitions directly to `Closed` without completing a pending
    /// retry. This is not a graceful handshake with the remote endpoint.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventStreamConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Everything the spawned connection task owns.
struct ConnectionTask {
    client: reqwest::Client,
    endpoint: Endpoint,
    config: StreamConfig,
    state: watch::Sender<ConnectionState>,
    events: mpsc::Sender<RawEvent>,
    cancel: CancellationToken,
}

/// Why the streaming phase of one connection attempt ended.
enum StreamEnd {
    /// Transport error or server-side end of stream; retry.
    Lost,
    /// Cancelled or the owner went away; stop.
    Stop,
}

impl ConnectionTask {
    /// Connect/stream/reconnect loop. Runs until cancellation or retry
    /// exhaustion; publishes `Closed` on every exit path.
    async fn run(self, terminal: oneshot::Sender<IngestError>) {
        // Completed reconnect attempts since the last Connected frame.
        let mut attempts: u32 = 0;
        // Advisory delay from an SSE `retry:` field, if one was seen.
        let mut server_hint: Option<Duration> = None;

        loop {
            self.transition(ConnectionState::Connecting);

            let connected = tokio::select! {
                result = self.connect() => result,
                () = self.cancel.cancelled() => {
                    self.transition(ConnectionState::Closed);
                    return;
                }
            };

            match connected {
                Ok(response) => {
                    self.transition(ConnectionState::Open);
                    match self.stream_frames(response, &mut attempts, &mut server_hint).await {
                        StreamEnd::Lost => {}
                        StreamEnd::Stop => {
                            self.transition(ConnectionState::Closed);
                            return;
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(endpoint = %self.endpoint, error = %err, "connect failed");
                }
            }

            if let Some(max) = self.config.max_reconnect_attempts
                && attempts >= max
            {
                tracing::error!(endpoint = %self.endpoint, attempts, "reconnect budget exhausted");
                self.transition(ConnectionState::Closed);
                let _ = terminal.send(IngestError::ConnectionExhausted { attempts });
                return;
            }

            self.transition(ConnectionState::Reconnecting);
            let delay = self.config.backoff.delay_for(attempts, server_hint);
            attempts = attempts.saturating_add(1);
            tracing::info!(
                endpoint = %self.endpoint,
                attempt = attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "reconnecting"
            );

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.cancel.cancelled() => {
                    self.transition(ConnectionState::Closed);
                    return;
                }
            }
        }
    }

    /// One connection attempt: issue the streaming GET and check status.
    async fn connect(&self) -> Result<reqwest::Response, IngestError> {
        let response = self
            .client
            .get(self.endpoint.url().clone())
            .headers(self.endpoint.headers().clone())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;
        Ok(response)
    }

    /// Decodes frames from an established response body and forwards
    /// them to the owner until the transport is lost or we are stopped.
    async fn stream_frames(
        &self,
        response: reqwest::Response,
        attempts: &mut u32,
        server_hint: &mut Option<Duration>,
    ) -> StreamEnd {
        let mut frames = Box::pin(response.bytes_stream().eventsource());

        loop {
            let next = tokio::select! {
                frame = frames.next() => frame,
                () = self.cancel.cancelled() => return StreamEnd::Stop,
            };

            match next {
                Some(Ok(frame)) => {
                    if let Some(retry) = frame.retry {
                        *server_hint = Some(retry);
                    }
                    let raw = RawEvent::from_frame(&frame.event, frame.data);
                    if raw.kind == EventKind::Connected {
                        *attempts = 0;
                    }
                    tracing::trace!(kind = raw.kind.as_str(), "frame received");

                    tokio::select! {
                        sent = self.events.send(raw) => {
                            if sent.is_err() {
                                // Owner dropped the receiver; nothing left to serve.
                                return StreamEnd::Stop;
                            }
                        }
                        () = self.cancel.cancelled() => return StreamEnd::Stop,
                    }
                }
                Some(Err(err)) => {
                    tracing::warn!(endpoint = %self.endpoint, error = %err, "stream error");
                    return StreamEnd::Lost;
                }
                None => {
                    tracing::debug!(endpoint = %self.endpoint, "stream ended by server");
                    return StreamEnd::Lost;
                }
            }
        }
    }

    /// Publishes a state change if it is legal from the current state.
    /// `Closed` is terminal, so repeated teardown paths are no-ops.
    fn transition(&self, next: ConnectionState) {
        let current = *self.state.borrow();
        if current.can_transition_to(next) {
            tracing::debug!(from = current.as_str(), to = next.as_str(), "connection state");
            let _ = self.state.send(next);
        }
    }
}
