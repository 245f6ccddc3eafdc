//! Hub lifecycle and fan-out dispatch.
//!
//! [`NotificationHub`] owns one [`EventStreamConnection`] and a
//! [`SubscriberSet`]. A dispatch task consumes raw events one at a time:
//! `connected` frames are informational, `error` frames are observed and
//! swallowed (fidelity to the original client; see DESIGN.md), and
//! `message` frames are parsed and fanned out sequentially to every
//! subscriber active at dispatch start.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};

use super::fault::HubFault;
use super::notification::Notification;
use super::subscribers::{SubscriberSet, SubscriptionId};
use crate::endpoint::Endpoint;
use crate::error::IngestError;
use crate::stream::{ConnectionState, EventKind, EventStreamConnection, RawEvent, StreamConfig};

/// Fan-out hub over one streaming connection.
///
/// Cheaply cloneable (all clones share state), so a handle can be moved
/// into subscriber callbacks — a callback may call
/// [`subscribe`](Self::subscribe), [`unsubscribe`](Self::unsubscribe),
/// or [`stop`](Self::stop) on its own hub without deadlocking; no lock
/// is held while callbacks run.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    shared: Arc<HubShared>,
}

#[derive(Debug)]
struct HubShared {
    subscribers: Arc<Mutex<SubscriberSet>>,
    connection: Mutex<Option<EventStreamConnection>>,
    faults_tx: mpsc::UnboundedSender<HubFault>,
    faults_rx: Mutex<Option<mpsc::UnboundedReceiver<HubFault>>>,
}

impl NotificationHub {
    /// Creates a hub with no connection and no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (faults_tx, faults_rx) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(HubShared {
                subscribers: Arc::new(Mutex::new(SubscriberSet::new())),
                connection: Mutex::new(None),
                faults_tx,
                faults_rx: Mutex::new(Some(faults_rx)),
            }),
        }
    }

    /// Opens the underlying connection and starts dispatching.
    ///
    /// Idempotent: a hub whose connection is still live treats this as a
    /// no-op. After [`stop`](Self::stop) (or exhaustion) a new
    /// connection may be opened by calling `start` again.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Transport`] if the HTTP client cannot be
    /// constructed. Endpoint validation errors surface earlier, from
    /// [`Endpoint::parse`].
    pub fn start(&self, endpoint: Endpoint, config: StreamConfig) -> Result<(), IngestError> {
        let mut slot = self.shared.connection.lock();
        if let Some(existing) = slot.as_ref()
            && !existing.state().is_closed()
        {
            tracing::debug!("hub already started");
            return Ok(());
        }

        let mut connection = EventStreamConnection::open(endpoint, config)?;
        let events = connection.take_events();
        let terminal = connection.take_terminal();
        *slot = Some(connection);
        drop(slot);

        if let (Some(events), Some(terminal)) = (events, terminal) {
            let subscribers = Arc::clone(&self.shared.subscribers);
            let faults = self.shared.faults_tx.clone();
            tokio::spawn(run_dispatch(events, terminal, subscribers, faults));
        }
        Ok(())
    }

    /// Registers a callback, returning its handle.
    ///
    /// The callback is invoked once per notification, in delivery order,
    /// for every notification whose dispatch starts after this call and
    /// before the handle is unregistered.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let id = self.shared.subscribers.lock().insert(Arc::new(callback));
        tracing::debug!(subscription = %id, "subscriber added");
        id
    }

    /// Removes a subscriber. Returns `true` if the handle was registered.
    ///
    /// After this returns, the handle receives no further invocations —
    /// even if dispatch of an earlier event is still draining to other
    /// subscribers.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.shared.subscribers.lock().remove(id);
        if removed {
            tracing::debug!(subscription = %id, "subscriber removed");
        }
        removed
    }

    /// Closes the underlying connection and clears all subscribers.
    ///
    /// Safe to call multiple times; later calls are no-ops.
    pub fn stop(&self) {
        if let Some(connection) = self.shared.connection.lock().take() {
            connection.close();
            tracing::info!("hub stopped");
        }
        self.shared.subscribers.lock().clear();
    }

    /// Returns the current connection state (`Idle` before `start`).
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared
            .connection
            .lock()
            .as_ref()
            .map_or(ConnectionState::Idle, EventStreamConnection::state)
    }

    /// Returns a watch receiver observing connection-state transitions,
    /// or `None` before the first `start`.
    #[must_use]
    pub fn state_receiver(&self) -> Option<watch::Receiver<ConnectionState>> {
        self.shared
            .connection
            .lock()
            .as_ref()
            .map(EventStreamConnection::state_receiver)
    }

    /// Takes the fault receiver. Yields `Some` exactly once.
    ///
    /// Carries [`HubFault::MalformedPayload`] diagnostics and the single
    /// terminal [`HubFault::ConnectionExhausted`], none of which reach
    /// subscribers.
    pub fn take_faults(&self) -> Option<mpsc::UnboundedReceiver<HubFault>> {
        self.shared.faults_rx.lock().take()
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.lock().len()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumes raw events one at a time and fans parsed notifications out.
/// When the event channel closes, forwards the terminal failure if the
/// connection reported one.
async fn run_dispatch(
    mut events: mpsc::Receiver<RawEvent>,
    terminal: oneshot::Receiver<IngestError>,
    subscribers: Arc<Mutex<SubscriberSet>>,
    faults: mpsc::UnboundedSender<HubFault>,
) {
    while let Some(raw) = events.recv().await {
        interpret(raw, &subscribers, &faults);
    }

    // Event channel closed: the connection task has exited. Exhaustion
    // is the only exit that resolves the terminal channel.
    if let Ok(IngestError::ConnectionExhausted { attempts }) = terminal.await {
        let _ = faults.send(HubFault::ConnectionExhausted { attempts });
    }
    tracing::debug!("dispatch task finished");
}

/// Interprets one raw event. Only `message` frames dispatch.
fn interpret(
    raw: RawEvent,
    subscribers: &Arc<Mutex<SubscriberSet>>,
    faults: &mpsc::UnboundedSender<HubFault>,
) {
    match raw.kind {
        EventKind::Connected => {
            tracing::debug!("stream connected");
        }
        EventKind::Error => {
            // Observed but neither forwarded nor acted upon, matching
            // the original client's swallow-and-continue branch.
            tracing::warn!("server error frame observed");
        }
        EventKind::Message => {
            let payload = raw.payload.unwrap_or_default();
            match Notification::parse(&payload) {
                Ok(notification) => dispatch(&notification, subscribers),
                Err(error) => {
                    tracing::warn!(error = %error, "dropping malformed payload");
                    let _ = faults.send(HubFault::MalformedPayload { error, payload });
                }
            }
        }
    }
}

/// Sequential fan-out of one notification.
///
/// The subscriber set is snapshotted at dispatch start, so a subscriber
/// registered during this pass first sees the next event. Membership is
/// rechecked before each callback so an unsubscribe that has returned
/// suppresses the remaining invocation for that handle. No lock is held
/// while a callback runs.
fn dispatch(notification: &Notification, subscribers: &Arc<Mutex<SubscriberSet>>) {
    let snapshot = subscribers.lock().snapshot();
    for (id, callback) in snapshot {
        if !subscribers.lock().contains(id) {
            continue;
        }
        callback(notification);
    }
}
