//! Subscription handles and the subscriber arena.
//!
//! [`SubscriberSet`] maps opaque [`SubscriptionId`] handles to callbacks.
//! Membership is the only invariant that matters: dispatch snapshots the
//! set at event start and rechecks membership immediately before each
//! callback, so registration and removal take effect atomically with
//! respect to in-flight dispatch.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::notification::Notification;

/// Callback invoked once per delivered notification.
pub type NotificationCallback = Arc<dyn Fn(&Notification) + Send + Sync + 'static>;

/// Opaque token identifying one subscription.
///
/// Wraps a UUID v4. Returned by subscribe, consumed by unsubscribe;
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubscriptionId(uuid::Uuid);

impl SubscriptionId {
    /// Creates a new random handle.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle → callback arena for one hub.
///
/// Insertion order is irrelevant; a handle is invoked at most once per
/// event while it is a member.
#[derive(Default)]
pub struct SubscriberSet {
    entries: HashMap<SubscriptionId, NotificationCallback>,
}

impl SubscriberSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback, returning its handle.
    pub fn insert(&mut self, callback: NotificationCallback) -> SubscriptionId {
        let id = SubscriptionId::new();
        let _ = self.entries.insert(id, callback);
        id
    }

    /// Removes a subscription. Returns `true` if the handle was a member.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Returns `true` if the handle is currently a member.
    #[must_use]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every subscription.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshots the current membership for one dispatch pass.
    ///
    /// Cloning the `Arc`s means no lock needs to be held while the
    /// callbacks run.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(SubscriptionId, NotificationCallback)> {
        self.entries
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect()
    }
}

impl fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberSet")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn noop() -> NotificationCallback {
        Arc::new(|_| {})
    }

    #[test]
    fn insert_returns_unique_handles() {
        let mut set = SubscriberSet::new();
        let a = set.insert(noop());
        let b = set.insert(noop());
        assert_ne!(a, b);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_is_membership_based() {
        let mut set = SubscriberSet::new();
        let id = set.insert(noop());
        assert!(set.remove(id));
        assert!(!set.remove(id));
        assert!(set.is_empty());
    }

    #[test]
    fn snapshot_is_immune_to_later_inserts() {
        let mut set = SubscriberSet::new();
        let _first = set.insert(noop());
        let snapshot = set.snapshot();
        let _late = set.insert(noop());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn clear_empties_the_set() {
        let mut set = SubscriberSet::new();
        let _ = set.insert(noop());
        let _ = set.insert(noop());
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn contains_tracks_membership() {
        let mut set = SubscriberSet::new();
        let id = set.insert(noop());
        assert!(set.contains(id));
        let _ = set.remove(id);
        assert!(!set.contains(id));
    }

    #[test]
    fn display_is_uuid_format() {
        let id = SubscriptionId::new();
        let s = format!("{id}");
        assert_eq!(s.len(), 36);
    }
}
