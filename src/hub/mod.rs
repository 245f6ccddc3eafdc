//! Hub layer: payload parsing and subscriber fan-out.
//!
//! [`NotificationHub`] wraps one [`crate::stream::EventStreamConnection`],
//! interprets its [`crate::stream::RawEvent`]s, and republishes parsed
//! [`Notification`]s to any number of local subscribers with isolation
//! between them.

pub mod fault;
pub mod notification;
pub mod notification_hub;
pub mod subscribers;

pub use fault::HubFault;
pub use notification::Notification;
pub use notification_hub::NotificationHub;
pub use subscribers::{SubscriberSet, SubscriptionId};
