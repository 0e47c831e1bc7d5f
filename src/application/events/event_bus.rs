use serde_json::Value;

use super::subscription::Subscription;
use crate::events::EventType;

/// Trait for board event bus operations
///
/// Best-effort, at-most-once live tail. None of these calls can fail:
/// publishing to a topic nobody watches is a no-op and a full mailbox
/// silently loses the event for that one subscriber.
pub trait EventBus: Send + Sync + Clone + 'static {
    /// Stamp and fan out an event. Returns the sequence number it received.
    fn publish(&self, topic: &str, event_type: EventType, payload: Value) -> u64;

    /// Open a subscription on a board topic
    fn subscribe(&self, topic: &str) -> Subscription;

    /// Close a subscription. Safe to repeat and to race with `publish`.
    fn unsubscribe(&self, subscription: &Subscription) -> bool;

    /// Number of open subscriptions on `topic`
    fn subscriber_count(&self, topic: &str) -> usize;
}
