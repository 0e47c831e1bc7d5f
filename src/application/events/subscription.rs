use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::mpsc;

use super::topic_registry::TopicRegistry;
use crate::events::Event;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Open,
    Closed,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TryRecvError {
    #[error("mailbox is empty")]
    Empty,
    #[error("subscription is closed")]
    Closed,
}

/// State shared between a subscription and its registry entry.
#[derive(Debug)]
pub(crate) struct SubscriptionShared {
    pub(crate) id: SubscriptionId,
    pub(crate) topic: String,
    closed: AtomicBool,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl SubscriptionShared {
    pub(crate) fn new(topic: &str) -> Self {
        Self {
            id: SubscriptionId::next(),
            topic: topic.to_string(),
            closed: AtomicBool::new(false),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Flip to closed. Returns true only for the call that performed the transition.
    pub(crate) fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Registry-side half of a subscription: the producer end of its mailbox.
pub(crate) struct Mailbox {
    pub(crate) shared: Arc<SubscriptionShared>,
    pub(crate) tx: mpsc::Sender<Arc<Event>>,
}

/// Subscription - one live observer of one board topic
///
/// Owns the consumer end of a bounded mailbox. Exactly one reader drains it.
/// Dropping the subscription unsubscribes it, so a cancelled reader task
/// never leaves a stale registry entry behind.
pub struct Subscription {
    shared: Arc<SubscriptionShared>,
    rx: mpsc::Receiver<Arc<Event>>,
    registry: Weak<TopicRegistry>,
}

impl Subscription {
    pub(crate) fn new(
        shared: Arc<SubscriptionShared>,
        rx: mpsc::Receiver<Arc<Event>>,
        registry: Weak<TopicRegistry>,
    ) -> Self {
        Self { shared, rx, registry }
    }

    pub fn id(&self) -> SubscriptionId {
        self.shared.id
    }

    pub fn topic(&self) -> &str {
        &self.shared.topic
    }

    pub fn state(&self) -> SubscriptionState {
        if self.shared.is_closed() {
            SubscriptionState::Closed
        } else {
            SubscriptionState::Open
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == SubscriptionState::Open
    }

    /// Events accepted into this mailbox so far
    pub fn delivered_count(&self) -> u64 {
        self.shared.delivered.load(Ordering::Relaxed)
    }

    /// Events discarded because the mailbox was full
    pub fn dropped_count(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the subscription is closed, including when it is
    /// closed while this call is waiting. Cancel safe.
    pub async fn recv(&mut self) -> Option<Arc<Event>> {
        if self.shared.is_closed() {
            return None;
        }
        match self.rx.recv().await {
            Some(event) if !self.shared.is_closed() => Some(event),
            _ => None,
        }
    }

    /// Take the next event without waiting.
    pub fn try_recv(&mut self) -> Result<Arc<Event>, TryRecvError> {
        if self.shared.is_closed() {
            return Err(TryRecvError::Closed);
        }
        match self.rx.try_recv() {
            Ok(event) => Ok(event),
            Err(mpsc::error::TryRecvError::Empty) => Err(TryRecvError::Empty),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TryRecvError::Closed),
        }
    }

    pub(crate) fn shared(&self) -> &Arc<SubscriptionShared> {
        &self.shared
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.shared.id)
            .field("topic", &self.shared.topic)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.shared.is_closed() {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.shared);
        } else {
            self.shared.close();
        }
    }
}
