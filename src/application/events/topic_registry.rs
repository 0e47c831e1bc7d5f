use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{self, error::TrySendError};

use super::subscription::{Mailbox, Subscription, SubscriptionShared};
use crate::events::Event;

/// Default mailbox capacity per subscription
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

/// Outcome of delivering one event to a topic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub dropped: usize,
}

#[derive(Default)]
struct TopicSubscribers {
    mailboxes: RwLock<Vec<Mailbox>>,
    // Serializes stamp+deliver per topic so every mailbox sees sequences in order
    order: Mutex<()>,
}

/// TopicRegistry - board topic -> live subscriptions
///
/// Locking:
/// - the outer map lock only guards topic creation and pruning
/// - each topic has its own lock, so busy boards do not contend with each other
/// - fan-out holds a topic read lock but only ever `try_send`s, so a full
///   mailbox can never stall the publisher or the other subscribers
/// - `publish_with` stamps the event under the topic's order lock; the
///   critical section is a loop of `try_send`s and never waits on a reader
///
/// A subscription is present in the map exactly while it is open.
pub struct TopicRegistry {
    topics: RwLock<HashMap<String, Arc<TopicSubscribers>>>,
    capacity: usize,
    shut_down: AtomicBool,
}

impl TopicRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Register a new open subscription on `topic`.
    ///
    /// After `shutdown` the returned subscription is already closed.
    pub fn subscribe(self: &Arc<Self>, topic: &str) -> Subscription {
        let shared = Arc::new(SubscriptionShared::new(topic));
        let (tx, rx) = mpsc::channel(self.capacity);
        let subscription = Subscription::new(shared.clone(), rx, Arc::downgrade(self));
        let mailbox = Mailbox { shared, tx };

        // Insertion happens under (at least) the outer read lock so pruning,
        // which needs the outer write lock, cannot orphan a fresh topic entry.
        {
            let topics = self.topics.read();
            if self.shut_down.load(Ordering::Acquire) {
                mailbox.shared.close();
                return subscription;
            }
            if let Some(subscribers) = topics.get(topic) {
                subscribers.mailboxes.write().push(mailbox);
                return subscription;
            }
        }

        let mut topics = self.topics.write();
        if self.shut_down.load(Ordering::Acquire) {
            mailbox.shared.close();
            return subscription;
        }
        topics
            .entry(topic.to_string())
            .or_default()
            .mailboxes
            .write()
            .push(mailbox);
        subscription
    }

    /// Close `subscription` and drop it from its topic.
    ///
    /// Returns true for the call that actually closed it; repeats are no-ops.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.remove(subscription.shared())
    }

    pub(crate) fn remove(&self, shared: &Arc<SubscriptionShared>) -> bool {
        let (closed, now_empty) = {
            let topics = self.topics.read();
            match topics.get(&shared.topic) {
                Some(subscribers) => {
                    let mut mailboxes = subscribers.mailboxes.write();
                    if !shared.close() {
                        return false;
                    }
                    // Dropping the mailbox drops the sender, which wakes a waiting reader.
                    mailboxes.retain(|m| m.shared.id != shared.id);
                    (true, mailboxes.is_empty())
                }
                None => (shared.close(), false),
            }
        };

        if now_empty {
            self.prune(&shared.topic);
        }
        closed
    }

    fn prune(&self, topic: &str) {
        let mut topics = self.topics.write();
        let empty = topics
            .get(topic)
            .map(|s| s.mailboxes.read().is_empty())
            .unwrap_or(false);
        if empty {
            topics.remove(topic);
        }
    }

    /// Build the event for `topic` via `stamp` and deliver it.
    ///
    /// `stamp` runs under the topic's order lock, so numbers it draws from a
    /// shared sequencer reach each mailbox in increasing order.
    pub fn publish_with<F>(&self, topic: &str, stamp: F) -> (Arc<Event>, FanoutReport)
    where
        F: FnOnce() -> Event,
    {
        let subscribers = self.topics.read().get(topic).cloned();
        let Some(subscribers) = subscribers else {
            return (Arc::new(stamp()), FanoutReport::default());
        };

        let _order = subscribers.order.lock();
        let event = Arc::new(stamp());
        let report = Self::deliver(&subscribers, &event);
        (event, report)
    }

    /// Offer `event` to every subscription currently registered on its topic.
    ///
    /// Full mailboxes lose this event (drop-new); earlier queued events stay.
    pub fn fanout(&self, event: Arc<Event>) -> FanoutReport {
        let subscribers = self.topics.read().get(&event.topic).cloned();
        match subscribers {
            Some(subscribers) => Self::deliver(&subscribers, &event),
            None => FanoutReport::default(),
        }
    }

    fn deliver(subscribers: &TopicSubscribers, event: &Arc<Event>) -> FanoutReport {
        let mut report = FanoutReport::default();
        let mailboxes = subscribers.mailboxes.read();
        for mailbox in mailboxes.iter() {
            match mailbox.tx.try_send(Arc::clone(event)) {
                Ok(()) => {
                    mailbox.shared.record_delivered();
                    report.delivered += 1;
                }
                Err(TrySendError::Full(_)) => {
                    mailbox.shared.record_dropped();
                    report.dropped += 1;
                }
                // Reader already gone; its Drop is about to remove the entry.
                Err(TrySendError::Closed(_)) => {}
            }
        }
        report
    }

    /// Close every subscription and refuse new ones. Returns how many were closed.
    pub fn shutdown(&self) -> usize {
        let mut topics = self.topics.write();
        self.shut_down.store(true, Ordering::Release);

        let mut closed = 0;
        for (_, subscribers) in topics.drain() {
            for mailbox in subscribers.mailboxes.write().drain(..) {
                if mailbox.shared.close() {
                    closed += 1;
                }
            }
        }
        closed
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .get(topic)
            .map(|s| s.mailboxes.read().len())
            .unwrap_or(0)
    }

    pub fn total_subscribers(&self) -> usize {
        self.topics
            .read()
            .values()
            .map(|s| s.mailboxes.read().len())
            .sum()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAILBOX_CAPACITY)
    }
}
