use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::event_bus::EventBus;
use super::sequencer::Sequencer;
use super::subscription::Subscription;
use super::topic_registry::{TopicRegistry, DEFAULT_MAILBOX_CAPACITY};
use crate::events::{Event, EventType};
use crate::infrastructure::logging::BoundaryLogger;

/// Point-in-time view of the bus counters
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct BusStats {
    pub topics: usize,
    pub subscribers: usize,
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub last_sequence: u64,
}

#[derive(Default)]
struct Counters {
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// Topic-scoped implementation of EventBus
///
/// Cheap to clone; every clone shares one sequencer and one registry.
/// Pass it explicitly to whoever publishes or subscribes.
#[derive(Clone)]
pub struct TopicEventBus {
    sequencer: Arc<Sequencer>,
    registry: Arc<TopicRegistry>,
    counters: Arc<Counters>,
    logger: Arc<BoundaryLogger>,
}

impl TopicEventBus {
    /// Create a new TopicEventBus with the given mailbox capacity
    pub fn new(mailbox_capacity: usize, logger: Arc<BoundaryLogger>) -> Self {
        Self {
            sequencer: Arc::new(Sequencer::new()),
            registry: Arc::new(TopicRegistry::new(mailbox_capacity)),
            counters: Arc::new(Counters::default()),
            logger,
        }
    }

    /// Create with default capacity (64 events per subscriber)
    pub fn new_default(logger: Arc<BoundaryLogger>) -> Self {
        Self::new(DEFAULT_MAILBOX_CAPACITY, logger)
    }

    pub fn mailbox_capacity(&self) -> usize {
        self.registry.capacity()
    }

    pub fn topic_count(&self) -> usize {
        self.registry.topic_count()
    }

    pub fn stats(&self) -> BusStats {
        BusStats {
            topics: self.registry.topic_count(),
            subscribers: self.registry.total_subscribers(),
            published: self.counters.published.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            last_sequence: self.sequencer.current(),
        }
    }

    /// Close every subscription so all stream adapters see end-of-stream.
    pub fn shutdown(&self) -> usize {
        let closed = self.registry.shutdown();
        tracing::info!(closed = closed, "Event bus shut down");
        closed
    }
}

impl EventBus for TopicEventBus {
    fn publish(&self, topic: &str, event_type: EventType, payload: Value) -> u64 {
        let (event, report) = self.registry.publish_with(topic, || {
            Event::new(self.sequencer.next(), topic, event_type, payload)
        });

        self.counters.published.fetch_add(1, Ordering::Relaxed);
        self.counters
            .delivered
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.counters
            .dropped
            .fetch_add(report.dropped as u64, Ordering::Relaxed);

        self.logger.event_publish(&event, report.delivered, report.dropped);
        event.sequence
    }

    fn subscribe(&self, topic: &str) -> Subscription {
        self.registry.subscribe(topic)
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.registry.unsubscribe(subscription)
    }

    fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.subscriber_count(topic)
    }
}
