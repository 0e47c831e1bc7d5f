pub mod event_bus;
pub mod sequencer;
pub mod subscription;
pub mod topic_event_bus;
pub mod topic_registry;

// Re-export Event from root events module for convenience
pub use crate::events::{CustomEventType, Event, EventType};
pub use event_bus::EventBus;
pub use sequencer::Sequencer;
pub use subscription::{Subscription, SubscriptionId, SubscriptionState, TryRecvError};
pub use topic_event_bus::{BusStats, TopicEventBus};
pub use topic_registry::{FanoutReport, TopicRegistry, DEFAULT_MAILBOX_CAPACITY};
