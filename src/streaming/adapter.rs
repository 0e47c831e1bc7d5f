use std::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::Event as SseEvent;
use futures::stream::{self, Stream};
use tracing::warn;

use super::sse_event::to_sse_event;
use crate::application::events::{EventBus, Subscription};
use crate::infrastructure::logging::{BoundaryLogger, StreamSummary, Timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The consumer went away or a write to it failed
    Disconnected,
    /// The subscription was closed from the bus side (unsubscribe, shutdown)
    EndOfStream,
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::Disconnected => "disconnected",
            CloseReason::EndOfStream => "end_of_stream",
        }
    }
}

/// StreamAdapter - drains one subscription into one streaming connection
///
/// Each event becomes its own message and is handed to the transport before
/// the next one is read. Whatever ends the adapter (end-of-stream, transport
/// failure, task cancellation) drops it, and dropping unsubscribes.
pub struct StreamAdapter<B: EventBus> {
    bus: B,
    subscription: Subscription,
    logger: Arc<BoundaryLogger>,
    trace_id: String,
    frames_emitted: u64,
    timer: Timer,
    close_reason: CloseReason,
}

impl<B: EventBus> StreamAdapter<B> {
    /// Subscribe to `topic`. Only events published from now on are streamed.
    pub fn open(
        bus: B,
        topic: &str,
        logger: Arc<BoundaryLogger>,
        trace_id: impl Into<String>,
    ) -> Self {
        let trace_id = trace_id.into();
        let subscription = bus.subscribe(topic);
        logger.stream_opened(&trace_id, topic, &subscription.id().to_string());

        Self {
            bus,
            subscription,
            logger,
            trace_id,
            frames_emitted: 0,
            timer: Timer::start(),
            close_reason: CloseReason::Disconnected,
        }
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    /// Wait for the next event and convert it. `None` means end-of-stream.
    pub async fn next_event(&mut self) -> Option<SseEvent> {
        loop {
            let Some(event) = self.subscription.recv().await else {
                self.close_reason = CloseReason::EndOfStream;
                return None;
            };

            match to_sse_event(&event) {
                Ok(message) => {
                    self.frames_emitted += 1;
                    return Some(message);
                }
                Err(e) => {
                    warn!(
                        "[{}] Skipping event #{} ({}) that cannot be framed: {}",
                        self.trace_id, event.sequence, event.event_type, e
                    );
                }
            }
        }
    }

    /// Turn the adapter into the stream behind an `Sse` response.
    ///
    /// The transport drops the stream when the client disconnects or a write
    /// fails, which drops the adapter and releases the subscription.
    pub fn into_stream(self) -> impl Stream<Item = Result<SseEvent, Infallible>> + Send + 'static {
        stream::unfold(self, |mut adapter| async move {
            let message = adapter.next_event().await?;
            Some((Ok::<_, Infallible>(message), adapter))
        })
    }
}

impl<B: EventBus> Drop for StreamAdapter<B> {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.subscription);
        let subscription = self.subscription.id().to_string();
        self.logger.stream_closed(
            &self.trace_id,
            &StreamSummary {
                topic: self.subscription.topic(),
                subscription: &subscription,
                reason: self.close_reason.as_str(),
                frames_sent: self.frames_emitted,
                dropped: self.subscription.dropped_count(),
                duration_ms: self.timer.elapsed_ms(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::{EventType, SubscriptionState, TopicEventBus};
    use crate::streaming::sse_event::tests::render;
    use futures::StreamExt;
    use serde_json::json;
    use std::time::Duration;

    fn setup() -> (TopicEventBus, Arc<BoundaryLogger>) {
        let logger = Arc::new(BoundaryLogger::new());
        (TopicEventBus::new_default(logger.clone()), logger)
    }

    #[tokio::test]
    async fn test_open_subscribes_and_converts_events() {
        let (bus, logger) = setup();
        let mut adapter = StreamAdapter::open(bus.clone(), "board-1", logger, "trace-a");
        assert_eq!(bus.subscriber_count("board-1"), 1);

        let seq = bus.publish("board-1", EventType::CardCreated, json!({"id": "c1"}));
        let message = tokio::time::timeout(Duration::from_secs(1), adapter.next_event())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            render(vec![message]).await,
            format!("id: {}\nevent: card.created\ndata: {{\"id\":\"c1\"}}\n\n", seq)
        );
        assert_eq!(adapter.frames_emitted(), 1);
    }

    #[tokio::test]
    async fn test_events_before_open_are_not_replayed() {
        let (bus, logger) = setup();
        bus.publish("board-1", EventType::CardCreated, json!({}));

        let mut adapter = StreamAdapter::open(bus.clone(), "board-1", logger, "trace-b");
        let second = bus.publish("board-1", EventType::CardDeleted, json!({}));

        let message = adapter.next_event().await.unwrap();
        assert!(render(vec![message]).await.starts_with(&format!("id: {}\n", second)));
    }

    #[tokio::test]
    async fn test_dropping_stream_unsubscribes() {
        let (bus, logger) = setup();
        let stream = StreamAdapter::open(bus.clone(), "board-1", logger, "trace-c").into_stream();
        assert_eq!(bus.subscriber_count("board-1"), 1);

        drop(stream);
        assert_eq!(bus.subscriber_count("board-1"), 0);
        assert_eq!(bus.topic_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_reader_task_unsubscribes() {
        let (bus, logger) = setup();
        let mut stream =
            Box::pin(StreamAdapter::open(bus.clone(), "board-1", logger, "trace-d").into_stream());

        let reader = tokio::spawn(async move { stream.next().await.is_some() });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(bus.subscriber_count("board-1"), 1);

        reader.abort();
        let _ = reader.await;
        assert_eq!(bus.subscriber_count("board-1"), 0);
    }

    #[tokio::test]
    async fn test_external_unsubscribe_ends_stream() {
        let (bus, logger) = setup();
        let adapter = StreamAdapter::open(bus.clone(), "board-1", logger, "trace-e");
        assert_eq!(adapter.subscription().state(), SubscriptionState::Open);

        bus.unsubscribe(adapter.subscription());
        let count = tokio::time::timeout(Duration::from_secs(1), adapter.into_stream().count())
            .await
            .expect("stream should end after unsubscribe");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_shutdown_ends_open_streams() {
        let (bus, logger) = setup();
        let stream = StreamAdapter::open(bus.clone(), "board-1", logger, "trace-f").into_stream();
        let collector = tokio::spawn(async move { stream.count().await });

        bus.publish("board-1", EventType::LabelUpdated, json!({"id": "l1"}));
        tokio::time::sleep(Duration::from_millis(10)).await;
        bus.shutdown();

        let messages = tokio::time::timeout(Duration::from_secs(1), collector)
            .await
            .expect("stream did not end on shutdown")
            .unwrap();
        assert_eq!(messages, 1);
        assert_eq!(bus.stats().subscribers, 0);
    }
}
