use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::events::{EventBus, EventType};
use crate::application::ports::repositories::ActivityRepository;
use crate::db::models::{ActivityAction, NewActivity};
use crate::infrastructure::logging::{BoundaryLogger, Timer};

/// One already-persisted board mutation, ready to be announced
#[derive(Debug, Clone)]
pub struct BoardChange {
    pub board_id: String,
    pub event_type: EventType,
    pub payload: Value,
    pub activity: Option<NewActivity>,
}

impl BoardChange {
    /// Capture the post-mutation representation the subscribers will see.
    pub fn new<P: Serialize>(
        board_id: impl Into<String>,
        event_type: EventType,
        payload: &P,
    ) -> Result<Self> {
        let payload = serde_json::to_value(payload)
            .with_context(|| format!("Failed to serialize {} payload", event_type))?;
        Ok(Self {
            board_id: board_id.into(),
            event_type,
            payload,
            activity: None,
        })
    }

    pub fn with_activity(mut self, activity: NewActivity) -> Self {
        self.activity = Some(activity);
        self
    }
}

/// BoardNotifier - the service layer's side of the event bus contract
///
/// Order per mutation:
/// 1. the caller persists the change (before calling in here)
/// 2. the audit record is appended
/// 3. the event is published
///
/// The steps are not atomic. A crash between them loses the notification and
/// subscribers only catch up on their next full fetch; the store stays the
/// source of truth.
pub struct BoardNotifier<AR, EB>
where
    AR: ActivityRepository,
    EB: EventBus,
{
    activity_repo: Arc<AR>,
    event_bus: EB,
    logger: Arc<BoundaryLogger>,
}

impl<AR, EB> BoardNotifier<AR, EB>
where
    AR: ActivityRepository,
    EB: EventBus,
{
    pub fn new(activity_repo: Arc<AR>, event_bus: EB, logger: Arc<BoundaryLogger>) -> Self {
        Self {
            activity_repo,
            event_bus,
            logger,
        }
    }

    /// Record the audit entry (if any) and publish. Returns the event's sequence.
    ///
    /// A failed audit append is logged and the event still goes out.
    pub async fn commit(&self, trace_id: &str, change: BoardChange) -> u64 {
        let timer = Timer::start();
        self.logger.service_entry(
            trace_id,
            "Service",
            "BoardNotifier",
            "commit",
            &change.event_type.as_str(),
        );

        if let Some(activity) = change.activity {
            self.append_activity(trace_id, activity).await;
        }

        let sequence = self
            .event_bus
            .publish(&change.board_id, change.event_type, change.payload);

        self.logger
            .service_exit(trace_id, "Service", "BoardNotifier", "commit", timer.elapsed_ms());
        sequence
    }

    /// Record a comment on a card and announce it as `activity.new`.
    pub async fn comment(
        &self,
        trace_id: &str,
        board_id: &str,
        card_id: &str,
        actor: &str,
        text: &str,
    ) -> Result<u64> {
        let timer = Timer::start();
        self.logger.service_entry(trace_id, "Service", "BoardNotifier", "comment", &card_id);

        if text.trim().is_empty() {
            let err = anyhow::anyhow!("comment text is required");
            self.logger.service_error(trace_id, "Service", "BoardNotifier", "comment", &err);
            return Err(err);
        }

        let activity = NewActivity::new(
            board_id,
            card_id,
            actor,
            ActivityAction::Comment,
            json!({ "text": text }),
        );
        self.append_activity(trace_id, activity).await;

        let sequence = self.event_bus.publish(
            board_id,
            EventType::ActivityNew,
            json!({ "card_id": card_id, "actor": actor }),
        );

        self.logger
            .service_exit(trace_id, "Service", "BoardNotifier", "comment", timer.elapsed_ms());
        Ok(sequence)
    }

    async fn append_activity(&self, trace_id: &str, activity: NewActivity) {
        self.logger.repo_call(trace_id, "BoardNotifier", "ActivityRepo", "append");
        let repo_timer = Timer::start();
        match self.activity_repo.append(activity).await {
            Ok(_) => {
                self.logger.repo_done(
                    trace_id,
                    "BoardNotifier",
                    "ActivityRepo",
                    "append",
                    repo_timer.elapsed_ms(),
                );
            }
            Err(e) => {
                self.logger.repo_error(trace_id, "BoardNotifier", "ActivityRepo", "append", &e);
            }
        }
    }
}
