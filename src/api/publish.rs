use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::application::events::EventType;
use crate::application::services::BoardChange;
use crate::db::models::{ActivityAction, NewActivity};
use crate::infrastructure::logging::{Timer, TraceId};
use crate::state::AppContext;

/// Audit record attached to a published change
#[derive(Debug, Deserialize)]
pub struct ActivityInput {
    pub card_id: String,
    pub actor: String,
    pub action: ActivityAction,
    #[serde(default)]
    pub detail: Value,
}

/// A mutation the board service has already persisted
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub payload: Value,
    pub activity: Option<ActivityInput>,
}

/// POST /api/v1/boards/{board_id}/events
///
/// Appends the optional audit record, then publishes to the board's topic.
pub async fn publish_change(
    State(ctx): State<AppContext>,
    Extension(trace_id): Extension<TraceId>,
    Path(board_id): Path<String>,
    Json(req): Json<PublishRequest>,
) -> impl IntoResponse {
    let timer = Timer::start();
    let path = format!("/api/v1/boards/{}/events", board_id);
    ctx.logger.api_entry(trace_id.as_str(), "POST", &path, req.event_type.as_str());

    let mut change = BoardChange {
        board_id: board_id.clone(),
        event_type: req.event_type,
        payload: req.payload,
        activity: None,
    };
    if let Some(activity) = req.activity {
        change = change.with_activity(NewActivity::new(
            board_id,
            activity.card_id,
            activity.actor,
            activity.action,
            activity.detail,
        ));
    }

    let sequence = ctx.board_notifier.commit(trace_id.as_str(), change).await;

    ctx.logger.api_exit(trace_id.as_str(), "POST", &path, timer.elapsed_ms(), 202);
    (StatusCode::ACCEPTED, Json(json!({ "sequence": sequence })))
}

#[cfg(test)]
mod tests {
    use crate::api::router;
    use crate::application::events::{EventBus, EventType};
    use crate::application::ports::repositories::ActivityRepository;
    use crate::config::AppConfig;
    use crate::db::models::ActivityAction;
    use crate::state::AppContext;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn post(ctx: &AppContext, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router(ctx.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_publish_reaches_board_subscribers() {
        let ctx = AppContext::new(AppConfig::from_lookup(|_| None).unwrap());
        let mut sub = ctx.event_bus.subscribe("b1");

        let (status, body) = post(
            &ctx,
            "/api/v1/boards/b1/events",
            json!({
                "type": "card.moved",
                "payload": {"id": "c1", "list_id": "l2"},
                "activity": {"card_id": "c1", "actor": "alice", "action": "moved"}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        let event = sub.try_recv().unwrap();
        assert_eq!(body["sequence"], event.sequence);
        assert_eq!(event.event_type, EventType::CardMoved);
        assert_eq!(event.payload, json!({"id": "c1", "list_id": "l2"}));

        let stored = ctx.activity_repo.list_by_board("b1", 10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].action, ActivityAction::Moved);
    }

    #[tokio::test]
    async fn test_publish_without_activity_skips_store() {
        let ctx = AppContext::new(AppConfig::from_lookup(|_| None).unwrap());

        let (status, _) = post(
            &ctx,
            "/api/v1/boards/b1/events",
            json!({"type": "sprint.closed", "payload": {"id": "s1"}}),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(ctx.activity_repo.len().await, 0);
        assert_eq!(ctx.event_bus.stats().published, 1);
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() {
        let ctx = AppContext::new(AppConfig::from_lookup(|_| None).unwrap());

        let (status, _) = post(
            &ctx,
            "/api/v1/boards/b1/events",
            json!({
                "type": "card.updated",
                "activity": {"card_id": "c1", "actor": "a", "action": "archived"}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ctx.event_bus.stats().published, 0);
    }
}
