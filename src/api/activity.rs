use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::application::ports::repositories::ActivityRepository;
use crate::infrastructure::logging::{Timer, TraceId};
use crate::state::AppContext;

const DEFAULT_ACTIVITY_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub actor: String,
    pub text: String,
}

/// GET /api/v1/cards/{card_id}/activity
pub async fn card_activity(
    State(ctx): State<AppContext>,
    Extension(trace_id): Extension<TraceId>,
    Path(card_id): Path<String>,
    Query(query): Query<ActivityQuery>,
) -> Response {
    let timer = Timer::start();
    let path = format!("/api/v1/cards/{}/activity", card_id);
    ctx.logger.api_entry(trace_id.as_str(), "GET", &path, "");

    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    match ctx.activity_repo.list_by_card(&card_id, limit).await {
        Ok(entries) => {
            ctx.logger.api_exit(trace_id.as_str(), "GET", &path, timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(entries)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to list card activity: {}", trace_id.as_str(), e);
            ctx.logger.api_exit(trace_id.as_str(), "GET", &path, timer.elapsed_ms(), 500);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /api/v1/boards/{board_id}/activity
pub async fn board_activity(
    State(ctx): State<AppContext>,
    Extension(trace_id): Extension<TraceId>,
    Path(board_id): Path<String>,
    Query(query): Query<ActivityQuery>,
) -> Response {
    let timer = Timer::start();
    let path = format!("/api/v1/boards/{}/activity", board_id);
    ctx.logger.api_entry(trace_id.as_str(), "GET", &path, "");

    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    match ctx.activity_repo.list_by_board(&board_id, limit).await {
        Ok(entries) => {
            ctx.logger.api_exit(trace_id.as_str(), "GET", &path, timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(entries)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to list board activity: {}", trace_id.as_str(), e);
            ctx.logger.api_exit(trace_id.as_str(), "GET", &path, timer.elapsed_ms(), 500);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// POST /api/v1/boards/{board_id}/cards/{card_id}/comments
///
/// Records the comment and announces it to the board as `activity.new`.
pub async fn add_comment(
    State(ctx): State<AppContext>,
    Extension(trace_id): Extension<TraceId>,
    Path((board_id, card_id)): Path<(String, String)>,
    Json(req): Json<CommentRequest>,
) -> impl IntoResponse {
    let timer = Timer::start();
    let path = format!("/api/v1/boards/{}/cards/{}/comments", board_id, card_id);
    ctx.logger.api_entry(trace_id.as_str(), "POST", &path, &format!("actor={}", req.actor));

    let result = ctx
        .board_notifier
        .comment(trace_id.as_str(), &board_id, &card_id, &req.actor, &req.text)
        .await;

    let (status, body): (StatusCode, Value) = match result {
        Ok(sequence) => (StatusCode::CREATED, json!({ "sequence": sequence })),
        Err(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
    };
    ctx.logger.api_exit(trace_id.as_str(), "POST", &path, timer.elapsed_ms(), status.as_u16());
    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use crate::api::router;
    use crate::application::events::{EventBus, EventType};
    use crate::config::AppConfig;
    use crate::state::AppContext;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn context() -> AppContext {
        AppContext::new(AppConfig::from_lookup(|_| None).unwrap())
    }

    async fn send(
        ctx: &AppContext,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder().method(method).uri(uri).body(Body::empty()).unwrap(),
        };
        let response = router(ctx.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_comment_is_stored_and_announced() {
        let ctx = context();
        let mut sub = ctx.event_bus.subscribe("b1");

        let (status, body) = send(
            &ctx,
            Method::POST,
            "/api/v1/boards/b1/cards/c1/comments",
            Some(json!({"actor": "agent-7", "text": "Blocked on review"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let event = sub.try_recv().unwrap();
        assert_eq!(body["sequence"], event.sequence);
        assert_eq!(event.event_type, EventType::ActivityNew);
        assert_eq!(event.payload, json!({"card_id": "c1", "actor": "agent-7"}));

        let (status, entries) = send(&ctx, Method::GET, "/api/v1/cards/c1/activity", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(entries[0]["action"], "comment");
        assert_eq!(entries[0]["detail"]["text"], "Blocked on review");
    }

    #[tokio::test]
    async fn test_empty_comment_is_rejected() {
        let ctx = context();

        let (status, body) = send(
            &ctx,
            Method::POST,
            "/api/v1/boards/b1/cards/c1/comments",
            Some(json!({"actor": "bob", "text": "  "})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "comment text is required");
        assert_eq!(ctx.event_bus.stats().published, 0);
    }

    #[tokio::test]
    async fn test_board_activity_is_newest_first_and_limited() {
        let ctx = context();
        for (card, text) in [("c1", "first"), ("c2", "second"), ("c1", "third")] {
            ctx.board_notifier
                .comment("trace-t", "b1", card, "alice", text)
                .await
                .unwrap();
        }
        ctx.board_notifier
            .comment("trace-t", "b2", "c9", "alice", "elsewhere")
            .await
            .unwrap();

        let (status, entries) =
            send(&ctx, Method::GET, "/api/v1/boards/b1/activity?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        let texts: Vec<_> = entries
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["detail"]["text"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["third", "second"]);
    }

    #[tokio::test]
    async fn test_unknown_card_has_empty_activity() {
        let ctx = context();
        let (status, entries) = send(&ctx, Method::GET, "/api/v1/cards/nope/activity", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(entries, json!([]));
    }
}
