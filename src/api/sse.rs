use axum::{
    extract::{Path, State},
    http::header,
    response::{sse::Sse, IntoResponse},
    Extension,
};

use crate::infrastructure::logging::{Timer, TraceId};
use crate::state::AppContext;
use crate::streaming::StreamAdapter;

/// GET /api/v1/boards/{board_id}/events
///
/// Streams every event published to the board's topic after the subscription
/// is created. `Sse` sets the content type and `no-cache`. The body ends when
/// the bus closes the subscription; a client disconnect drops the body, which
/// unsubscribes.
pub async fn board_events(
    State(ctx): State<AppContext>,
    Extension(trace_id): Extension<TraceId>,
    Path(board_id): Path<String>,
) -> impl IntoResponse {
    let timer = Timer::start();
    let path = format!("/api/v1/boards/{}/events", board_id);
    ctx.logger.api_entry(trace_id.as_str(), "GET", &path, &board_id);

    let adapter = StreamAdapter::open(
        ctx.event_bus.clone(),
        &board_id,
        ctx.logger.clone(),
        trace_id.as_str(),
    );

    ctx.logger.api_exit(trace_id.as_str(), "GET", &path, timer.elapsed_ms(), 200);
    (
        [(header::CONNECTION, "keep-alive")],
        Sse::new(adapter.into_stream()),
    )
}
