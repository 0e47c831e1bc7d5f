use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::application::events::{BusStats, EventBus};
use crate::infrastructure::logging::{Timer, TraceId};
use crate::state::AppContext;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub board_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub bus: BusStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_subscribers: Option<usize>,
}

/// GET /api/v1/events/stats
pub async fn event_stats(
    State(ctx): State<AppContext>,
    Extension(trace_id): Extension<TraceId>,
    Query(query): Query<StatsQuery>,
) -> impl IntoResponse {
    let timer = Timer::start();
    let params = query.board_id.as_deref().unwrap_or("");
    ctx.logger.api_entry(trace_id.as_str(), "GET", "/api/v1/events/stats", params);

    let board_subscribers = query
        .board_id
        .as_deref()
        .map(|board_id| ctx.event_bus.subscriber_count(board_id));
    let response = StatsResponse {
        bus: ctx.event_bus.stats(),
        board_id: query.board_id,
        board_subscribers,
    };

    ctx.logger.api_exit(trace_id.as_str(), "GET", "/api/v1/events/stats", timer.elapsed_ms(), 200);
    Json(response)
}
