mod activity;
mod publish;
mod sse;
mod stats;
pub mod middleware;

pub use activity::{add_comment, board_activity, card_activity};
pub use middleware::TraceIdLayer;
pub use publish::publish_change;
pub use sse::board_events;
pub use stats::{event_stats, StatsResponse};

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppContext;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/boards/{board_id}/events", get(board_events).post(publish_change))
        .route("/boards/{board_id}/activity", get(board_activity))
        .route("/boards/{board_id}/cards/{card_id}/comments", post(add_comment))
        .route("/cards/{card_id}/activity", get(card_activity))
        .route("/events/stats", get(event_stats))
}

/// Full HTTP application: versioned API plus tracing and CORS layers
pub fn router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes())
        .layer(TraceIdLayer)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ctx)
}
