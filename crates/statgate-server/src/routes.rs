//! Route table.

use crate::handlers::{admin, player};
use crate::request_id::assign_request_id;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/player/:id", get(player::combined))
        .route("/api/player/:id/summary", get(player::summary))
        .route("/api/player/:id/stats", get(player::stats))
        .route("/api/cache/stats", get(admin::cache_stats))
        .route("/api/cache/evict", post(admin::evict))
        .route("/metrics", get(admin::metrics))
        .layer(axum::middleware::from_fn(assign_request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
