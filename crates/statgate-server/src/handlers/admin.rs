//! Operational endpoints: cache stats, manual eviction, metrics.

use crate::error::ApiError;
use crate::request_id::RequestId;
use crate::state::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use serde_json::{json, Value};
use statgate_core::{ErrorClass, RetryHint};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

/// Manual eviction is rate limited to one call per this window.
const EVICT_COOLDOWN: Duration = Duration::from_secs(30);

/// `GET /api/cache/stats`
pub async fn cache_stats(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "cache": state.cache.stats(),
        "breaker": state.breaker.metrics(),
    }))
}

/// `POST /api/cache/evict`
pub async fn evict(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
) -> Result<Json<Value>, ApiError> {
    {
        let mut last = match state.evict_cooldown.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < EVICT_COOLDOWN {
                let remaining = EVICT_COOLDOWN - elapsed;
                return Err(ApiError::new(
                    ErrorClass::RateLimited {
                        hint: Some(RetryHint::Delta(remaining)),
                    },
                    &request_id,
                )
                .with_details("manual eviction is on cooldown"));
            }
        }
        *last = Some(Instant::now());
    }

    let evicted = state.cache.evict_expired();
    tracing::info!(evicted, "manual eviction triggered");
    Ok(Json(json!({ "evicted": evicted })))
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "uptime_seconds": state.started.elapsed().as_secs(),
        "cache": state.cache.stats(),
        "breaker": state.breaker.metrics(),
        "merge_corruption_events": state.merge_corruptions.load(Ordering::Relaxed),
    }))
}
