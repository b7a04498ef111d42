//! Player-facing endpoints: summary, stats, and the combined view.

use crate::achievements::assemble_and_merge;
use crate::error::ApiError;
use crate::ident::{parse_ident, resolve};
use crate::request_id::RequestId;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde_json::{json, Map, Value};
use statgate_core::ErrorClass;
use statgate_model::{map_stats, overview, provider, PlayerSummary};
use statgate_upstream::{Endpoint, FetchRequest, Op, Sourced};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

fn summary_request(steam_id: &str) -> FetchRequest {
    FetchRequest::new(Endpoint::PlayerSummary).param("steamids", steam_id)
}

fn stats_request(steam_id: &str) -> FetchRequest {
    FetchRequest::new(Endpoint::PlayerStats).param("steamid", steam_id)
}

fn achievements_request(steam_id: &str) -> FetchRequest {
    FetchRequest::new(Endpoint::PlayerAchievements)
        .param("steamid", steam_id)
        .param("l", "english")
}

fn schema_request() -> FetchRequest {
    FetchRequest::new(Endpoint::GameSchema).param("l", "english")
}

fn parse_summary(sourced: &Sourced, request_id: &str) -> Result<PlayerSummary, ApiError> {
    PlayerSummary::from_payload(&sourced.value).ok_or_else(|| {
        ApiError::new(
            ErrorClass::Internal("provider summary payload was unusable".into()),
            request_id,
        )
    })
}

fn stat_records(
    stats_body: &Value,
    schema_body: Option<&Value>,
) -> Vec<statgate_model::StatRecord> {
    let values = provider::parse_user_stats(stats_body);
    let schema = schema_body
        .map(provider::parse_stat_schema)
        .unwrap_or_else(HashMap::new);
    map_stats(&schema, &values)
}

/// `GET /api/player/{id}/summary`
pub async fn summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(RequestId(request_id)): Extension<RequestId>,
) -> Result<Json<Value>, ApiError> {
    let token = CancellationToken::new();
    let ident = parse_ident(&id).map_err(|e| ApiError::new(e, &request_id))?;
    let steam_id = resolve(&state, ident, &token)
        .await
        .map_err(|e| ApiError::new(e, &request_id))?;

    let (summary_res, stats_res) = tokio::join!(
        state
            .gateway
            .load("player_summary", &steam_id, summary_request(&steam_id), &token),
        state
            .gateway
            .load("player_stats", &steam_id, stats_request(&steam_id), &token),
    );

    let sourced = summary_res.map_err(|e| ApiError::new(e, &request_id))?;
    let player = parse_summary(&sourced, &request_id)?;

    // The grade/prestige digest is best-effort on this endpoint.
    let digest = stats_res
        .ok()
        .map(|stats| overview(&stat_records(&stats.value, None)));

    Ok(Json(json!({
        "player": player,
        "overview": digest,
    })))
}

/// `GET /api/player/{id}/stats`
pub async fn stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(RequestId(request_id)): Extension<RequestId>,
) -> Result<Json<Value>, ApiError> {
    let token = CancellationToken::new();
    let ident = parse_ident(&id).map_err(|e| ApiError::new(e, &request_id))?;
    let steam_id = resolve(&state, ident, &token)
        .await
        .map_err(|e| ApiError::new(e, &request_id))?;

    let (stats_res, schema_res) = tokio::join!(
        state
            .gateway
            .load("player_stats", &steam_id, stats_request(&steam_id), &token),
        state.gateway.load("schema", "global", schema_request(), &token),
    );

    let stats_sourced = stats_res.map_err(|e| ApiError::new(e, &request_id))?;
    let schema_value = schema_res.ok().map(|s| s.value);
    let records = stat_records(&stats_sourced.value, schema_value.as_ref());

    Ok(Json(json!({
        "player_id": steam_id,
        "overview": overview(&records),
        "stats": records,
    })))
}

/// `GET /api/player/{id}` — the combined composite view.
pub async fn combined(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(RequestId(request_id)): Extension<RequestId>,
) -> Result<Json<Value>, ApiError> {
    let token = CancellationToken::new();
    let ident = parse_ident(&id).map_err(|e| ApiError::new(e, &request_id))?;
    let steam_id = resolve(&state, ident, &token)
        .await
        .map_err(|e| ApiError::new(e, &request_id))?;

    let gateway = &state.gateway;
    let mut ops = vec![
        Op::critical("summary", {
            let gateway = gateway.clone();
            let steam_id = steam_id.clone();
            move |child| async move {
                gateway
                    .load("player_summary", &steam_id, summary_request(&steam_id), &child)
                    .await
            }
        }),
        Op::critical("stats", {
            let gateway = gateway.clone();
            let steam_id = steam_id.clone();
            move |child| async move {
                gateway
                    .load("player_stats", &steam_id, stats_request(&steam_id), &child)
                    .await
            }
        }),
        Op::optional("schema", {
            let gateway = gateway.clone();
            move |child| async move {
                gateway.load("schema", "global", schema_request(), &child).await
            }
        }),
        Op::optional("global_percent", {
            let gateway = gateway.clone();
            move |child| async move {
                gateway
                    .load(
                        "global_percent",
                        "global",
                        FetchRequest::new(Endpoint::GlobalAchievementPercentages),
                        &child,
                    )
                    .await
            }
        }),
    ];

    let mut achievements_op = Op::optional("achievements", {
        let gateway = gateway.clone();
        let steam_id = steam_id.clone();
        move |child| async move {
            gateway
                .load(
                    "player_achievements",
                    &steam_id,
                    achievements_request(&steam_id),
                    &child,
                )
                .await
        }
    });
    if let Some(timeout) = state.config.timeouts.achievements_timeout {
        achievements_op = achievements_op.with_timeout(timeout);
    }
    ops.push(achievements_op);

    let composite = state
        .fetcher
        .run(&token, ops)
        .await
        .map_err(|e| ApiError::new(e, &request_id))?;

    // Critical parts are guaranteed present after a successful run.
    let summary_sourced = composite
        .value("summary")
        .ok_or_else(|| ApiError::new(ErrorClass::Internal("summary part missing".into()), &request_id))?;
    let stats_sourced = composite
        .value("stats")
        .ok_or_else(|| ApiError::new(ErrorClass::Internal("stats part missing".into()), &request_id))?;

    let player = parse_summary(summary_sourced, &request_id)?;
    let schema_value = composite.value("schema").map(|s| s.value.clone());
    let records = stat_records(&stats_sourced.value, schema_value.as_ref());

    let achievements = composite.value("achievements").and_then(|sourced| {
        assemble_and_merge(
            &state,
            &steam_id,
            sourced.fetched_at,
            &sourced.value,
            schema_value.as_ref(),
            composite.value("global_percent").map(|s| &s.value),
        )
    });

    let mut data_sources = Map::new();
    for (name, status) in composite.statuses() {
        data_sources.insert(
            name.to_string(),
            serde_json::to_value(status).unwrap_or(Value::Null),
        );
    }

    Ok(Json(json!({
        "summary": {
            "player": player,
            "overview": overview(&records),
        },
        "stats": records,
        "achievements": achievements,
        "data_sources": Value::Object(data_sources),
    })))
}
