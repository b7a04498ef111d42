//! End-to-end handler behavior against a scripted upstream.

use crate::http_api::envelope::{body_json, test_state, PLAYER_ID};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use statgate_server::build_router;
use tower::ServiceExt;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn combined_view_assembles_all_parts() {
    let app = build_router(test_state());

    let response = app
        .oneshot(get(&format!("/api/player/{PLAYER_ID}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["summary"]["player"]["persona_name"], "tester");
    assert_eq!(body["summary"]["overview"]["killer_grade"], "Bronze II");

    // Every source resolved from the live upstream on a cold cache.
    for source in ["summary", "stats", "achievements", "schema", "global_percent"] {
        assert_eq!(body["data_sources"][source]["success"], true, "{source}");
        assert_eq!(body["data_sources"][source]["source"], "upstream", "{source}");
    }

    let records = body["achievements"]["records"].as_array().unwrap();
    let adept = records
        .iter()
        .find(|r| r["api_id"] == "ACH_UNLOCK_DWIGHT_PERKS")
        .unwrap();
    assert_eq!(adept["unlocked"], true);
    assert_eq!(adept["kind"], "survivor-adept");
    assert_eq!(adept["character"], "Dwight Fairfield");
    assert_eq!(adept["rarity_percent"], 34.2);
}

#[tokio::test]
async fn second_combined_request_is_served_from_cache() {
    let state = test_state();
    let app = build_router(state);

    let first = app
        .clone()
        .oneshot(get(&format!("/api/player/{PLAYER_ID}")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(get(&format!("/api/player/{PLAYER_ID}")))
        .await
        .unwrap();
    let body = body_json(second).await;
    assert_eq!(body["data_sources"]["stats"]["source"], "cache");
    assert_eq!(body["data_sources"]["summary"]["source"], "cache");
}

#[tokio::test]
async fn stats_endpoint_returns_typed_records() {
    let app = build_router(test_state());

    let response = app
        .oneshot(get(&format!("/api/player/{PLAYER_ID}/stats")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["player_id"], PLAYER_ID);
    let stats = body["stats"].as_array().unwrap();
    let grade = stats
        .iter()
        .find(|s| s["id"] == "DBD_SlasherTierIncrement")
        .unwrap();
    assert_eq!(grade["value_type"], "grade");
    assert_eq!(grade["formatted"], "Bronze II");

    let pips = stats.iter().find(|s| s["id"] == "DBD_KillerSkulls").unwrap();
    assert_eq!(pips["value_type"], "count");
    assert_eq!(pips["formatted"], "3");
}

#[tokio::test]
async fn summary_endpoint_returns_profile_and_digest() {
    let app = build_router(test_state());

    let response = app
        .oneshot(get(&format!("/api/player/{PLAYER_ID}/summary")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["player"]["id"], PLAYER_ID);
    assert_eq!(body["overview"]["survivor_grade"], "Bronze I");
}

#[tokio::test]
async fn evict_endpoint_enforces_its_cooldown() {
    let app = build_router(test_state());

    let first = app.clone().oneshot(post("/api/cache/evict")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let body = body_json(first).await;
    assert!(body["evicted"].is_u64());

    let second = app.oneshot(post("/api/cache/evict")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(second).await;
    assert_eq!(body["type"], "rate_limit");
    let retry_after = body["retry_after"].as_u64().unwrap();
    assert!(retry_after >= 1 && retry_after <= 30);
}

#[tokio::test]
async fn cache_stats_endpoint_reports_both_components() {
    let app = build_router(test_state());

    let response = app.oneshot(get("/api/cache/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["cache"]["hits"].is_u64());
    assert!(body["cache"]["hit_rate"].is_number());
    assert_eq!(body["breaker"]["state"], "closed");
}

#[tokio::test]
async fn metrics_endpoint_aggregates_counters() {
    let app = build_router(test_state());

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["uptime_seconds"].is_u64());
    assert!(body["cache"]["entries"].is_u64());
    assert_eq!(body["merge_corruption_events"], 0);
}
