//! Critical/optional semantics of the composite fan-out.

use crate::support::ScriptedFetch;
use serde_json::json;
use statgate_breaker::{Breaker, BreakerConfig};
use statgate_cache::{Cache, CacheConfig};
use statgate_core::ErrorClass;
use statgate_retry::RetryPolicy;
use statgate_upstream::{Endpoint, FetchRequest, Gateway, Op, ParallelFetcher};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn gateway(fetch: Arc<ScriptedFetch>) -> Arc<Gateway> {
    Arc::new(Gateway::new(
        Arc::new(Cache::new(CacheConfig::builder().build())),
        Arc::new(Breaker::new(BreakerConfig::builder().jitter_ratio(0.0).build())),
        RetryPolicy::builder()
            .max_attempts(1)
            .base_delay(Duration::from_millis(1))
            .jitter(false)
            .build(),
        fetch,
    ))
}

fn load_op(
    name: &'static str,
    critical: bool,
    gateway: Arc<Gateway>,
    endpoint: Endpoint,
) -> Op {
    let build = move |child: CancellationToken| async move {
        gateway
            .load("composite", name, FetchRequest::new(endpoint), &child)
            .await
    };
    if critical {
        Op::critical(name, build)
    } else {
        Op::optional(name, build)
    }
}

/// Stats succeed (critical), achievements time out (optional): the
/// composite succeeds with a partial payload and a per-source error.
#[tokio::test(start_paused = true)]
async fn optional_timeout_yields_a_partial_composite() {
    let stats_gw = gateway(ScriptedFetch::new(vec![Ok(json!({"pips": 1}))]));
    let achievements_gw = gateway(ScriptedFetch::with_delay(
        vec![Ok(json!([]))],
        Duration::from_secs(60),
    ));

    let fetcher = ParallelFetcher::new(Duration::from_secs(30));
    let token = CancellationToken::new();

    let ops = vec![
        load_op("stats", true, stats_gw, Endpoint::PlayerStats),
        load_op(
            "achievements",
            false,
            achievements_gw,
            Endpoint::PlayerAchievements,
        )
        .with_timeout(Duration::from_secs(1)),
    ];

    let composite = fetcher.run(&token, ops).await.unwrap();
    let statuses = composite.statuses();

    assert_eq!(statuses[0].0, "stats");
    assert!(statuses[0].1.success);
    assert_eq!(statuses[0].1.source, Some("upstream"));

    assert_eq!(statuses[1].0, "achievements");
    assert!(!statuses[1].1.success);
    assert!(statuses[1].1.error.as_deref().unwrap().contains("timed out"));
    assert!(composite.value("achievements").is_none());
}

/// A critical timeout under the overall deadline fails the whole request.
#[tokio::test(start_paused = true)]
async fn critical_timeout_fails_the_composite() {
    let stats_gw = gateway(ScriptedFetch::with_delay(
        vec![Ok(json!({}))],
        Duration::from_secs(120),
    ));

    let fetcher = ParallelFetcher::new(Duration::from_secs(2));
    let token = CancellationToken::new();
    let ops = vec![load_op("stats", true, stats_gw, Endpoint::PlayerStats)];

    let error = fetcher.run(&token, ops).await.unwrap_err();
    assert_eq!(error, ErrorClass::Timeout);
}

/// Sources resolve independently: one from cache, one from upstream.
#[tokio::test]
async fn sources_are_tagged_independently() {
    let cached_gw = gateway(ScriptedFetch::new(vec![Ok(json!({"fresh": false}))]));
    cached_gw
        .cache()
        .set("composite:summary", json!({"fresh": false}), None);
    let live_gw = gateway(ScriptedFetch::new(vec![Ok(json!({"fresh": true}))]));

    let fetcher = ParallelFetcher::new(Duration::from_secs(30));
    let token = CancellationToken::new();

    let ops = vec![
        load_op("summary", true, cached_gw, Endpoint::PlayerSummary),
        load_op("stats", true, live_gw, Endpoint::PlayerStats),
    ];

    let composite = fetcher.run(&token, ops).await.unwrap();
    let statuses = composite.statuses();
    assert_eq!(statuses[0].1.source, Some("cache"));
    assert_eq!(statuses[1].1.source, Some("upstream"));
}
