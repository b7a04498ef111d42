//! Breaker-and-stale behavior of the gateway under upstream failure.

use crate::support::ScriptedFetch;
use serde_json::json;
use statgate_breaker::{Breaker, BreakerConfig, CircuitState};
use statgate_cache::{Cache, CacheConfig};
use statgate_core::{ErrorClass, RetryHint};
use statgate_retry::RetryPolicy;
use statgate_upstream::{DataSource, Endpoint, FetchRequest, Gateway};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn gateway(fetch: Arc<ScriptedFetch>, max_failures: u32, max_retries: u32) -> Gateway {
    Gateway::new(
        Arc::new(Cache::new(CacheConfig::builder().name("gw-test").build())),
        Arc::new(Breaker::new(
            BreakerConfig::builder()
                .max_failures(max_failures)
                .reset_timeout(Duration::from_secs(60))
                .jitter_ratio(0.0)
                .build(),
        )),
        RetryPolicy::builder()
            .max_attempts(max_retries)
            .base_delay(Duration::from_millis(1))
            .jitter(false)
            .build(),
        fetch,
    )
}

fn request() -> FetchRequest {
    FetchRequest::new(Endpoint::PlayerStats).param("steamid", "x")
}

/// Persistent 5xx: each gateway call exhausts its retries, the breaker
/// opens after `max_failures` calls, and the next call is denied without
/// touching the upstream.
#[tokio::test]
async fn repeated_5xx_trips_the_breaker_and_stops_fetching() {
    let fetch = ScriptedFetch::new(vec![Err(ErrorClass::Upstream(503))]);
    let gw = gateway(Arc::clone(&fetch), 3, 2);
    let token = CancellationToken::new();

    for call in 1..=3 {
        let err = gw.load("player_stats", "x", request(), &token).await.unwrap_err();
        assert_eq!(err, ErrorClass::Upstream(503), "call {call}");
        // Every call retried max_retries times.
        assert_eq!(fetch.calls(), call * 2);
    }
    assert_eq!(gw.breaker().state(), CircuitState::Open);

    // Call 4: denied outright, upstream untouched.
    let err = gw.load("player_stats", "x", request(), &token).await.unwrap_err();
    assert_eq!(err, ErrorClass::Upstream(503));
    assert_eq!(fetch.calls(), 6);
}

/// Same as above, but with a prior (now expired) entry in the cache: the
/// denied call downgrades to a stale serve instead of an error.
#[tokio::test]
async fn breaker_denial_downgrades_to_stale_when_possible() {
    let fetch = ScriptedFetch::new(vec![Err(ErrorClass::Upstream(503))]);
    let gw = gateway(Arc::clone(&fetch), 1, 1);
    let token = CancellationToken::new();

    gw.cache()
        .set("player_stats:x", json!({"pips": 6}), Some(Duration::from_millis(5)));
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Trips the breaker; stale data already softens this first failure.
    let first = gw.load("player_stats", "x", request(), &token).await.unwrap();
    assert_eq!(first.source, DataSource::Stale);
    assert_eq!(gw.breaker().state(), CircuitState::Open);

    let second = gw.load("player_stats", "x", request(), &token).await.unwrap();
    assert_eq!(second.source, DataSource::Stale);
    assert!(second.degraded);
    assert_eq!(second.value, json!({"pips": 6}));
    assert_eq!(fetch.calls(), 1);
}

/// A 429 with `Retry-After: 2` schedules the second attempt at least two
/// (virtual) seconds later; a 200 on that attempt serves from upstream.
#[tokio::test(start_paused = true)]
async fn rate_limit_hint_is_honored_between_attempts() {
    let fetch = ScriptedFetch::new(vec![
        Err(ErrorClass::RateLimited {
            hint: Some(RetryHint::Delta(Duration::from_secs(2))),
        }),
        Ok(json!({"pips": 8})),
    ]);
    let gw = gateway(Arc::clone(&fetch), 5, 2);
    let token = CancellationToken::new();

    let started = tokio::time::Instant::now();
    let served = gw.load("player_stats", "x", request(), &token).await.unwrap();

    assert_eq!(served.source, DataSource::Upstream);
    assert_eq!(served.value, json!({"pips": 8}));
    assert_eq!(fetch.calls(), 2);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2), "elapsed {elapsed:?}");
    assert_eq!(gw.breaker().state(), CircuitState::Closed);
}

/// Fresh cache data short-circuits everything, even an open breaker.
#[tokio::test]
async fn fresh_hit_wins_over_everything() {
    let fetch = ScriptedFetch::new(vec![Err(ErrorClass::Upstream(500))]);
    let gw = gateway(Arc::clone(&fetch), 1, 1);
    let token = CancellationToken::new();

    gw.breaker().force_open();
    gw.cache().set("player_stats:x", json!({"pips": 2}), None);

    let served = gw.load("player_stats", "x", request(), &token).await.unwrap();
    assert_eq!(served.source, DataSource::Cache);
    assert!(!served.degraded);
    assert_eq!(fetch.calls(), 0);
}
