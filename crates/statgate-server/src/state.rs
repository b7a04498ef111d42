//! Process-wide state: the shared cache, breaker, and gateway wiring.

use crate::config::AppConfig;
use statgate_breaker::{Breaker, BreakerConfig};
use statgate_cache::{Cache, CacheConfig};
use statgate_model::{AdeptMap, MergePolicy};
use statgate_retry::RetryPolicy;
use statgate_upstream::{Fetch, Gateway, ParallelFetcher};
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Shared handles passed to every handler. The cache and breaker are the
/// only shared mutable state; everything else is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<Cache>,
    pub breaker: Arc<Breaker>,
    pub gateway: Arc<Gateway>,
    pub fetcher: Arc<ParallelFetcher>,
    pub adepts: Arc<AdeptMap>,
    pub merge_policy: MergePolicy,
    pub config: Arc<AppConfig>,
    /// Earliest instant the next manual eviction is allowed.
    pub evict_cooldown: Arc<Mutex<Option<Instant>>>,
    /// Rejected or latch-overridden merges since startup.
    pub merge_corruptions: Arc<AtomicU64>,
    pub started: Instant,
}

impl AppState {
    /// Wires the full stack around an injected transport. Tests pass a
    /// scripted [`Fetch`]; `main` passes the reqwest client.
    pub fn build(config: AppConfig, fetch: Arc<dyn Fetch>) -> Result<Self, String> {
        let cache = Arc::new(Cache::new(
            CacheConfig::builder()
                .name("statgate")
                .max_entries(config.cache.max_entries)
                .max_memory_bytes(config.cache.max_memory_bytes)
                .default_ttl(config.cache.default_ttl)
                .cleanup_interval(config.cache.cleanup_interval)
                .shutdown_grace(config.shutdown_grace)
                .validator("player_summary", |v| v.is_object())
                .validator("player_stats", |v| {
                    v.get("playerstats").map(|p| p.get("stats").is_some()).unwrap_or(false)
                })
                .validator("player_achievements", |v| v.get("playerstats").is_some())
                .validator("schema", |v| v.get("game").is_some())
                .validator("global_percent", |v| v.get("achievementpercentages").is_some())
                .validator("achievement_snapshot", |v| {
                    v.get("records").is_some() && v.get("fetched_at").is_some()
                })
                .validator("vanity", |v| v.get("response").is_some())
                .build(),
        ));

        let breaker = Arc::new(Breaker::new(
            BreakerConfig::builder()
                .name("provider")
                .max_failures(config.breaker.max_failures)
                .reset_timeout(config.breaker.reset_timeout)
                .half_open_max_calls(config.breaker.half_open_max_calls)
                .success_threshold(config.breaker.success_threshold)
                .build(),
        ));

        let retry = RetryPolicy::builder()
            .name("provider")
            .max_attempts(config.retry.max_retries.max(1))
            .base_delay(config.retry.base_backoff)
            .max_delay(config.retry.max_backoff)
            .build();

        let gateway = Arc::new(
            Gateway::new(
                Arc::clone(&cache),
                Arc::clone(&breaker),
                retry,
                fetch,
            )
            .with_namespace_ttl("player_stats", config.cache.player_stats_ttl)
            .with_namespace_ttl("player_achievements", config.cache.player_achievements_ttl)
            .with_namespace_ttl("schema", config.cache.schema_ttl)
            .with_namespace_ttl("global_percent", config.cache.schema_ttl)
            .with_namespace_ttl("vanity", Duration::from_secs(24 * 3600)),
        );

        let adepts = match &config.adept_map_path {
            Some(path) => Arc::new(
                AdeptMap::from_path(path).map_err(|e| format!("adept map at {path:?}: {e}"))?,
            ),
            None => Arc::new(AdeptMap::embedded()),
        };

        let fetcher = Arc::new(ParallelFetcher::new(config.timeouts.overall_timeout));

        Ok(Self {
            cache,
            breaker,
            gateway,
            fetcher,
            adepts,
            merge_policy: MergePolicy::default(),
            config: Arc::new(config),
            evict_cooldown: Arc::new(Mutex::new(None)),
            merge_corruptions: Arc::new(AtomicU64::new(0)),
            started: Instant::now(),
        })
    }
}
