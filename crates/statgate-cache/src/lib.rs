//! Keyed TTL + LRU in-memory cache for the statgate facade.
//!
//! Keys are `namespace:identifier` strings; payloads are opaque JSON values
//! validated per-namespace on retrieval. The store enforces both an entry
//! count and an estimated memory bound with least-recently-accessed
//! eviction, and a background sweeper drops expired entries between reads.
//!
//! The cache is defined by its operation set (`set`/`get`/`delete`/`clear`/
//! `evict_expired`/`stats`); a remote-store implementation can satisfy the
//! same contract without the gateway noticing.
//!
//! ```
//! use statgate_cache::{Cache, CacheConfig};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! let cache = Cache::new(
//!     CacheConfig::builder()
//!         .max_entries(1000)
//!         .default_ttl(Duration::from_secs(300))
//!         .validator("player_stats", |v| v.is_object())
//!         .build(),
//! );
//!
//! cache.set("player_stats:76561198000000000", json!({"pips": 10}), None);
//! assert!(cache.get("player_stats:76561198000000000").is_some());
//! ```

mod config;
mod entry;
mod events;
mod stats;
mod store;
mod sweeper;

pub use config::{CacheConfig, CacheConfigBuilder, ShapeValidator};
pub use events::{CacheEvent, EvictionReason};
pub use stats::CacheStats;
pub use store::Found;
pub use sweeper::spawn_sweeper;

use crate::events::CacheEvent as Ev;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use store::Store;

/// Process-wide TTL + LRU cache with corruption quarantine.
///
/// All operations are safe under concurrent callers; a single mutex guards
/// the map so readers never observe a half-written entry. After
/// [`Cache::shutdown`], reads return `None` and writes are no-ops.
pub struct Cache {
    config: CacheConfig,
    store: Mutex<Store>,
    closed: AtomicBool,
    started: Instant,
}

impl Cache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            store: Mutex::new(Store::new()),
            closed: AtomicBool::new(false),
            started: Instant::now(),
        }
    }

    /// Stores `value` under `key` with the given TTL (the configured
    /// default when `None`). TTLs above the 24h cap are clamped.
    pub fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        let ttl = ttl
            .unwrap_or(self.config.default_ttl)
            .min(config::TTL_CAP);
        let mut store = self.lock();
        store.set(&self.config, key.to_string(), value, ttl);
    }

    /// Returns the stored value if it is fresh and shape-valid.
    pub fn get(&self, key: &str) -> Option<Found> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        let found = {
            let mut store = self.lock();
            store.get(&self.config, key)
        };
        match &found {
            Some(_) => {
                metrics::counter!("cache_hits_total", "cache" => self.config.name.clone())
                    .increment(1);
                self.config.listeners.emit(&Ev::Hit {
                    name: self.config.name.clone(),
                    key: key.to_string(),
                });
            }
            None => {
                metrics::counter!("cache_misses_total", "cache" => self.config.name.clone())
                    .increment(1);
                self.config.listeners.emit(&Ev::Miss {
                    name: self.config.name.clone(),
                    key: key.to_string(),
                });
            }
        }
        found
    }

    /// TTL-ignoring read used only on the degradation path (breaker open or
    /// fetch exhausted). Never served while a fresh value is obtainable.
    pub fn get_stale(&self, key: &str) -> Option<Found> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        let mut store = self.lock();
        store.get_stale(&self.config, key)
    }

    /// Removes a key. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        self.lock().delete(key)
    }

    /// Drops every entry. Counters are preserved.
    pub fn clear(&self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        self.lock().clear();
    }

    /// Removes entries expired past the stale-retention window, returning
    /// how many were dropped.
    pub fn evict_expired(&self) -> usize {
        if self.closed.load(Ordering::Acquire) {
            return 0;
        }
        let removed = {
            let mut store = self.lock();
            store.evict_expired(&self.config)
        };
        if removed > 0 {
            tracing::debug!(cache = %self.config.name, removed, "evicted expired entries");
            self.config.listeners.emit(&Ev::Swept {
                name: self.config.name.clone(),
                removed,
            });
        }
        removed
    }

    /// Consistent snapshot of the counters. Readable after shutdown.
    pub fn stats(&self) -> CacheStats {
        let store = self.lock();
        CacheStats {
            hits: store.counters.hits,
            misses: store.counters.misses,
            evictions: store.counters.evictions,
            corruption_events: store.counters.corruption_events,
            entries: store.len(),
            memory_usage_estimate: store.mem_used,
            uptime_seconds: self.started.elapsed().as_secs(),
            hit_rate: CacheStats::hit_rate_of(store.counters.hits, store.counters.misses),
        }
    }

    /// Marks the cache closed. Subsequent operations return
    /// not-found / no-op without error.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        tracing::info!(cache = %self.config.name, "cache shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// How long shutdown should wait for an in-flight sweep to finish.
    pub fn shutdown_grace(&self) -> Duration {
        self.config.shutdown_grace
    }

    pub(crate) fn cleanup_interval(&self) -> Duration {
        self.config.cleanup_interval
    }

    pub(crate) fn name(&self) -> &str {
        &self.config.name
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        // A poisoned mutex means a panic mid-operation; the data is a plain
        // map of owned values, so continuing with it is sound.
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
