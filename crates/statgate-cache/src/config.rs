//! Cache configuration.

use crate::events::CacheEvent;
use serde_json::Value;
use statgate_core::Listeners;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Shape validator for one namespace. Returns false when the stored payload
/// no longer matches the shape registered for that namespace.
pub type ShapeValidator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

pub(crate) const DEFAULT_MAX_ENTRIES: usize = 10_000;
pub(crate) const MAX_ENTRIES_CAP: usize = 100_000;
pub(crate) const DEFAULT_MAX_MEMORY: usize = 100 * 1024 * 1024;
pub(crate) const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub(crate) const TTL_CAP: Duration = Duration::from_secs(24 * 60 * 60);
pub(crate) const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(30);
pub(crate) const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(10);
pub(crate) const DEFAULT_STALE_RETENTION: Duration = Duration::from_secs(60 * 60);

/// Configuration for a [`crate::Cache`].
pub struct CacheConfig {
    pub(crate) name: String,
    pub(crate) max_entries: usize,
    pub(crate) max_memory_bytes: usize,
    pub(crate) default_ttl: Duration,
    pub(crate) cleanup_interval: Duration,
    pub(crate) shutdown_grace: Duration,
    /// How long an expired entry stays reachable for stale serves before
    /// the sweeper reaps it.
    pub(crate) stale_retention: Duration,
    pub(crate) validators: HashMap<String, ShapeValidator>,
    pub(crate) listeners: Listeners<CacheEvent>,
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }
}

/// Builder for [`CacheConfig`]. Out-of-range values are clamped with a
/// warning rather than rejected; the cache must come up with whatever the
/// environment handed it.
pub struct CacheConfigBuilder {
    name: String,
    max_entries: usize,
    max_memory_bytes: usize,
    default_ttl: Duration,
    cleanup_interval: Duration,
    shutdown_grace: Duration,
    stale_retention: Duration,
    validators: HashMap<String, ShapeValidator>,
    listeners: Listeners<CacheEvent>,
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        Self {
            name: String::from("cache"),
            max_entries: DEFAULT_MAX_ENTRIES,
            max_memory_bytes: DEFAULT_MAX_MEMORY,
            default_ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            shutdown_grace: Duration::from_secs(5),
            stale_retention: DEFAULT_STALE_RETENTION,
            validators: HashMap::new(),
            listeners: Listeners::new(),
        }
    }

    /// Human-readable name for logs and events. Default: `cache`.
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Maximum live entries before LRU eviction. Default 10_000, hard cap 100_000.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Estimated memory bound in bytes. Default ~100MB.
    pub fn max_memory_bytes(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = bytes;
        self
    }

    /// TTL applied when `set` is called without one. Default 5 minutes, cap 24h.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Background sweep interval. Default 30s, minimum 10s.
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// How long shutdown waits for the sweeper to finish a tick.
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// How long expired entries remain available to `get_stale` before the
    /// sweeper reaps them. Default: 1 hour. Zero disables stale retention.
    pub fn stale_retention(mut self, retention: Duration) -> Self {
        self.stale_retention = retention;
        self
    }

    /// Registers a shape validator for a namespace. Entries under that
    /// namespace that fail the check on retrieval are quarantined and
    /// counted as corruption events.
    pub fn validator<N, F>(mut self, namespace: N, validate: F) -> Self
    where
        N: Into<String>,
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validators.insert(namespace.into(), Arc::new(validate));
        self
    }

    /// Register a callback for eviction events.
    pub fn on_eviction<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, crate::events::EvictionReason) + Send + Sync + 'static,
    {
        self.listeners
            .add(statgate_core::FnListener::new(move |event: &CacheEvent| {
                if let CacheEvent::Evicted { key, reason, .. } = event {
                    f(key, *reason);
                }
            }));
        self
    }

    /// Register a listener for every cache event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        self.listeners.add(statgate_core::FnListener::new(f));
        self
    }

    pub fn build(self) -> CacheConfig {
        let max_entries = clamp_usize("max_entries", self.max_entries, 1, MAX_ENTRIES_CAP);
        let max_memory_bytes =
            clamp_usize("max_memory_bytes", self.max_memory_bytes, 1024, usize::MAX);
        let default_ttl = clamp_duration("default_ttl", self.default_ttl, Duration::from_secs(1), TTL_CAP);
        let cleanup_interval = clamp_duration(
            "cleanup_interval",
            self.cleanup_interval,
            MIN_CLEANUP_INTERVAL,
            Duration::from_secs(3600),
        );

        CacheConfig {
            name: self.name,
            max_entries,
            max_memory_bytes,
            default_ttl,
            cleanup_interval,
            shutdown_grace: self.shutdown_grace,
            stale_retention: self.stale_retention.min(TTL_CAP),
            validators: self.validators,
            listeners: self.listeners,
        }
    }
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_usize(field: &str, value: usize, min: usize, max: usize) -> usize {
    if value < min || value > max {
        let clamped = value.clamp(min, max);
        tracing::warn!(field, value, clamped, "cache config value out of range, clamping");
        clamped
    } else {
        value
    }
}

fn clamp_duration(field: &str, value: Duration, min: Duration, max: Duration) -> Duration {
    if value < min || value > max {
        let clamped = value.clamp(min, max);
        tracing::warn!(
            field,
            value_secs = value.as_secs(),
            clamped_secs = clamped.as_secs(),
            "cache config value out of range, clamping"
        );
        clamped
    } else {
        value
    }
}
