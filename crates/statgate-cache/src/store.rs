//! The mutex-guarded inner store: LRU map, memory accounting, counters.

use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::events::{CacheEvent, EvictionReason};
use chrono::{DateTime, Utc};
use lru::LruCache;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub corruption_events: u64,
}

/// A value successfully read from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Found {
    pub value: Value,
    /// Wall-clock time the entry was written, for `data_sources` envelopes.
    pub stored_at: DateTime<Utc>,
}

pub(crate) struct Store {
    map: LruCache<String, CacheEntry>,
    pub(crate) mem_used: usize,
    pub(crate) counters: Counters,
}

impl Store {
    pub(crate) fn new() -> Self {
        Self {
            map: LruCache::unbounded(),
            mem_used: 0,
            counters: Counters::default(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// Looks up a fresh, shape-valid entry.
    ///
    /// An expired entry is a miss but stays in the store: the gateway's
    /// degradation path may still serve it through [`Store::get_stale`]
    /// until the sweeper reaps it. Corrupt entries are quarantined
    /// immediately; they are never served in any form.
    pub(crate) fn get(&mut self, config: &CacheConfig, key: &str) -> Option<Found> {
        let freshness = match self.map.peek(key) {
            None => {
                self.counters.misses += 1;
                return None;
            }
            Some(entry) => !entry.is_expired(),
        };

        if !freshness {
            metrics::counter!("cache_expired_reads_total", "cache" => config.name.clone())
                .increment(1);
            self.counters.misses += 1;
            return None;
        }

        if !self.shape_ok(config, key) {
            self.quarantine(key, config);
            self.counters.misses += 1;
            return None;
        }

        // Touch both the LRU order and the access timestamp.
        let entry = self.map.get_mut(key)?;
        entry.touch();
        self.counters.hits += 1;
        Some(Found {
            value: entry.value.clone(),
            stored_at: entry.stored_at,
        })
    }

    /// TTL-ignoring read for the degradation path. Shape validation still
    /// applies; corrupt data is never served, stale or not. Does not count
    /// as a hit or miss and does not disturb the LRU order.
    pub(crate) fn get_stale(&mut self, config: &CacheConfig, key: &str) -> Option<Found> {
        if self.map.peek(key).is_none() {
            return None;
        }
        if !self.shape_ok(config, key) {
            self.quarantine(key, config);
            return None;
        }
        let entry = self.map.peek(key)?;
        Some(Found {
            value: entry.value.clone(),
            stored_at: entry.stored_at,
        })
    }

    /// Inserts and enforces both the entry-count and the memory bound,
    /// evicting least-recently-accessed entries until back under.
    pub(crate) fn set(&mut self, config: &CacheConfig, key: String, value: Value, ttl: Duration) {
        let entry = CacheEntry::new(&key, value, ttl);
        let added = entry.size_estimate;
        if let Some((_, old)) = self.map.push(key, entry) {
            self.mem_used -= old.size_estimate;
        }
        self.mem_used += added;

        while self.map.len() > config.max_entries {
            if !self.evict_lru(config) {
                break;
            }
        }
        while self.mem_used > config.max_memory_bytes && self.map.len() > 1 {
            if !self.evict_lru(config) {
                break;
            }
        }

        metrics::gauge!("cache_entries", "cache" => config.name.clone()).set(self.map.len() as f64);
        metrics::gauge!("cache_memory_bytes", "cache" => config.name.clone())
            .set(self.mem_used as f64);
    }

    pub(crate) fn delete(&mut self, key: &str) -> bool {
        if let Some(old) = self.map.pop(key) {
            self.mem_used -= old.size_estimate;
            true
        } else {
            false
        }
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.mem_used = 0;
    }

    /// Removes entries expired past the stale-retention window, returning
    /// how many were dropped. Entries inside the window stay reachable for
    /// stale serves.
    pub(crate) fn evict_expired(&mut self, config: &CacheConfig) -> usize {
        let reapable: Vec<String> = self
            .map
            .iter()
            .filter(|(_, entry)| entry.created.elapsed() > entry.ttl + config.stale_retention)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &reapable {
            self.remove(key, config, EvictionReason::Expired);
        }
        reapable.len()
    }

    fn evict_lru(&mut self, config: &CacheConfig) -> bool {
        if let Some((key, old)) = self.map.pop_lru() {
            self.mem_used -= old.size_estimate;
            self.counters.evictions += 1;
            self.emit_eviction(config, &key, EvictionReason::LruPressure);
            true
        } else {
            false
        }
    }

    fn remove(&mut self, key: &str, config: &CacheConfig, reason: EvictionReason) {
        if let Some(old) = self.map.pop(key) {
            self.mem_used -= old.size_estimate;
            self.counters.evictions += 1;
            self.emit_eviction(config, key, reason);
        }
    }

    fn quarantine(&mut self, key: &str, config: &CacheConfig) {
        self.counters.corruption_events += 1;
        tracing::warn!(
            cache = %config.name,
            key = %statgate_core::redact_key(key),
            "cache entry failed shape validation, quarantined"
        );
        metrics::counter!("cache_corruption_events_total", "cache" => config.name.clone())
            .increment(1);
        self.remove(key, config, EvictionReason::Corruption);
    }

    fn shape_ok(&self, config: &CacheConfig, key: &str) -> bool {
        let namespace = key.split(':').next().unwrap_or(key);
        match (config.validators.get(namespace), self.map.peek(key)) {
            (Some(validate), Some(entry)) => validate(&entry.value),
            _ => true,
        }
    }

    fn emit_eviction(&self, config: &CacheConfig, key: &str, reason: EvictionReason) {
        metrics::counter!(
            "cache_evictions_total",
            "cache" => config.name.clone(),
            "reason" => reason.label()
        )
        .increment(1);
        config.listeners.emit(&CacheEvent::Evicted {
            name: config.name.clone(),
            key: key.to_string(),
            reason,
        });
    }
}
