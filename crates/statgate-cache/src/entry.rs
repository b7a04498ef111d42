//! Cache entries and TTL bookkeeping.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::{Duration, Instant};

/// A stored payload plus the bookkeeping the store needs for TTL checks,
/// LRU accounting, and memory estimation.
#[derive(Clone, Debug)]
pub(crate) struct CacheEntry {
    pub(crate) value: Value,
    pub(crate) created: Instant,
    pub(crate) stored_at: DateTime<Utc>,
    pub(crate) ttl: Duration,
    pub(crate) accessed: Instant,
    pub(crate) size_estimate: usize,
}

impl CacheEntry {
    pub(crate) fn new(key: &str, value: Value, ttl: Duration) -> Self {
        let now = Instant::now();
        let size_estimate = estimate_size(key, &value);
        Self {
            value,
            created: now,
            stored_at: Utc::now(),
            ttl,
            accessed: now,
            size_estimate,
        }
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.created.elapsed() > self.ttl
    }

    pub(crate) fn touch(&mut self) {
        self.accessed = Instant::now();
    }
}

/// Rough per-entry memory footprint: serialized payload plus key bytes and
/// a fixed allowance for the entry struct itself.
pub(crate) fn estimate_size(key: &str, value: &Value) -> usize {
    const ENTRY_OVERHEAD: usize = 96;
    let body = serde_json::to_string(value).map(|s| s.len()).unwrap_or(0);
    body + key.len() + ENTRY_OVERHEAD
}
