//! Point-in-time cache statistics.

use serde::Serialize;

/// Consistent snapshot of the cache counters.
///
/// All counters are monotonic for the lifetime of the process; `hits` and
/// `misses` are read under the same lock so `hit_rate` is internally
/// consistent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Expired + LRU-pressure + corruption removals combined.
    pub evictions: u64,
    pub corruption_events: u64,
    /// Live entries at snapshot time.
    pub entries: usize,
    /// Estimated bytes held by live entries.
    pub memory_usage_estimate: usize,
    pub uptime_seconds: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    pub(crate) fn hit_rate_of(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
