use serde_json::json;
use statgate_cache::{Cache, CacheConfig};
use std::time::Duration;

#[test]
fn entry_count_never_exceeds_the_bound() {
    let cache = Cache::new(CacheConfig::builder().max_entries(16).build());

    for i in 0..200 {
        cache.set(&format!("ns:{i}"), json!({"n": i}), None);
        assert!(cache.stats().entries <= 16);
    }
    assert_eq!(cache.stats().entries, 16);
}

#[test]
fn least_recently_read_entries_leave_first() {
    let cache = Cache::new(CacheConfig::builder().max_entries(3).build());
    cache.set("ns:a", json!(1), None);
    cache.set("ns:b", json!(2), None);
    cache.set("ns:c", json!(3), None);

    // Touch a and c so b is the eviction victim.
    cache.get("ns:a");
    cache.get("ns:c");
    cache.set("ns:d", json!(4), None);

    assert!(cache.get("ns:b").is_none());
    assert!(cache.get("ns:a").is_some());
    assert!(cache.get("ns:d").is_some());
}

#[test]
fn memory_bound_is_enforced() {
    let cache = Cache::new(
        CacheConfig::builder()
            .max_memory_bytes(8 * 1024)
            .build(),
    );

    for i in 0..64 {
        cache.set(&format!("ns:{i}"), json!("x".repeat(1024)), None);
        assert!(cache.stats().memory_usage_estimate <= 8 * 1024);
    }
}

#[test]
fn eviction_counter_moves_with_lru_pressure() {
    let cache = Cache::new(CacheConfig::builder().max_entries(2).build());
    for i in 0..5 {
        cache.set(&format!("ns:{i}"), json!(i), None);
    }
    assert_eq!(cache.stats().evictions, 3);
}

#[test]
fn sweep_reaps_only_past_retention() {
    let cache = Cache::new(
        CacheConfig::builder()
            .stale_retention(Duration::ZERO)
            .build(),
    );
    cache.set("ns:gone", json!(1), Some(Duration::from_millis(5)));
    cache.set("ns:kept", json!(2), Some(Duration::from_secs(600)));
    std::thread::sleep(Duration::from_millis(20));

    assert_eq!(cache.evict_expired(), 1);
    assert_eq!(cache.stats().entries, 1);
}
