use serde_json::json;
use statgate_cache::{Cache, CacheConfig};
use std::time::Duration;

#[test]
fn value_is_served_inside_its_ttl() {
    let cache = Cache::new(CacheConfig::builder().build());
    cache.set("player_stats:a", json!({"pips": 10}), Some(Duration::from_secs(60)));

    let found = cache.get("player_stats:a").unwrap();
    assert_eq!(found.value, json!({"pips": 10}));
}

#[test]
fn value_is_not_found_after_its_ttl() {
    let cache = Cache::new(CacheConfig::builder().build());
    cache.set("player_stats:a", json!(1), Some(Duration::from_millis(20)));

    std::thread::sleep(Duration::from_millis(40));
    assert!(cache.get("player_stats:a").is_none());
}

#[test]
fn per_entry_ttls_are_independent() {
    let cache = Cache::new(CacheConfig::builder().build());
    cache.set("ns:short", json!(1), Some(Duration::from_millis(20)));
    cache.set("ns:long", json!(2), Some(Duration::from_secs(300)));

    std::thread::sleep(Duration::from_millis(40));
    assert!(cache.get("ns:short").is_none());
    assert_eq!(cache.get("ns:long").unwrap().value, json!(2));
}

#[test]
fn expired_entries_remain_reachable_as_stale() {
    let cache = Cache::new(CacheConfig::builder().build());
    cache.set("ns:a", json!({"old": true}), Some(Duration::from_millis(10)));
    std::thread::sleep(Duration::from_millis(30));

    assert!(cache.get("ns:a").is_none());
    let stale = cache.get_stale("ns:a").unwrap();
    assert_eq!(stale.value, json!({"old": true}));
}

#[test]
fn delete_then_get_misses() {
    let cache = Cache::new(CacheConfig::builder().build());
    cache.set("ns:a", json!(1), None);
    assert!(cache.delete("ns:a"));
    assert!(cache.get("ns:a").is_none());
    assert!(cache.get_stale("ns:a").is_none());
}
