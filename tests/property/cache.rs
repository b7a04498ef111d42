//! Invariants tested:
//! - entries never exceed max_entries after any set sequence
//! - memory estimate never exceeds the configured bound
//! - a set followed by a get inside the TTL observes the value

use proptest::prelude::*;
use serde_json::json;
use statgate_cache::{Cache, CacheConfig};
use std::time::Duration;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn entry_bound_holds_for_any_set_sequence(
        keys in proptest::collection::vec(0u32..200, 1..300),
        max_entries in 1usize..64,
    ) {
        let cache = Cache::new(CacheConfig::builder().max_entries(max_entries).build());
        for key in keys {
            cache.set(&format!("ns:{key}"), json!({"k": key}), None);
            prop_assert!(cache.stats().entries <= max_entries);
        }
    }

    #[test]
    fn memory_bound_holds_for_any_payload_sizes(
        sizes in proptest::collection::vec(1usize..2048, 1..60),
    ) {
        let bound = 16 * 1024;
        let cache = Cache::new(CacheConfig::builder().max_memory_bytes(bound).build());
        for (i, size) in sizes.into_iter().enumerate() {
            cache.set(&format!("ns:{i}"), json!("x".repeat(size)), None);
            prop_assert!(cache.stats().memory_usage_estimate <= bound);
        }
    }

    #[test]
    fn set_then_get_observes_the_value(
        key in 0u32..50,
        payload in 0u64..1_000_000,
    ) {
        let cache = Cache::new(CacheConfig::builder().build());
        let key = format!("ns:{key}");
        cache.set(&key, json!(payload), Some(Duration::from_secs(300)));
        let found = cache.get(&key);
        prop_assert_eq!(found.map(|f| f.value), Some(json!(payload)));
    }
}
