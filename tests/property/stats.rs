//! Invariants tested:
//! - mapping the same inputs twice yields identical sequences
//! - the output is sorted by (category, weight, name)
//! - format_count round-trips through separator stripping
//! - grade decoding is pure

use proptest::prelude::*;
use statgate_model::{decode_grade, format_count, map_stats};
use std::collections::HashMap;

fn arbitrary_values() -> impl Strategy<Value = HashMap<String, f64>> {
    proptest::collection::hash_map(
        "[A-Za-z]{3,12}",
        0.0f64..1e9,
        0..40,
    )
    .prop_map(|m| {
        m.into_iter()
            .map(|(k, v)| (format!("DBD_{k}"), v))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(60))]

    #[test]
    fn mapping_is_deterministic(values in arbitrary_values()) {
        let schema = HashMap::new();
        prop_assert_eq!(map_stats(&schema, &values), map_stats(&schema, &values));
    }

    #[test]
    fn output_is_totally_ordered(values in arbitrary_values()) {
        let schema = HashMap::new();
        let records = map_stats(&schema, &values);
        for pair in records.windows(2) {
            let a = &pair[0];
            let b = &pair[1];
            let ka = (a.category as u8, a.sort_weight, a.display_name.clone());
            let kb = (b.category as u8, b.sort_weight, b.display_name.clone());
            prop_assert!(ka <= kb, "{ka:?} > {kb:?}");
        }
    }

    #[test]
    fn format_count_round_trips(n in 0u64..u64::MAX / 2) {
        let formatted = format_count(n);
        let parsed: u64 = formatted.replace(',', "").parse().unwrap();
        prop_assert_eq!(parsed, n);
    }

    #[test]
    fn grade_decode_is_pure(raw in 0u64..20_000, killer in any::<bool>()) {
        let field = if killer { "DBD_SlasherTierIncrement" } else { "DBD_UnlockRanking" };
        prop_assert_eq!(decode_grade(raw, field), decode_grade(raw, field));
    }
}
