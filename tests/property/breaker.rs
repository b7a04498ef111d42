//! Invariants tested:
//! - below max_failures consecutive failures, the circuit stays closed
//! - interleaved successes reset the consecutive count
//! - non-tripping errors never move the state

use proptest::prelude::*;
use statgate_breaker::{Breaker, BreakerConfig, CircuitState};
use statgate_core::ErrorClass;
use std::time::Duration;

fn breaker(max_failures: u32) -> Breaker {
    Breaker::new(
        BreakerConfig::builder()
            .max_failures(max_failures)
            .reset_timeout(Duration::from_secs(60))
            .jitter_ratio(0.0)
            .build(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn stays_closed_below_threshold(
        max_failures in 2u32..10,
        bursts in proptest::collection::vec(0u32..10, 1..20),
    ) {
        let breaker = breaker(max_failures);
        for burst in bursts {
            // Strictly fewer consecutive failures than the threshold,
            // then a success resetting the counter.
            for _ in 0..burst.min(max_failures - 1) {
                breaker.record_failure(&ErrorClass::Upstream(503));
            }
            breaker.record_success();
            prop_assert_eq!(breaker.state(), CircuitState::Closed);
        }
    }

    #[test]
    fn opens_only_at_threshold(
        max_failures in 1u32..10,
    ) {
        let breaker = breaker(max_failures);
        for i in 1..=max_failures {
            prop_assert_eq!(breaker.state(), CircuitState::Closed, "before failure {}", i);
            breaker.record_failure(&ErrorClass::Timeout);
        }
        prop_assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn permanent_errors_are_inert(
        count in 1u32..100,
    ) {
        let breaker = breaker(1);
        for _ in 0..count {
            breaker.record_failure(&ErrorClass::NotFound("gone".into()));
        }
        prop_assert_eq!(breaker.state(), CircuitState::Closed);
        prop_assert!(breaker.try_acquire().is_ok());
    }
}
