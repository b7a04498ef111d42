use statgate_breaker::{Breaker, BreakerConfig, CircuitState, Rejection};
use statgate_core::ErrorClass;
use std::time::Duration;

fn half_open_breaker(max_calls: u32, success_threshold: u32) -> Breaker {
    let breaker = Breaker::new(
        BreakerConfig::builder()
            .name("halfopen")
            .max_failures(1)
            .reset_timeout(Duration::from_millis(20))
            .half_open_max_calls(max_calls)
            .success_threshold(success_threshold)
            .jitter_ratio(0.0)
            .build(),
    );
    breaker.record_failure(&ErrorClass::Upstream(500));
    std::thread::sleep(Duration::from_millis(40));
    breaker
}

#[test]
fn probe_permits_are_bounded() {
    let breaker = half_open_breaker(2, 5);

    assert!(breaker.try_acquire().is_ok());
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert!(breaker.try_acquire().is_ok());
    assert_eq!(breaker.try_acquire(), Err(Rejection::Saturated));
}

#[test]
fn completed_probes_free_their_permit() {
    let breaker = half_open_breaker(1, 5);

    assert!(breaker.try_acquire().is_ok());
    assert_eq!(breaker.try_acquire(), Err(Rejection::Saturated));

    breaker.record_success();
    assert!(breaker.try_acquire().is_ok());
}

#[test]
fn enough_successes_close_the_circuit() {
    let breaker = half_open_breaker(3, 3);

    for _ in 0..3 {
        breaker.try_acquire().unwrap();
        breaker.record_success();
    }
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert!(breaker.try_acquire().is_ok());
}

#[test]
fn one_failure_reopens_and_resets_the_timer() {
    let breaker = half_open_breaker(3, 3);

    breaker.try_acquire().unwrap();
    breaker.record_success();
    breaker.try_acquire().unwrap();
    breaker.record_failure(&ErrorClass::Timeout);

    assert_eq!(breaker.state(), CircuitState::Open);
    assert!(matches!(
        breaker.try_acquire(),
        Err(Rejection::Open { .. })
    ));
}

#[test]
fn successes_then_failure_do_not_close_early() {
    let breaker = half_open_breaker(3, 3);

    breaker.try_acquire().unwrap();
    breaker.record_success();
    breaker.try_acquire().unwrap();
    breaker.record_success();
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
}
