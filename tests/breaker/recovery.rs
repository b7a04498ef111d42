use statgate_breaker::{Breaker, BreakerConfig, CircuitState, Rejection};
use statgate_core::ErrorClass;
use std::time::Duration;

fn tripped(reset: Duration) -> Breaker {
    let breaker = Breaker::new(
        BreakerConfig::builder()
            .name("recovery")
            .max_failures(1)
            .reset_timeout(reset)
            .jitter_ratio(0.0)
            .build(),
    );
    breaker.record_failure(&ErrorClass::Upstream(503));
    assert_eq!(breaker.state(), CircuitState::Open);
    breaker
}

#[test]
fn denies_for_the_whole_open_window() {
    let breaker = tripped(Duration::from_millis(300));
    let deadline = std::time::Instant::now() + Duration::from_millis(150);
    while std::time::Instant::now() < deadline {
        assert!(matches!(
            breaker.try_acquire(),
            Err(Rejection::Open { .. })
        ));
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn grants_a_probe_after_the_window() {
    let breaker = tripped(Duration::from_millis(40));
    std::thread::sleep(Duration::from_millis(60));

    assert!(breaker.try_acquire().is_ok());
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
}

#[test]
fn open_rejection_reports_time_until_probe() {
    let breaker = tripped(Duration::from_secs(60));
    match breaker.try_acquire() {
        Err(Rejection::Open { retry_in }) => {
            assert!(retry_in > Duration::from_secs(50));
            assert!(retry_in <= Duration::from_secs(60));
        }
        other => panic!("expected open rejection, got {other:?}"),
    }
}

#[test]
fn metrics_expose_the_probe_countdown() {
    let breaker = tripped(Duration::from_secs(60));
    let metrics = breaker.metrics();
    assert_eq!(metrics.state, CircuitState::Open);
    assert!(metrics.seconds_until_probe.unwrap() <= 60);
}
