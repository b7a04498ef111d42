use statgate_core::ErrorClass;
use statgate_retry::RetryPolicy;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn exponential_delays_double_between_attempts() {
    let policy = RetryPolicy::builder()
        .max_attempts(4)
        .base_delay(Duration::from_millis(100))
        .multiplier(2.0)
        .jitter(false)
        .build();
    let token = CancellationToken::new();

    let started = tokio::time::Instant::now();
    let result: Result<(), _> = policy
        .execute(&token, |_| async { Err(ErrorClass::Upstream(502)) })
        .await;
    assert!(result.is_err());

    // 100ms + 200ms + 400ms of scheduled backoff.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(700), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(900), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn delays_are_capped_at_max_delay() {
    let policy = RetryPolicy::builder()
        .max_attempts(3)
        .base_delay(Duration::from_secs(10))
        .max_delay(Duration::from_secs(1))
        .multiplier(10.0)
        .jitter(false)
        .build();
    let token = CancellationToken::new();

    let started = tokio::time::Instant::now();
    let result: Result<(), _> = policy
        .execute(&token, |_| async { Err(ErrorClass::Timeout) })
        .await;
    assert!(result.is_err());

    // Two sleeps, both clamped to 1s.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_millis(2500));
}

#[tokio::test]
async fn attempt_indices_are_passed_to_the_operation() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let policy = RetryPolicy::builder()
        .max_attempts(3)
        .base_delay(Duration::from_millis(1))
        .jitter(false)
        .build();
    let token = CancellationToken::new();

    let s = Arc::clone(&seen);
    let _: Result<(), _> = policy
        .execute(&token, move |attempt| {
            let s = Arc::clone(&s);
            async move {
                s.lock().unwrap().push(attempt);
                Err(ErrorClass::Upstream(502))
            }
        })
        .await;

    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
}

#[tokio::test]
async fn jitter_keeps_delays_in_the_half_to_full_band() {
    // Exercised through the event stream: every scheduled delay must fall
    // in [base/2, base].
    let delays = Arc::new(std::sync::Mutex::new(Vec::new()));
    let d = Arc::clone(&delays);
    let policy = RetryPolicy::builder()
        .max_attempts(2)
        .base_delay(Duration::from_millis(64))
        .jitter(true)
        .on_retry(move |_, delay| d.lock().unwrap().push(delay))
        .build();

    for _ in 0..20 {
        let token = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let _: Result<(), _> = policy
            .execute(&token, move |_| {
                let c = Arc::clone(&c);
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(ErrorClass::Upstream(502))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;
    }

    let delays = delays.lock().unwrap();
    assert_eq!(delays.len(), 20);
    for delay in delays.iter() {
        assert!(*delay >= Duration::from_millis(32), "{delay:?}");
        assert!(*delay <= Duration::from_millis(64), "{delay:?}");
    }
}
