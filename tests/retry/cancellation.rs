use statgate_core::ErrorClass;
use statgate_retry::RetryPolicy;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn cancellation_wakes_a_long_backoff_sleep() {
    let policy = RetryPolicy::builder()
        .max_attempts(5)
        .base_delay(Duration::from_secs(300))
        .jitter(false)
        .build();
    let token = CancellationToken::new();

    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let started = tokio::time::Instant::now();
    let result: Result<(), _> = policy
        .execute(&token, |_| async { Err(ErrorClass::Upstream(500)) })
        .await;

    assert_eq!(result.unwrap_err(), ErrorClass::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn pre_cancelled_token_short_circuits() {
    let policy = RetryPolicy::builder().max_attempts(3).build();
    let token = CancellationToken::new();
    token.cancel();

    let result: Result<(), _> = policy
        .execute(&token, |_| async {
            panic!("operation must not run under a cancelled token")
        })
        .await;
    assert_eq!(result.unwrap_err(), ErrorClass::Cancelled);
}
