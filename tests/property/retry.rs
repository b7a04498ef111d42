//! Invariants tested:
//! - the operation runs at most max_attempts times
//! - success stops further attempts
//! - non-retryable errors run the operation exactly once

use proptest::prelude::*;
use statgate_core::ErrorClass;
use statgate_retry::RetryPolicy;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::builder()
        .max_attempts(max_attempts)
        .base_delay(Duration::from_millis(1))
        .jitter(false)
        .build()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn never_exceeds_max_attempts(max_attempts in 1u32..8) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let calls = Arc::new(AtomicU32::new(0));
            let c = Arc::clone(&calls);
            let token = CancellationToken::new();

            let result: Result<(), _> = policy(max_attempts)
                .execute(&token, move |_| {
                    let c = Arc::clone(&c);
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        Err(ErrorClass::Upstream(500))
                    }
                })
                .await;

            prop_assert!(result.is_err());
            prop_assert_eq!(calls.load(Ordering::SeqCst), max_attempts);
            Ok(())
        })?;
    }

    #[test]
    fn stops_at_first_success(
        max_attempts in 2u32..8,
        succeed_on in 0u32..8,
    ) {
        if succeed_on >= max_attempts {
            return Ok(());
        }
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let calls = Arc::new(AtomicU32::new(0));
            let c = Arc::clone(&calls);
            let token = CancellationToken::new();

            let result = policy(max_attempts)
                .execute(&token, move |_| {
                    let c = Arc::clone(&c);
                    async move {
                        if c.fetch_add(1, Ordering::SeqCst) >= succeed_on {
                            Ok(())
                        } else {
                            Err(ErrorClass::Timeout)
                        }
                    }
                })
                .await;

            prop_assert!(result.is_ok());
            prop_assert_eq!(calls.load(Ordering::SeqCst), succeed_on + 1);
            Ok(())
        })?;
    }

    #[test]
    fn non_retryable_runs_once(max_attempts in 1u32..8) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let calls = Arc::new(AtomicU32::new(0));
            let c = Arc::clone(&calls);
            let token = CancellationToken::new();

            let result: Result<(), _> = policy(max_attempts)
                .execute(&token, move |_| {
                    let c = Arc::clone(&c);
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        Err(ErrorClass::Validation("no".into()))
                    }
                })
                .await;

            prop_assert!(result.is_err());
            prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
            Ok(())
        })?;
    }
}
