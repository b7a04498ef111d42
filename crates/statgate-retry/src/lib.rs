//! Retry policy for upstream calls.
//!
//! Retries classified-retryable errors with exponential backoff and
//! optional jitter, honoring upstream rate-limit hints when the error
//! carries one. Sleeps race the caller's cancellation token so a dropped
//! request never keeps a worker pinned in a backoff.
//!
//! ```
//! use statgate_retry::RetryPolicy;
//! use statgate_core::ErrorClass;
//! use tokio_util::sync::CancellationToken;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), ErrorClass> {
//! let policy = RetryPolicy::builder()
//!     .max_attempts(3)
//!     .base_delay(Duration::from_millis(100))
//!     .build();
//!
//! let token = CancellationToken::new();
//! let value = policy
//!     .execute(&token, |_attempt| async { Ok::<_, ErrorClass>(42) })
//!     .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

mod backoff;
mod events;

pub use backoff::Backoff;
pub use events::RetryEvent;

use statgate_core::{ErrorClass, Listeners};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Upstream hints are never trusted past this ceiling, whatever
/// `max_delay` says.
const HINT_CEILING: Duration = Duration::from_secs(5 * 60);

/// Retry policy: owns attempt count, backoff shape, and jitter.
///
/// The policy holds no shared mutable state; one instance serves any
/// number of concurrent calls.
pub struct RetryPolicy {
    name: String,
    max_attempts: u32,
    backoff: Backoff,
    max_delay: Duration,
    jitter_enabled: bool,
    listeners: Listeners<RetryEvent>,
}

impl RetryPolicy {
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::new()
    }

    /// Runs `op` until it succeeds, the error is not retryable, attempts
    /// are exhausted, or `token` is cancelled.
    ///
    /// `op` receives the zero-based attempt index.
    pub async fn execute<T, F, Fut>(
        &self,
        token: &CancellationToken,
        mut op: F,
    ) -> Result<T, ErrorClass>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ErrorClass>>,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            if token.is_cancelled() {
                return Err(ErrorClass::Cancelled);
            }

            match op(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(retry = %self.name, attempts = attempt + 1, "succeeded after retries");
                    }
                    metrics::counter!("retry_calls_total", "retry" => self.name.clone(), "result" => "success")
                        .increment(1);
                    self.listeners.emit(&RetryEvent::Success {
                        name: self.name.clone(),
                        attempts: attempt + 1,
                    });
                    return Ok(value);
                }
                Err(error) => {
                    if !error.is_retryable() {
                        tracing::debug!(retry = %self.name, %error, "error not retryable, failing immediately");
                        self.listeners.emit(&RetryEvent::IgnoredError {
                            name: self.name.clone(),
                        });
                        return Err(error);
                    }

                    if attempt + 1 >= self.max_attempts {
                        tracing::warn!(retry = %self.name, attempts = attempt + 1, %error, "retry attempts exhausted");
                        metrics::counter!("retry_calls_total", "retry" => self.name.clone(), "result" => "exhausted")
                            .increment(1);
                        self.listeners.emit(&RetryEvent::Exhausted {
                            name: self.name.clone(),
                            attempts: attempt + 1,
                        });
                        return Err(error);
                    }

                    let (delay, hinted) = self.delay_for(attempt, &error);
                    tracing::debug!(
                        retry = %self.name,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        hinted,
                        "retrying after delay"
                    );
                    metrics::counter!("retry_attempts_total", "retry" => self.name.clone())
                        .increment(1);
                    self.listeners.emit(&RetryEvent::Retry {
                        name: self.name.clone(),
                        attempt,
                        delay,
                        hinted,
                        total_elapsed: started.elapsed(),
                    });

                    tokio::select! {
                        _ = token.cancelled() => {
                            self.listeners.emit(&RetryEvent::Cancelled {
                                name: self.name.clone(),
                                attempt,
                            });
                            return Err(ErrorClass::Cancelled);
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Computes the pre-jitter delay for the attempt that just failed,
    /// and whether it came from an upstream hint.
    ///
    /// A usable hint wins over the exponential schedule; zero or absent
    /// hints fall back to it. Hints are clamped to both `max_delay` and a
    /// five-minute absolute ceiling.
    fn delay_for(&self, attempt: u32, error: &ErrorClass) -> (Duration, bool) {
        let hint_delay = match error {
            ErrorClass::RateLimited { hint: Some(hint) } => {
                let delay = hint.to_delay();
                (!delay.is_zero()).then_some(delay)
            }
            _ => None,
        };

        let (base, hinted) = match hint_delay {
            Some(hint) => (hint.min(self.max_delay).min(HINT_CEILING), true),
            None => (self.backoff.delay_for(attempt).min(self.max_delay), false),
        };

        let delay = if self.jitter_enabled {
            backoff::apply_jitter(base)
        } else {
            base
        };
        (delay, hinted)
    }
}

/// Builder for [`RetryPolicy`].
pub struct RetryPolicyBuilder {
    name: String,
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter_enabled: bool,
    listeners: Listeners<RetryEvent>,
}

impl RetryPolicyBuilder {
    pub fn new() -> Self {
        Self {
            name: String::from("upstream"),
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter_enabled: true,
            listeners: Listeners::new(),
        }
    }

    /// Name used in logs, events, and metric labels. Default: `upstream`.
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Total attempts including the first call. Default: 3.
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    /// First backoff delay. Default: 100ms.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Ceiling for any computed delay. Default: 30s.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Exponential growth factor. Default: 2.0.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Whether delays are scaled by a uniform [0.5, 1.0] factor. Default: on.
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter_enabled = enabled;
        self
    }

    /// Register a callback invoked before each scheduled retry.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, Duration) + Send + Sync + 'static,
    {
        self.listeners
            .add(statgate_core::FnListener::new(move |event: &RetryEvent| {
                if let RetryEvent::Retry { attempt, delay, .. } = event {
                    f(*attempt, *delay);
                }
            }));
        self
    }

    /// Register a listener for every retry event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&RetryEvent) + Send + Sync + 'static,
    {
        self.listeners.add(statgate_core::FnListener::new(f));
        self
    }

    pub fn build(self) -> RetryPolicy {
        RetryPolicy {
            name: self.name,
            max_attempts: self.max_attempts,
            backoff: Backoff::Exponential {
                base: self.base_delay,
                multiplier: self.multiplier,
                max: self.max_delay,
            },
            max_delay: self.max_delay,
            jitter_enabled: self.jitter_enabled,
            listeners: self.listeners,
        }
    }
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
