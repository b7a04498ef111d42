//! Backoff interval computation.

use rand::Rng;
use std::time::Duration;

/// Strategy for the delay before retry attempt `n` (zero-based).
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed(Duration),
    /// `base · multiplier^attempt`, capped at `max`.
    Exponential {
        base: Duration,
        multiplier: f64,
        max: Duration,
    },
}

impl Backoff {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential {
                base,
                multiplier,
                max,
            } => {
                let factor = multiplier.powi(attempt as i32);
                let scaled = base.as_secs_f64() * factor;
                // Guard against overflow on absurd attempt counts.
                if !scaled.is_finite() || scaled >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::from_secs_f64(scaled)
                }
            }
        }
    }
}

/// Scales a delay by a uniform factor in `[0.5, 1.0]` so synchronized
/// callers spread their retries.
pub(crate) fn apply_jitter(delay: Duration) -> Duration {
    if delay.is_zero() {
        return delay;
    }
    let factor: f64 = rand::rng().random_range(0.5..=1.0);
    delay.mul_f64(factor)
}
