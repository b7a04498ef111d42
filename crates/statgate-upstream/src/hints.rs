//! Rate-limit header parsing.
//!
//! `Retry-After` carries delta seconds or an HTTP-date. `X-RateLimit-Reset`
//! is nominally epoch seconds, but some deployments send deltas; values
//! below 10^6 are treated as delta seconds (10^6 epoch seconds is early
//! 1970, which no live reset timestamp can be).

use chrono::DateTime;
use statgate_core::RetryHint;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const EPOCH_THRESHOLD: u64 = 1_000_000;

/// Parses a `Retry-After` header value: seconds or HTTP-date.
/// Zero and malformed values yield `None` so callers fall back to
/// exponential backoff.
pub fn parse_retry_after(value: &str) -> Option<RetryHint> {
    let trimmed = value.trim();
    if let Ok(secs) = trimmed.parse::<u64>() {
        return (secs > 0).then_some(RetryHint::Delta(Duration::from_secs(secs)));
    }
    let date = DateTime::parse_from_rfc2822(trimmed).ok()?;
    let at = UNIX_EPOCH + Duration::from_secs(u64::try_from(date.timestamp()).ok()?);
    (at > SystemTime::now()).then_some(RetryHint::Until(at))
}

/// Parses an `X-RateLimit-Reset` header value: epoch seconds, or delta
/// seconds below the threshold.
pub fn parse_rate_limit_reset(value: &str) -> Option<RetryHint> {
    let secs = value.trim().parse::<u64>().ok()?;
    if secs == 0 {
        return None;
    }
    if secs < EPOCH_THRESHOLD {
        Some(RetryHint::Delta(Duration::from_secs(secs)))
    } else {
        let at = UNIX_EPOCH + Duration::from_secs(secs);
        (at > SystemTime::now()).then_some(RetryHint::Until(at))
    }
}

/// Combines the two headers; when both resolve, the larger delay wins.
pub fn combine(a: Option<RetryHint>, b: Option<RetryHint>) -> Option<RetryHint> {
    match (a, b) {
        (Some(a), Some(b)) => {
            if a.to_delay() >= b.to_delay() {
                Some(a)
            } else {
                Some(b)
            }
        }
        (a, b) => a.or(b),
    }
}
