//! The error taxonomy shared by every layer of the facade.
//!
//! The set is closed on purpose: handlers, the gateway, the retry policy,
//! and the breaker all branch on these classes, and the HTTP envelope
//! exposes them verbatim. Adding a variant means auditing all four.

use std::time::{Duration, SystemTime};
use thiserror::Error;

/// A delay hint extracted from upstream rate-limit headers.
///
/// `Retry-After` usually carries delta seconds (or an HTTP-date);
/// `X-RateLimit-Reset` carries epoch seconds. Both collapse to a duration
/// relative to the moment the response was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryHint {
    /// Wait this long before the next attempt.
    Delta(Duration),
    /// Wait until this wall-clock instant.
    Until(SystemTime),
}

impl RetryHint {
    /// Resolves the hint to a duration from now. An `Until` instant in the
    /// past resolves to zero, which callers treat as "no usable hint".
    pub fn to_delay(&self) -> Duration {
        match self {
            RetryHint::Delta(d) => *d,
            RetryHint::Until(at) => at
                .duration_since(SystemTime::now())
                .unwrap_or(Duration::ZERO),
        }
    }
}

/// Classified failure of an upstream call or of request handling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller's input was malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The requested resource does not exist upstream.
    #[error("not found: {0}")]
    NotFound(String),

    /// The upstream throttled us; may carry a delay hint from its headers.
    #[error("rate limited by upstream")]
    RateLimited { hint: Option<RetryHint> },

    /// The upstream answered with a 5xx status.
    #[error("upstream error (status {0})")]
    Upstream(u16),

    /// Connection-level failure (DNS, connect, reset, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The per-attempt deadline elapsed.
    #[error("upstream call timed out")]
    Timeout,

    /// The caller cancelled the operation (disconnect or overall deadline).
    #[error("operation cancelled")]
    Cancelled,

    /// A bug or unexpected condition inside the facade.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorClass {
    /// Whether the retry policy may attempt this call again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorClass::RateLimited { .. }
                | ErrorClass::Upstream(_)
                | ErrorClass::Network(_)
                | ErrorClass::Timeout
        )
    }

    /// Whether this failure counts against the circuit breaker.
    ///
    /// Validation and not-found are permanent with respect to the
    /// upstream's health; they never trip the circuit.
    pub fn should_trip(&self) -> bool {
        matches!(
            self,
            ErrorClass::RateLimited { .. }
                | ErrorClass::Upstream(_)
                | ErrorClass::Network(_)
                | ErrorClass::Timeout
        )
    }

    /// The stable `type` string of the HTTP error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            ErrorClass::Validation(_) => "validation_error",
            ErrorClass::NotFound(_) => "not_found",
            ErrorClass::RateLimited { .. } => "rate_limit",
            ErrorClass::Upstream(_) => "upstream_error",
            ErrorClass::Network(_) | ErrorClass::Timeout | ErrorClass::Cancelled => "network_error",
            ErrorClass::Internal(_) => "internal_error",
        }
    }

    /// HTTP status the envelope carries for this class.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorClass::Validation(_) => 400,
            ErrorClass::NotFound(_) => 404,
            ErrorClass::RateLimited { .. } => 429,
            ErrorClass::Upstream(_) => 502,
            ErrorClass::Network(_) | ErrorClass::Timeout | ErrorClass::Cancelled => 504,
            ErrorClass::Internal(_) => 500,
        }
    }

    /// The `retry_after` seconds surfaced in the envelope, when present.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            ErrorClass::RateLimited { hint } => {
                Some(hint.map(|h| h.to_delay().as_secs()).unwrap_or(1).max(1))
            }
            _ => None,
        }
    }
}
