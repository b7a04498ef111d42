//! Retry observability events.

use statgate_core::Event;
use std::time::Duration;

/// Events emitted by [`crate::RetryPolicy::execute`].
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// A retry is about to be scheduled.
    Retry {
        name: String,
        /// Zero-based index of the attempt that just failed.
        attempt: u32,
        delay: Duration,
        /// True when the delay came from an upstream rate-limit hint.
        hinted: bool,
        total_elapsed: Duration,
    },
    /// The operation succeeded after `attempts` calls.
    Success { name: String, attempts: u32 },
    /// Every attempt failed; the last error is surfaced to the caller.
    Exhausted { name: String, attempts: u32 },
    /// The error was not retryable; failing immediately.
    IgnoredError { name: String },
    /// The caller's cancellation token fired during a backoff sleep.
    Cancelled { name: String, attempt: u32 },
}

impl Event for RetryEvent {
    fn kind(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "retry",
            RetryEvent::Success { .. } => "success",
            RetryEvent::Exhausted { .. } => "exhausted",
            RetryEvent::IgnoredError { .. } => "ignored_error",
            RetryEvent::Cancelled { .. } => "cancelled",
        }
    }

    fn component(&self) -> &str {
        match self {
            RetryEvent::Retry { name, .. }
            | RetryEvent::Success { name, .. }
            | RetryEvent::Exhausted { name, .. }
            | RetryEvent::IgnoredError { name }
            | RetryEvent::Cancelled { name, .. } => name,
        }
    }
}
