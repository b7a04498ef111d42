//! The breaker state machine.

use crate::config::BreakerConfig;
use crate::events::BreakerEvent;
use crate::Rejection;
use rand::Rng;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// State of the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    /// Normal operation; calls pass through.
    Closed = 0,
    /// Tripped; calls are rejected until the reset timeout elapses.
    Open = 1,
    /// Probing recovery with a bounded number of concurrent calls.
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl serde::Serialize for CircuitState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Point-in-time view of the breaker for handlers and `/metrics`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BreakerMetrics {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub half_open_successes: u32,
    /// Seconds until the next recovery probe is permitted, when Open.
    pub seconds_until_probe: Option<u64>,
    pub total_permitted: u64,
    pub total_rejected: u64,
    pub total_successes: u64,
    pub total_failures: u64,
}

pub(crate) struct Circuit {
    state: CircuitState,
    state_atomic: Arc<AtomicU8>,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
    /// Jittered instant at which Open may transition to HalfOpen.
    probe_at: Option<Instant>,
    half_open_in_flight: u32,
    half_open_successes: u32,
    total_permitted: u64,
    total_rejected: u64,
    total_successes: u64,
    total_failures: u64,
}

impl Circuit {
    pub(crate) fn new(state_atomic: Arc<AtomicU8>) -> Self {
        Self {
            state: CircuitState::Closed,
            state_atomic,
            consecutive_failures: 0,
            last_failure_at: None,
            probe_at: None,
            half_open_in_flight: 0,
            half_open_successes: 0,
            total_permitted: 0,
            total_rejected: 0,
            total_successes: 0,
            total_failures: 0,
        }
    }

    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    pub(crate) fn metrics(&self) -> BreakerMetrics {
        BreakerMetrics {
            state: self.state,
            consecutive_failures: self.consecutive_failures,
            half_open_successes: self.half_open_successes,
            seconds_until_probe: self.probe_at.and_then(|at| {
                let now = Instant::now();
                (at > now).then(|| (at - now).as_secs())
            }),
            total_permitted: self.total_permitted,
            total_rejected: self.total_rejected,
            total_successes: self.total_successes,
            total_failures: self.total_failures,
        }
    }

    pub(crate) fn try_acquire(&mut self, config: &BreakerConfig) -> Result<(), Rejection> {
        match self.state {
            CircuitState::Closed => {
                self.permit(config);
                Ok(())
            }
            CircuitState::Open => {
                let probe_at = self.probe_at.unwrap_or_else(Instant::now);
                let now = Instant::now();
                if now >= probe_at {
                    // Exactly one caller performs this transition; the lock
                    // serializes us and the state check above rules out
                    // re-entry.
                    self.transition_to(CircuitState::HalfOpen, config);
                    self.half_open_in_flight = 1;
                    self.permit(config);
                    Ok(())
                } else {
                    let retry_in = probe_at - now;
                    self.reject(config, Some(retry_in));
                    Err(Rejection::Open { retry_in })
                }
            }
            CircuitState::HalfOpen => {
                if self.half_open_in_flight < config.half_open_max_calls {
                    self.half_open_in_flight += 1;
                    self.permit(config);
                    Ok(())
                } else {
                    self.reject(config, None);
                    Err(Rejection::Saturated)
                }
            }
        }
    }

    pub(crate) fn record_success(&mut self, config: &BreakerConfig) {
        self.total_successes += 1;
        config.listeners.emit(&BreakerEvent::SuccessRecorded {
            name: config.name.clone(),
            state: self.state,
        });
        metrics::counter!("breaker_calls_total", "breaker" => config.name.clone(), "outcome" => "success")
            .increment(1);

        match self.state {
            CircuitState::Closed => {
                self.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                self.half_open_in_flight = self.half_open_in_flight.saturating_sub(1);
                self.half_open_successes += 1;
                if self.half_open_successes >= config.success_threshold {
                    self.transition_to(CircuitState::Closed, config);
                }
            }
            CircuitState::Open => {
                // A success can land here when the call was permitted in
                // HalfOpen and another probe already reopened the circuit.
                // The reopened timer stands.
            }
        }
    }

    pub(crate) fn record_failure(&mut self, config: &BreakerConfig, trips: bool) {
        if !trips {
            // Permanent errors (validation, not-found) say nothing about
            // the upstream's health.
            return;
        }
        self.total_failures += 1;
        self.last_failure_at = Some(Instant::now());
        config.listeners.emit(&BreakerEvent::FailureRecorded {
            name: config.name.clone(),
            state: self.state,
            consecutive_failures: self.consecutive_failures + 1,
        });
        metrics::counter!("breaker_calls_total", "breaker" => config.name.clone(), "outcome" => "failure")
            .increment(1);

        match self.state {
            CircuitState::Closed => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= config.max_failures {
                    self.open(config);
                }
            }
            CircuitState::HalfOpen => {
                self.half_open_in_flight = self.half_open_in_flight.saturating_sub(1);
                self.open(config);
            }
            CircuitState::Open => {}
        }
    }

    pub(crate) fn force_open(&mut self, config: &BreakerConfig) {
        self.open(config);
    }

    pub(crate) fn reset(&mut self, config: &BreakerConfig) {
        self.transition_to(CircuitState::Closed, config);
    }

    fn open(&mut self, config: &BreakerConfig) {
        self.transition_to(CircuitState::Open, config);
        self.probe_at = Some(Instant::now() + jittered(config.reset_timeout, config.jitter_ratio));
    }

    fn permit(&mut self, config: &BreakerConfig) {
        self.total_permitted += 1;
        config.listeners.emit(&BreakerEvent::CallPermitted {
            name: config.name.clone(),
            state: self.state,
        });
    }

    fn reject(&mut self, config: &BreakerConfig, retry_in: Option<Duration>) {
        self.total_rejected += 1;
        config.listeners.emit(&BreakerEvent::CallRejected {
            name: config.name.clone(),
            retry_in,
        });
        metrics::counter!("breaker_calls_total", "breaker" => config.name.clone(), "outcome" => "rejected")
            .increment(1);
    }

    fn transition_to(&mut self, state: CircuitState, config: &BreakerConfig) {
        if self.state == state {
            return;
        }
        let from = self.state;
        self.state = state;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.consecutive_failures = 0;
        self.half_open_in_flight = 0;
        self.half_open_successes = 0;
        if state != CircuitState::Open {
            self.probe_at = None;
        }

        tracing::info!(breaker = %config.name, from = from.as_str(), to = state.as_str(), "circuit state transition");
        metrics::counter!(
            "breaker_transitions_total",
            "breaker" => config.name.clone(),
            "from" => from.as_str(),
            "to" => state.as_str()
        )
        .increment(1);
        config.listeners.emit(&BreakerEvent::StateTransition {
            name: config.name.clone(),
            from,
            to: state,
        });
    }
}

fn jittered(base: Duration, ratio: f64) -> Duration {
    if ratio <= 0.0 {
        return base;
    }
    let factor = rand::rng().random_range((1.0 - ratio)..=(1.0 + ratio));
    base.mul_f64(factor)
}
