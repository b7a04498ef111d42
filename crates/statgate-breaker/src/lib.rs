//! Circuit breaker for the upstream statistics provider.
//!
//! One breaker guards one logical upstream dependency; the gateway shares a
//! single instance across every endpoint of that provider.
//!
//! ## States
//! - **Closed**: calls pass; consecutive tripping failures count toward the
//!   trip threshold, and any success resets the count
//! - **Open**: calls are rejected until a jittered reset timeout elapses
//! - **Half-open**: a bounded number of concurrent probes; enough
//!   consecutive successes close the circuit, any tripping failure reopens
//!   it and restarts the timer
//!
//! ```
//! use statgate_breaker::{Breaker, BreakerConfig, CircuitState};
//! use statgate_core::ErrorClass;
//! use std::time::Duration;
//!
//! let breaker = Breaker::new(
//!     BreakerConfig::builder()
//!         .name("provider")
//!         .max_failures(5)
//!         .reset_timeout(Duration::from_secs(60))
//!         .build(),
//! );
//!
//! if breaker.try_acquire().is_ok() {
//!     // ... perform the upstream call ...
//!     breaker.record_failure(&ErrorClass::Timeout);
//! }
//! assert_eq!(breaker.state_sync(), CircuitState::Closed);
//! ```

mod circuit;
mod config;
mod events;

pub use circuit::{BreakerMetrics, CircuitState};
pub use config::{BreakerConfig, BreakerConfigBuilder};
pub use events::BreakerEvent;

use circuit::Circuit;
use statgate_core::ErrorClass;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Why a call was not permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The circuit is open; the next probe is `retry_in` away.
    #[error("circuit open; next probe in {retry_in:?}")]
    Open { retry_in: Duration },

    /// Half-open and all probe permits are in flight.
    #[error("circuit half-open; probe permits exhausted")]
    Saturated,

    /// The process is shutting down.
    #[error("breaker shut down")]
    ShuttingDown,
}

/// A circuit breaker guarding one upstream dependency.
///
/// Operations are serialized by a single lock; the current state is
/// mirrored into an atomic so handlers and metrics can read it without
/// locking.
pub struct Breaker {
    config: BreakerConfig,
    circuit: Mutex<Circuit>,
    state_atomic: Arc<AtomicU8>,
    closed: AtomicBool,
}

impl Breaker {
    pub fn new(config: BreakerConfig) -> Self {
        let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
        Self {
            config,
            circuit: Mutex::new(Circuit::new(Arc::clone(&state_atomic))),
            state_atomic,
            closed: AtomicBool::new(false),
        }
    }

    /// Requests a permit for one upstream call.
    ///
    /// In Open state this is also where the time-driven transition to
    /// HalfOpen happens; the lock guarantees exactly one caller performs it.
    pub fn try_acquire(&self) -> Result<(), Rejection> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Rejection::ShuttingDown);
        }
        self.lock().try_acquire(&self.config)
    }

    /// Records a successful upstream call.
    pub fn record_success(&self) {
        self.lock().record_success(&self.config);
    }

    /// Records a failed upstream call. Errors the classifier deems
    /// permanent (validation, not-found) are ignored.
    pub fn record_failure(&self, error: &ErrorClass) {
        let trips = (self.config.classifier)(error);
        self.lock().record_failure(&self.config, trips);
    }

    /// Current state, read under the lock.
    pub fn state(&self) -> CircuitState {
        self.lock().state()
    }

    /// Current state from the atomic mirror; safe in sync contexts
    /// (handlers, metric scrapes) without touching the lock.
    pub fn state_sync(&self) -> CircuitState {
        CircuitState::from_u8(self.state_atomic.load(Ordering::Acquire))
    }

    /// Consistent snapshot for `/metrics` and `/api/cache/stats`.
    pub fn metrics(&self) -> BreakerMetrics {
        self.lock().metrics()
    }

    /// Forces the circuit open (operator control).
    pub fn force_open(&self) {
        self.lock().force_open(&self.config);
    }

    /// Resets to Closed and clears all counters.
    pub fn reset(&self) {
        self.lock().reset(&self.config);
    }

    /// After shutdown every `try_acquire` is rejected.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        tracing::info!(breaker = %self.config.name, "breaker shut down");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Circuit> {
        match self.circuit.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
