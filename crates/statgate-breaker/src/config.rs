//! Breaker configuration.

use crate::events::BreakerEvent;
use crate::CircuitState;
use statgate_core::{ErrorClass, FnListener, Listeners};
use std::sync::Arc;
use std::time::Duration;

pub(crate) type FailureClassifier = Arc<dyn Fn(&ErrorClass) -> bool + Send + Sync>;

/// Configuration for a [`crate::Breaker`].
pub struct BreakerConfig {
    pub(crate) name: String,
    pub(crate) max_failures: u32,
    pub(crate) reset_timeout: Duration,
    pub(crate) half_open_max_calls: u32,
    pub(crate) success_threshold: u32,
    /// Fraction of `reset_timeout` used as symmetric jitter, so many
    /// breakers opened by the same outage do not probe in lockstep.
    pub(crate) jitter_ratio: f64,
    pub(crate) classifier: FailureClassifier,
    pub(crate) listeners: Listeners<BreakerEvent>,
}

impl BreakerConfig {
    pub fn builder() -> BreakerConfigBuilder {
        BreakerConfigBuilder::new()
    }
}

/// Builder for [`BreakerConfig`].
pub struct BreakerConfigBuilder {
    name: String,
    max_failures: u32,
    reset_timeout: Duration,
    half_open_max_calls: u32,
    success_threshold: u32,
    jitter_ratio: f64,
    classifier: FailureClassifier,
    listeners: Listeners<BreakerEvent>,
}

impl BreakerConfigBuilder {
    pub fn new() -> Self {
        Self {
            name: String::from("upstream"),
            max_failures: 5,
            reset_timeout: Duration::from_secs(60),
            half_open_max_calls: 3,
            success_threshold: 3,
            jitter_ratio: 0.1,
            classifier: Arc::new(ErrorClass::should_trip),
            listeners: Listeners::new(),
        }
    }

    /// Name used in logs, events, and metric labels. Default: `upstream`.
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Consecutive tripping failures before the circuit opens. Default: 5.
    pub fn max_failures(mut self, n: u32) -> Self {
        self.max_failures = n.max(1);
        self
    }

    /// How long the circuit stays open before probing. Default: 60s.
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }

    /// Concurrent probe permits in half-open. Default: 3.
    pub fn half_open_max_calls(mut self, n: u32) -> Self {
        self.half_open_max_calls = n.max(1);
        self
    }

    /// Consecutive probe successes required to close. Default: 3.
    pub fn success_threshold(mut self, n: u32) -> Self {
        self.success_threshold = n.max(1);
        self
    }

    /// Symmetric jitter applied to the reset timeout, as a fraction.
    /// Default: 0.1 (±10%). Zero disables jitter.
    pub fn jitter_ratio(mut self, ratio: f64) -> Self {
        self.jitter_ratio = ratio.clamp(0.0, 0.5);
        self
    }

    /// Overrides which error classes count against the breaker.
    ///
    /// Default: [`ErrorClass::should_trip`] — timeouts, network errors,
    /// rate limits, and upstream 5xx.
    pub fn failure_classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&ErrorClass) -> bool + Send + Sync + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Register a callback for state transitions.
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState, CircuitState) + Send + Sync + 'static,
    {
        self.listeners
            .add(FnListener::new(move |event: &BreakerEvent| {
                if let BreakerEvent::StateTransition { from, to, .. } = event {
                    f(*from, *to);
                }
            }));
        self
    }

    /// Register a callback for rejected calls.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners
            .add(FnListener::new(move |event: &BreakerEvent| {
                if matches!(event, BreakerEvent::CallRejected { .. }) {
                    f();
                }
            }));
        self
    }

    /// Register a listener for every breaker event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&BreakerEvent) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(f));
        self
    }

    pub fn build(self) -> BreakerConfig {
        BreakerConfig {
            name: self.name,
            max_failures: self.max_failures,
            reset_timeout: self.reset_timeout,
            half_open_max_calls: self.half_open_max_calls,
            success_threshold: self.success_threshold,
            jitter_ratio: self.jitter_ratio,
            classifier: self.classifier,
            listeners: self.listeners,
        }
    }
}

impl Default for BreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
