//! Breaker observability events.

use crate::CircuitState;
use statgate_core::Event;
use std::time::Duration;

/// Events emitted by [`crate::Breaker`].
#[derive(Debug, Clone)]
pub enum BreakerEvent {
    StateTransition {
        name: String,
        from: CircuitState,
        to: CircuitState,
    },
    CallPermitted {
        name: String,
        state: CircuitState,
    },
    CallRejected {
        name: String,
        retry_in: Option<Duration>,
    },
    SuccessRecorded {
        name: String,
        state: CircuitState,
    },
    FailureRecorded {
        name: String,
        state: CircuitState,
        consecutive_failures: u32,
    },
}

impl Event for BreakerEvent {
    fn kind(&self) -> &'static str {
        match self {
            BreakerEvent::StateTransition { .. } => "state_transition",
            BreakerEvent::CallPermitted { .. } => "call_permitted",
            BreakerEvent::CallRejected { .. } => "call_rejected",
            BreakerEvent::SuccessRecorded { .. } => "success_recorded",
            BreakerEvent::FailureRecorded { .. } => "failure_recorded",
        }
    }

    fn component(&self) -> &str {
        match self {
            BreakerEvent::StateTransition { name, .. }
            | BreakerEvent::CallPermitted { name, .. }
            | BreakerEvent::CallRejected { name, .. }
            | BreakerEvent::SuccessRecorded { name, .. }
            | BreakerEvent::FailureRecorded { name, .. } => name,
        }
    }
}
