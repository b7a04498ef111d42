//! Core infrastructure for statgate.
//!
//! This crate provides the pieces shared by every other statgate crate:
//! - The closed error taxonomy ([`ErrorClass`]) with its retryability,
//!   circuit-trip, and HTTP mappings
//! - The event system used by the cache, breaker, and retry policy for
//!   observability
//! - Identifier redaction and request-id generation

pub mod error;
pub mod events;
pub mod ident;

pub use error::{ErrorClass, RetryHint};
pub use events::{Event, FnListener, Listener, Listeners};
pub use ident::{redact, redact_key, request_id};
