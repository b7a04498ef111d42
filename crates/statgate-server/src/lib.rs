//! The statgate HTTP facade.
//!
//! Library surface for the `statgate` binary and the integration suite:
//! configuration, state wiring, routes, and the error envelope.

pub mod achievements;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ident;
pub mod request_id;
pub mod routes;
pub mod shutdown;
pub mod state;

pub use config::{AppConfig, ConfigError};
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
