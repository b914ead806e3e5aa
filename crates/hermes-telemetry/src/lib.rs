//! Logging setup for Hermes services.
//!
//! Hermes crates emit structured events through [`tracing`]. This crate turns
//! a [`LogConfig`] into an installed subscriber: JSON lines in production,
//! pretty output during development, filtered with `EnvFilter` directives.

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
