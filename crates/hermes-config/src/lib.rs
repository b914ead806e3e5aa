//! Typed configuration for Hermes.
//!
//! [`HermesConfig`] holds four sections:
//!
//! - [`ServerSettings`]: bind address, shutdown timeout, error exposure
//! - [`CorsSettings`]: origins, methods and headers for the CORS middleware
//! - [`SseSettings`]: initial comment, keep-alive interval, retry hint
//! - [`LoggingSettings`]: filter directive and output format
//!
//! Unknown keys are rejected in every section. [`ConfigLoader`] layers
//! defaults, a TOML or JSON file, a `.env` file and environment variables.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! expose_internal_errors = false
//!
//! [cors]
//! allowed_origins = ["https://reader.example.com"]
//! allow_credentials = true
//!
//! [sse]
//! initial_comment = "connected"
//! keep_alive_secs = 15
//!
//! [logging]
//! level = "info,hermes_server=debug"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Variables use the form `PREFIX__SECTION__KEY`:
//!
//! - `HERMES__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `HERMES__CORS__ALLOWED_ORIGINS=https://a.example,https://b.example`
//! - `HERMES__SSE__KEEP_ALIVE_SECS=none`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{HermesConfig, HermesConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{CorsSettings, LogFormat, LoggingSettings, ServerSettings, SseSettings};
