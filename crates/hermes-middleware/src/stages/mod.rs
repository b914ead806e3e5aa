//! Built-in middleware stages.
//!
//! Register them in this order:
//!
//! 1. [`error_translation`] - turns errors into JSON error responses
//! 2. [`request_id`] - assigns and echoes the request ID
//! 3. [`cors`] - answers preflights and adds CORS headers
//! 4. [`auth`] - attaches a verified identity from a bearer token

pub mod auth;
pub mod cors;
pub mod error_translation;
pub mod request_id;

pub use auth::{AuthMiddleware, TokenVerifier};
pub use cors::{AllowedOrigins, CorsBuilder, CorsConfig, CorsMiddleware};
pub use error_translation::{translate_error, ErrorTranslationMiddleware};
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
