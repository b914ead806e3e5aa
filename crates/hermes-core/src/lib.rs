//! # Hermes Core
//!
//! Core types shared by every Hermes crate:
//!
//! - [`HermesError`] - the single error type that converges domain, auth,
//!   decode, abort and uncategorized failures
//! - [`ErrorResponse`] - the `{ "errorCode", "message" }` wire body
//! - [`Endpoint`] / [`EndpointDescriptor`] - declared API operations
//! - [`ServiceContext`] / [`Identity`] - per-request authentication state
//! - [`Body`], [`Request`], [`Response`] - buffered or streaming HTTP bodies

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod context;
mod endpoint;
mod error;
mod identity;

pub use body::{Body, Request, Response};
pub use context::{RequestId, ServiceContext};
pub use endpoint::{AuthRequirement, Endpoint, EndpointDescriptor, EventStream, NoContent};
pub use error::{
    ApiError, AuthError, DecodeError, ErrorCategory, ErrorResponse, HermesError, HermesResult,
    ParamSource, ABORT_ERROR_CODE, INTERNAL_ERROR_CODE, INTERNAL_ERROR_MESSAGE,
};
pub use identity::Identity;
