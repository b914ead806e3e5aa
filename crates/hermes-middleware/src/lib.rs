//! # Hermes Middleware
//!
//! Ordered, composable middleware for Hermes.
//!
//! A [`MiddlewareChain`] runs each registered [`Middleware`] in order around
//! the endpoint dispatcher. A middleware sees the request on the way in and
//! the result on the way out; it may short-circuit or propagate an error.
//! Errors turn into responses only in [`ErrorTranslationMiddleware`].
//!
//! ```text
//! Request → ErrorTranslation → RequestId → Cors → Auth → endpoint
//!                                                           ↓
//! Response ← ErrorTranslation ← RequestId ← Cors ← Auth ←───┘
//! ```
//!
//! ## Built-in Stages
//!
//! | Middleware | Name | Purpose |
//! |---|---|---|
//! | [`ErrorTranslationMiddleware`] | `error_translation` | Error to `{errorCode, message}` response |
//! | [`RequestIdMiddleware`] | `request_id` | Propagate or generate `X-Request-ID` |
//! | [`CorsMiddleware`] | `cors` | Preflight answers and CORS headers |
//! | [`AuthMiddleware`] | `auth` | Bearer token to [`hermes_core::Identity`] |
//!
//! Per-request state lives in the [`MiddlewareContext`] passed by `&mut`
//! through the chain.

#![doc(html_root_url = "https://docs.rs/hermes-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod context;
pub mod middleware;
pub mod stages;

pub use chain::{BoxedMiddleware, MiddlewareChain, MiddlewareChainBuilder};
pub use context::MiddlewareContext;
pub use hermes_core::{Request, Response};
pub use middleware::{BoxFuture, Endpoint, Middleware, Next};
pub use stages::{
    translate_error, AllowedOrigins, AuthMiddleware, CorsBuilder, CorsConfig, CorsMiddleware,
    ErrorTranslationMiddleware, RequestIdMiddleware, TokenVerifier, REQUEST_ID_HEADER,
};
