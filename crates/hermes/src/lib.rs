//! # Hermes
//!
//! **Contract-driven HTTP routing and middleware dispatch.**
//!
//! An API is described as a set of endpoint contracts: a name, a method, a
//! path template, an input type, an output type and whether the caller must
//! be authenticated. Hermes turns those contracts into HTTP routes, decodes
//! each request into the typed input, runs the middleware chain, calls the
//! handler with a [`ServiceContext`](core::ServiceContext) and encodes the
//! result as JSON, an empty 204, or a Server-Sent Events stream.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hermes::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct BookPath {
//!     book_id: String,
//! }
//!
//! struct GetBook;
//!
//! impl Endpoint for GetBook {
//!     type Input = Path<BookPath>;
//!     type Output = String;
//!
//!     fn descriptor() -> EndpointDescriptor {
//!         EndpointDescriptor::get("getBook", "/books/:bookId")
//!     }
//! }
//!
//! struct NoTokens;
//!
//! #[async_trait::async_trait]
//! impl TokenVerifier for NoTokens {
//!     async fn verify(&self, _token: &str) -> Result<Identity, AuthError> {
//!         Err(AuthError::InvalidToken("no tokens issued".into()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("HERMES").load()?;
//!     hermes::telemetry::init_logging(&config.logging.to_log_config())?;
//!
//!     let mut registrar = hermes::setup::registrar(&config);
//!     registrar
//!         .group("/v1")?
//!         .register::<GetBook, _, _>(|_ctx, Path(path)| async move { Ok(path.book_id) })?;
//!
//!     let app = registrar.into_app(hermes::setup::standard_chain(&config, NoTokens)?);
//!     hermes::setup::server(app, &config)?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → ErrorTranslation → RequestId → Cors → Auth → route → decode
//!                                                              ↓
//! Response ←──────────────────────────── encode ← handler(ServiceContext, Input)
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod setup;

pub use hermes_config as config;
pub use hermes_core as core;
pub use hermes_extract as extract;
pub use hermes_middleware as middleware;
pub use hermes_router as router;
pub use hermes_server as server;
pub use hermes_sse as sse;
pub use hermes_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use hermes_config::{ConfigLoader, HermesConfig};
    pub use hermes_core::{
        ApiError, AuthError, AuthRequirement, Endpoint, EndpointDescriptor, EventStream,
        HermesError, HermesResult, Identity, NoContent, RequestId, ServiceContext,
    };
    pub use hermes_extract::{Json, Path, Query, RawBody};
    pub use hermes_middleware::{
        AuthMiddleware, CorsMiddleware, ErrorTranslationMiddleware, MiddlewareChain,
        RequestIdMiddleware, TokenVerifier,
    };
    pub use hermes_server::{App, Mountable, RegistrationError, RouteGroup, RouteRegistrar, Server};
    pub use hermes_sse::{SseComment, SseConfig, SseEvent, SseItem};
}
