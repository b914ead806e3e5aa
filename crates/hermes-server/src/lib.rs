//! # Hermes Server
//!
//! Route registration, request dispatch and the HTTP server adapter.
//!
//! Building an application happens in two phases:
//!
//! 1. **Registration.** A [`RouteRegistrar`] collects endpoints, either one at
//!    a time, inside nested [`RouteGroup`]s, or by mounting a [`Mountable`]
//!    service. Templates are validated and conflicts are rejected here.
//! 2. **Serving.** [`RouteRegistrar::into_app`] freezes the table together
//!    with a middleware chain into an [`App`]. The app is immutable and can be
//!    handed to [`Server`] or driven directly with [`App::handle`].
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use hermes_core::{Endpoint, EndpointDescriptor};
//! use hermes_middleware::{MiddlewareChain, RequestIdMiddleware};
//! use hermes_server::RouteRegistrar;
//!
//! struct Health;
//!
//! impl Endpoint for Health {
//!     type Input = ();
//!     type Output = &'static str;
//!
//!     fn descriptor() -> EndpointDescriptor {
//!         EndpointDescriptor::get("health", "/health")
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let mut registrar = RouteRegistrar::new();
//! registrar.register::<Health, _, _>(|_ctx, ()| async { Ok("ok") }).unwrap();
//!
//! let chain = MiddlewareChain::builder().with(RequestIdMiddleware::new()).build();
//! let app = registrar.into_app(chain);
//!
//! let request = http::Request::get("/health").body(Bytes::new()).unwrap();
//! let response = app.handle(request).await;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod dispatch;
mod mount;
mod registrar;
mod server;
mod shutdown;

pub use app::App;
pub use dispatch::{DispatchUnit, ErasedHandler, HandlerFuture};
pub use mount::Mountable;
pub use registrar::{RegistrationError, RouteGroup, RouteRegistrar};
pub use server::{Server, ServerError, DEFAULT_MAX_BODY_SIZE, DEFAULT_SHUTDOWN_TIMEOUT};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
