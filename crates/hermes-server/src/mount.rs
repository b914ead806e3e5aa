//! Service mounting.
//!
//! A service implementation groups the handlers of one API surface. To mount
//! it, implement [`Mountable`]: declare the base path and register each
//! endpoint with a closure that calls the matching method. The list is
//! written out by hand and built once at registration time.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hermes_core::{Endpoint, EndpointDescriptor, HermesResult, ServiceContext};
//! use hermes_server::{Mountable, RegistrationError, RouteGroup, RouteRegistrar};
//!
//! struct Ping;
//!
//! impl Endpoint for Ping {
//!     type Input = ();
//!     type Output = String;
//!
//!     fn descriptor() -> EndpointDescriptor {
//!         EndpointDescriptor::get("ping", "/ping")
//!     }
//! }
//!
//! struct StatusService {
//!     name: String,
//! }
//!
//! impl StatusService {
//!     async fn ping(&self, _ctx: ServiceContext) -> HermesResult<String> {
//!         Ok(format!("{} is up", self.name))
//!     }
//! }
//!
//! impl Mountable for StatusService {
//!     fn base_path(&self) -> &str {
//!         "/status"
//!     }
//!
//!     fn routes(self: Arc<Self>, routes: &mut RouteGroup<'_>) -> Result<(), RegistrationError> {
//!         routes.register::<Ping, _, _>(move |ctx, ()| {
//!             let service = Arc::clone(&self);
//!             async move { service.ping(ctx).await }
//!         })?;
//!         Ok(())
//!     }
//! }
//!
//! let mut registrar = RouteRegistrar::new();
//! registrar.mount(StatusService { name: "hermes".into() }).unwrap();
//! assert_eq!(registrar.len(), 1);
//! ```

use std::sync::Arc;

use crate::registrar::{RegistrationError, RouteGroup};

/// A service that registers its own endpoints.
pub trait Mountable: Send + Sync + 'static {
    /// Path prefix for every endpoint of the service.
    fn base_path(&self) -> &str;

    /// Registers each endpoint of the service into `routes`.
    ///
    /// `routes` is already scoped to [`base_path`](Self::base_path).
    fn routes(self: Arc<Self>, routes: &mut RouteGroup<'_>) -> Result<(), RegistrationError>;
}
