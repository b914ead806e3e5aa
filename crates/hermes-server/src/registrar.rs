//! Route registration.
//!
//! A [`RouteRegistrar`] binds endpoint contracts to handlers. Each
//! registration resolves the endpoint's full path (group prefixes plus the
//! descriptor's path), erases the typed handler into a dispatch unit and
//! inserts it into the router. Registration is the only time the route table
//! is mutated; [`RouteRegistrar::into_app`] freezes it.
//!
//! # Example
//!
//! ```
//! use hermes_core::{Endpoint, EndpointDescriptor, HermesResult, NoContent, ServiceContext};
//! use hermes_extract::Path;
//! use hermes_middleware::MiddlewareChain;
//! use hermes_server::RouteRegistrar;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct BookPath {
//!     book_id: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Book {
//!     id: String,
//! }
//!
//! struct GetBook;
//!
//! impl Endpoint for GetBook {
//!     type Input = Path<BookPath>;
//!     type Output = Book;
//!
//!     fn descriptor() -> EndpointDescriptor {
//!         EndpointDescriptor::get("getBook", "/books/:bookId")
//!     }
//! }
//!
//! struct DeleteBook;
//!
//! impl Endpoint for DeleteBook {
//!     type Input = Path<BookPath>;
//!     type Output = NoContent;
//!
//!     fn descriptor() -> EndpointDescriptor {
//!         EndpointDescriptor::delete("deleteBook", "/books/:bookId").require_auth()
//!     }
//! }
//!
//! # fn main() -> Result<(), hermes_server::RegistrationError> {
//! let mut registrar = RouteRegistrar::new();
//! let mut v1 = registrar.group("/v1")?;
//! v1.register::<GetBook, _, _>(|_ctx: ServiceContext, Path(path): Path<BookPath>| async move {
//!     HermesResult::Ok(Book { id: path.book_id })
//! })?
//! .register_empty::<DeleteBook, _, _>(|_ctx, _path| async move { Ok(()) })?;
//!
//! assert_eq!(registrar.len(), 2);
//! let app = registrar.into_app(MiddlewareChain::new());
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use futures_core::TryStream;
use hermes_core::{Endpoint, EndpointDescriptor, EventStream, HermesResult, NoContent, ServiceContext};
use hermes_extract::DecodeInput;
use hermes_middleware::MiddlewareChain;
use hermes_router::{PathTemplate, RouteError, Router};
use hermes_sse::{SseConfig, SseItem};
use serde::Serialize;
use thiserror::Error;

use crate::app::App;
use crate::dispatch::{empty_handler, stream_handler, value_handler, DispatchUnit, ErasedHandler};
use crate::mount::Mountable;

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// An endpoint could not be bound.
    #[error("cannot register endpoint '{endpoint}': {source}")]
    Endpoint {
        /// Operation name of the endpoint.
        endpoint: &'static str,
        /// What went wrong.
        #[source]
        source: RouteError,
    },

    /// A group prefix is not a valid path template.
    #[error("invalid group prefix '{prefix}': {source}")]
    Prefix {
        /// The rejected prefix.
        prefix: String,
        /// What went wrong.
        #[source]
        source: RouteError,
    },
}

/// Collects routes before the application is frozen.
#[derive(Debug, Default)]
pub struct RouteRegistrar {
    router: Router<DispatchUnit>,
    sse_config: SseConfig,
    expose_internal_errors: bool,
}

impl RouteRegistrar {
    /// Creates an empty registrar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stream configuration used by routes registered afterwards.
    #[must_use]
    pub fn with_sse_config(mut self, config: SseConfig) -> Self {
        self.sse_config = config;
        self
    }

    /// Sets whether uncategorized error details reach clients when no error
    /// translation middleware handled them.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Returns the stream configuration.
    #[must_use]
    pub fn sse_config(&self) -> &SseConfig {
        &self.sse_config
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.router.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.router.is_empty()
    }

    /// Opens a group whose routes are mounted under `prefix`.
    pub fn group(&mut self, prefix: &str) -> Result<RouteGroup<'_>, RegistrationError> {
        let prefix = parse_prefix(prefix)?;
        Ok(RouteGroup {
            registrar: self,
            prefix,
        })
    }

    fn root(&mut self) -> RouteGroup<'_> {
        RouteGroup {
            registrar: self,
            prefix: PathTemplate::root(),
        }
    }

    /// Registers a handler whose output is answered as JSON with status 200.
    pub fn register<E, H, Fut>(&mut self, handler: H) -> Result<&mut Self, RegistrationError>
    where
        E: Endpoint,
        E::Input: DecodeInput,
        E::Output: Serialize,
        H: Fn(ServiceContext, E::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<E::Output>> + Send + 'static,
    {
        self.root().register::<E, H, Fut>(handler)?;
        Ok(self)
    }

    /// Registers a handler answered with `204 No Content`.
    pub fn register_empty<E, H, Fut>(&mut self, handler: H) -> Result<&mut Self, RegistrationError>
    where
        E: Endpoint<Output = NoContent>,
        E::Input: DecodeInput,
        H: Fn(ServiceContext, E::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<()>> + Send + 'static,
    {
        self.root().register_empty::<E, H, Fut>(handler)?;
        Ok(self)
    }

    /// Registers a handler answered with a server-sent event stream.
    pub fn register_stream<E, H, Fut, S, Err>(
        &mut self,
        handler: H,
    ) -> Result<&mut Self, RegistrationError>
    where
        E: Endpoint<Output = EventStream>,
        E::Input: DecodeInput,
        H: Fn(ServiceContext, E::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<S>> + Send + 'static,
        S: TryStream<Error = Err> + Send + 'static,
        S::Ok: Into<SseItem> + Send,
        Err: std::fmt::Display + Send + 'static,
    {
        self.root().register_stream::<E, H, Fut, S, Err>(handler)?;
        Ok(self)
    }

    /// Mounts a service under its base path.
    pub fn mount<M: Mountable>(&mut self, service: M) -> Result<&mut Self, RegistrationError> {
        self.root().mount(service)?;
        Ok(self)
    }

    /// Freezes the route table behind `chain`.
    #[must_use]
    pub fn into_app(self, chain: MiddlewareChain) -> App {
        tracing::info!(
            routes = self.router.len(),
            middlewares = ?chain.names(),
            "route table frozen"
        );
        App::new(self.router, chain, self.expose_internal_errors)
    }

    fn bind(
        &mut self,
        prefix: &PathTemplate,
        descriptor: EndpointDescriptor,
        handler: ErasedHandler,
    ) -> Result<(), RegistrationError> {
        let endpoint = descriptor.name();
        let to_error = |source| RegistrationError::Endpoint { endpoint, source };

        let path = PathTemplate::parse(descriptor.path()).map_err(to_error)?;
        let full_path = prefix.join(&path).map_err(to_error)?;
        let method = descriptor.method().clone();

        tracing::debug!(
            endpoint,
            method = %method,
            path = %full_path,
            auth = ?descriptor.auth(),
            "route registered"
        );

        self.router
            .insert(method, full_path, DispatchUnit::new(descriptor, handler))
            .map_err(to_error)
    }
}

fn parse_prefix(prefix: &str) -> Result<PathTemplate, RegistrationError> {
    PathTemplate::parse(prefix).map_err(|source| RegistrationError::Prefix {
        prefix: prefix.to_string(),
        source,
    })
}

/// A registrar view scoped to a path prefix.
///
/// Groups nest: the prefixes of enclosing groups are concatenated, and
/// parameters declared in a prefix are decoded like any other path
/// parameter.
#[derive(Debug)]
pub struct RouteGroup<'r> {
    registrar: &'r mut RouteRegistrar,
    prefix: PathTemplate,
}

impl RouteGroup<'_> {
    /// Returns the group's full prefix.
    #[must_use]
    pub fn prefix(&self) -> &PathTemplate {
        &self.prefix
    }

    /// Opens a nested group under `prefix`.
    pub fn group(&mut self, prefix: &str) -> Result<RouteGroup<'_>, RegistrationError> {
        let nested = parse_prefix(prefix)?;
        let prefix = self
            .prefix
            .join(&nested)
            .map_err(|source| RegistrationError::Prefix {
                prefix: prefix.to_string(),
                source,
            })?;
        Ok(RouteGroup {
            registrar: &mut *self.registrar,
            prefix,
        })
    }

    /// Registers a handler whose output is answered as JSON with status 200.
    pub fn register<E, H, Fut>(&mut self, handler: H) -> Result<&mut Self, RegistrationError>
    where
        E: Endpoint,
        E::Input: DecodeInput,
        E::Output: Serialize,
        H: Fn(ServiceContext, E::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<E::Output>> + Send + 'static,
    {
        self.registrar
            .bind(&self.prefix, E::descriptor(), value_handler::<E, H, Fut>(handler))?;
        Ok(self)
    }

    /// Registers a handler answered with `204 No Content`.
    pub fn register_empty<E, H, Fut>(&mut self, handler: H) -> Result<&mut Self, RegistrationError>
    where
        E: Endpoint<Output = NoContent>,
        E::Input: DecodeInput,
        H: Fn(ServiceContext, E::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<()>> + Send + 'static,
    {
        self.registrar
            .bind(&self.prefix, E::descriptor(), empty_handler::<E, H, Fut>(handler))?;
        Ok(self)
    }

    /// Registers a handler answered with a server-sent event stream.
    pub fn register_stream<E, H, Fut, S, Err>(
        &mut self,
        handler: H,
    ) -> Result<&mut Self, RegistrationError>
    where
        E: Endpoint<Output = EventStream>,
        E::Input: DecodeInput,
        H: Fn(ServiceContext, E::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<S>> + Send + 'static,
        S: TryStream<Error = Err> + Send + 'static,
        S::Ok: Into<SseItem> + Send,
        Err: std::fmt::Display + Send + 'static,
    {
        let config = self.registrar.sse_config.clone();
        self.registrar.bind(
            &self.prefix,
            E::descriptor(),
            stream_handler::<E, H, Fut, S, Err>(handler, config),
        )?;
        Ok(self)
    }

    /// Mounts a service under its base path, relative to this group.
    pub fn mount<M: Mountable>(&mut self, service: M) -> Result<&mut Self, RegistrationError> {
        let service = Arc::new(service);
        let mut group = self.group(service.base_path())?;
        Arc::clone(&service).routes(&mut group)?;
        tracing::debug!(
            service = std::any::type_name::<M>(),
            prefix = %group.prefix(),
            "service mounted"
        );
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_extract::Path;
    use http::Method;
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ChatPath {
        book_id: String,
        chat_id: String,
    }

    struct GetChat;

    impl Endpoint for GetChat {
        type Input = Path<ChatPath>;
        type Output = String;

        fn descriptor() -> EndpointDescriptor {
            EndpointDescriptor::get("getChat", "/chats/:chatId")
        }
    }

    struct Health;

    impl Endpoint for Health {
        type Input = ();
        type Output = &'static str;

        fn descriptor() -> EndpointDescriptor {
            EndpointDescriptor::get("health", "/health")
        }
    }

    struct Shadow;

    impl Endpoint for Shadow {
        type Input = ();
        type Output = ();

        fn descriptor() -> EndpointDescriptor {
            EndpointDescriptor::get("shadow", "/items/:bookId")
        }
    }

    async fn get_chat(_ctx: ServiceContext, Path(path): Path<ChatPath>) -> HermesResult<String> {
        Ok(format!("{}/{}", path.book_id, path.chat_id))
    }

    #[test]
    fn test_nested_groups_compose_prefixes() {
        let mut registrar = RouteRegistrar::new();
        {
            let mut v1 = registrar.group("/v1").unwrap();
            let mut books = v1.group("/books/:bookId").unwrap();
            assert_eq!(books.prefix().to_string(), "/v1/books/:bookId");
            books.register::<GetChat, _, _>(get_chat).unwrap();
        }

        let matched = registrar
            .router
            .match_route(&Method::GET, "/v1/books/b-1/chats/c-2")
            .unwrap();
        assert_eq!(matched.value.descriptor().name(), "getChat");
        assert_eq!(matched.template.to_string(), "/v1/books/:bookId/chats/:chatId");
        assert_eq!(matched.params.get("bookId"), Some("b-1"));
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut registrar = RouteRegistrar::new();
        registrar
            .register::<Health, _, _>(|_ctx, ()| async { Ok("ok") })
            .unwrap();

        let err = registrar
            .register::<Health, _, _>(|_ctx, ()| async { Ok("again") })
            .unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::Endpoint {
                endpoint: "health",
                source: RouteError::Conflict { .. }
            }
        ));
        assert_eq!(registrar.len(), 1);
    }

    #[test]
    fn test_duplicate_param_across_group_rejected() {
        let mut registrar = RouteRegistrar::new();
        let mut group = registrar.group("/books/:bookId").unwrap();

        let err = group
            .register::<Shadow, _, _>(|_ctx, ()| async { Ok(()) })
            .unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::Endpoint {
                source: RouteError::DuplicateParam { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_prefix() {
        let mut registrar = RouteRegistrar::new();
        let err = registrar.group("/books/:").unwrap_err();
        assert!(matches!(err, RegistrationError::Prefix { .. }));
    }
}
