//! The frozen application.
//!
//! An [`App`] owns the route table and the middleware chain. It is cheap to
//! clone and shared read-only between connections; handling a request takes
//! no locks.
//!
//! Each request runs through the chain; the innermost step resolves the
//! route, decodes the input against the full template, builds the
//! [`ServiceContext`](hermes_core::ServiceContext) from the identity the auth
//! middleware attached, and invokes the dispatch unit.

use std::sync::Arc;

use hermes_core::{HermesError, HermesResult, Request, Response};
use hermes_extract::{build_service_context, decode};
use hermes_middleware::{translate_error, MiddlewareChain, MiddlewareContext};
use hermes_router::{MatchError, Router};
use http::header::ALLOW;
use http::{HeaderValue, StatusCode};

use crate::dispatch::{DispatchUnit, HandlerFuture};

/// A routed, middleware-wrapped application.
#[derive(Debug, Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

#[derive(Debug)]
struct AppInner {
    routes: Router<DispatchUnit>,
    chain: MiddlewareChain,
    expose_internal_errors: bool,
}

impl App {
    pub(crate) fn new(
        routes: Router<DispatchUnit>,
        chain: MiddlewareChain,
        expose_internal_errors: bool,
    ) -> Self {
        Self {
            inner: Arc::new(AppInner {
                routes,
                chain,
                expose_internal_errors,
            }),
        }
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.inner.routes.len()
    }

    /// Returns the middleware chain.
    #[must_use]
    pub fn chain(&self) -> &MiddlewareChain {
        &self.inner.chain
    }

    /// Handles one request with a fully buffered body.
    ///
    /// Always produces a response: an error that escapes the chain is
    /// rendered the same way the error translation middleware would.
    pub async fn handle(&self, request: Request) -> Response {
        let mut ctx = MiddlewareContext::new();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let inner = Arc::clone(&self.inner);
        let result = self
            .inner
            .chain
            .process(&mut ctx, request, move |ctx, request| {
                inner.dispatch(ctx, &request)
            })
            .await;

        let response = match result {
            Ok(response) => response,
            Err(error) => translate_error(&mut ctx, &error, self.inner.expose_internal_errors),
        };

        tracing::debug!(
            request_id = %ctx.request_id(),
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            streaming = response.body().is_streaming(),
            elapsed_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX),
            "request completed"
        );
        response
    }
}

impl AppInner {
    fn dispatch(&self, ctx: &mut MiddlewareContext, request: &Request) -> HandlerFuture {
        match self.prepare(ctx, request) {
            Ok(future) => future,
            Err(error) => Box::pin(async move { Err(error) }),
        }
    }

    fn prepare(&self, ctx: &mut MiddlewareContext, request: &Request) -> HermesResult<HandlerFuture> {
        let path = request.uri().path();
        let matched = match self.routes.match_route(request.method(), path) {
            Ok(matched) => matched,
            Err(MatchError::NotFound) => {
                return Err(HermesError::abort(
                    StatusCode::NOT_FOUND,
                    format!("no route for {} {path}", request.method()),
                ));
            }
            Err(MatchError::MethodNotAllowed { allowed }) => {
                let allow = allowed
                    .iter()
                    .map(http::Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    ctx.error_headers_mut().insert(ALLOW, value);
                }
                return Err(HermesError::abort(
                    StatusCode::METHOD_NOT_ALLOWED,
                    format!("method {} not allowed for {path}", request.method()),
                ));
            }
        };

        let unit = matched.value;
        let input = decode(matched.template, &matched.params, request)?;
        let service_ctx = build_service_context(unit.auth(), ctx.identity())?;

        tracing::debug!(
            request_id = %ctx.request_id(),
            endpoint = unit.descriptor().name(),
            authenticated = service_ctx.is_authenticated(),
            "dispatching"
        );
        Ok(unit.call(service_ctx, input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RouteRegistrar;
    use bytes::Bytes;
    use hermes_core::{Endpoint, EndpointDescriptor, NoContent, ServiceContext};
    use http::Method;

    struct Whoami;

    impl Endpoint for Whoami {
        type Input = ();
        type Output = Option<String>;

        fn descriptor() -> EndpointDescriptor {
            EndpointDescriptor::get("whoami", "/whoami")
        }
    }

    struct Logout;

    impl Endpoint for Logout {
        type Input = ();
        type Output = NoContent;

        fn descriptor() -> EndpointDescriptor {
            EndpointDescriptor::post("logout", "/logout").require_auth()
        }
    }

    fn app() -> App {
        let mut registrar = RouteRegistrar::new();
        registrar
            .register::<Whoami, _, _>(|ctx: ServiceContext, ()| async move {
                Ok(ctx.authenticated_user_id().map(str::to_string))
            })
            .unwrap()
            .register_empty::<Logout, _, _>(|_ctx, ()| async { Ok(()) })
            .unwrap();
        registrar.into_app(MiddlewareChain::new())
    }

    fn request(method: Method, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_public_endpoint() {
        let response = app().handle(request(Method::GET, "/whoami")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_bytes(), Some(&b"null"[..]));
    }

    #[tokio::test]
    async fn test_required_auth_without_identity() {
        let response = app().handle(request(Method::POST, "/logout")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = app().handle(request(Method::GET, "/nowhere")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value =
            serde_json::from_slice(response.body().as_bytes().unwrap()).unwrap();
        assert_eq!(body["errorCode"], "HTTP_ABORT");
    }

    #[tokio::test]
    async fn test_method_not_allowed_lists_methods() {
        let response = app().handle(request(Method::DELETE, "/whoami")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET");
    }

    #[test]
    fn test_app_is_shared() {
        let app = app();
        let clone = app.clone();
        assert_eq!(clone.route_count(), 2);
        assert!(app.chain().is_empty());
    }
}
