//! Error translation middleware.
//!
//! The single place where a [`HermesError`] becomes an HTTP response. Register
//! it first so it wraps every other middleware and the endpoint:
//!
//! ```text
//! [ErrorTranslation] → RequestId → Cors → Auth → endpoint
//! ```
//!
//! Every error is rendered as `{ "errorCode": ..., "message": ... }` with the
//! status its category maps to. Uncategorized failures answer 500 with a
//! generic message unless internal details are exposed. Headers that inner
//! middlewares recorded via [`MiddlewareContext::error_headers_mut`] are
//! applied to the rendered response.
//!
//! # Example
//!
//! ```
//! use hermes_middleware::ErrorTranslationMiddleware;
//!
//! // Development only.
//! let verbose = ErrorTranslationMiddleware::new().expose_internal_errors(true);
//! assert!(verbose.exposes_internal_errors());
//! ```

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use hermes_core::{HermesError, HermesResult, Request, Response};

/// Middleware that converts errors into JSON error responses.
#[derive(Debug, Clone, Default)]
pub struct ErrorTranslationMiddleware {
    expose_internal_errors: bool,
}

impl ErrorTranslationMiddleware {
    /// Creates the middleware with internal details hidden.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether uncategorized error details reach the client.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Returns whether uncategorized error details reach the client.
    #[must_use]
    pub const fn exposes_internal_errors(&self) -> bool {
        self.expose_internal_errors
    }
}

/// Renders `error` as a response and applies the headers recorded in `ctx`.
pub fn translate_error(
    ctx: &mut MiddlewareContext,
    error: &HermesError,
    expose_internal: bool,
) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(
            request_id = %ctx.request_id(),
            status = status.as_u16(),
            code = error.error_code(),
            error = ?error,
            "request failed"
        );
    } else {
        tracing::debug!(
            request_id = %ctx.request_id(),
            status = status.as_u16(),
            code = error.error_code(),
            error = %error,
            "request rejected"
        );
    }

    let mut response = hermes_extract::error_response(error, expose_internal);
    response.headers_mut().extend(ctx.take_error_headers());
    response
}

impl Middleware for ErrorTranslationMiddleware {
    fn name(&self) -> &'static str {
        "error_translation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HermesResult<Response>> {
        Box::pin(async move {
            match next.run(ctx, request).await {
                Ok(response) => Ok(response),
                Err(error) => Ok(translate_error(ctx, &error, self.expose_internal_errors)),
            }
        })
    }
}
