//! Request ID middleware.
//!
//! Assigns every request an identifier used for log correlation. A valid
//! UUID arriving in `X-Request-ID` is kept, anything else is replaced with a
//! fresh UUID v7. The ID is stored in the [`MiddlewareContext`], written back
//! onto the request for the endpoint, and echoed on the response, including
//! error responses produced further out.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use hermes_core::{HermesResult, Request, RequestId, Response};
use http::{HeaderName, HeaderValue};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Middleware that extracts or generates request IDs.
///
/// # Example
///
/// ```
/// use hermes_middleware::RequestIdMiddleware;
///
/// let propagating = RequestIdMiddleware::new();
/// let edge = RequestIdMiddleware::new().ignore_incoming();
/// # let _ = (propagating, edge);
/// ```
#[derive(Debug, Clone)]
pub struct RequestIdMiddleware {
    trust_incoming: bool,
}

impl Default for RequestIdMiddleware {
    fn default() -> Self {
        Self {
            trust_incoming: true,
        }
    }
}

impl RequestIdMiddleware {
    /// Creates a middleware that keeps valid incoming IDs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Always generates a new ID, ignoring `X-Request-ID`.
    ///
    /// Use this at the edge when callers are not trusted.
    #[must_use]
    pub fn ignore_incoming(mut self) -> Self {
        self.trust_incoming = false;
        self
    }

    fn extract_request_id(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| RequestId::parse(value.trim()))
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        mut request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HermesResult<Response>> {
        Box::pin(async move {
            let request_id = self
                .extract_request_id(&request)
                .unwrap_or_else(RequestId::new);
            ctx.set_request_id(request_id);

            let header = HeaderValue::from_str(&request_id.to_string());
            let header = match header {
                Ok(value) => value,
                Err(_) => return next.run(ctx, request).await,
            };
            request
                .headers_mut()
                .insert(REQUEST_ID_HEADER, header.clone());

            match next.run(ctx, request).await {
                Ok(mut response) => {
                    response.headers_mut().insert(REQUEST_ID_HEADER, header);
                    Ok(response)
                }
                Err(error) => {
                    ctx.error_headers_mut().insert(REQUEST_ID_HEADER, header);
                    Err(error)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use hermes_core::{ApiError, Body, HermesError};

    fn request(incoming: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/test");
        if let Some(id) = incoming {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        builder.body(Bytes::new()).unwrap()
    }

    /// Echoes the request's `x-request-id` into the body.
    fn echo<'a>() -> Next<'a> {
        Next::endpoint(|_ctx, req: Request| {
            let seen = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Box::pin(async move { Ok(Response::new(Body::from(seen))) })
        })
    }

    #[tokio::test]
    async fn test_generates_request_id_when_missing() {
        let middleware = RequestIdMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let response = middleware
            .process(&mut ctx, request(None), echo())
            .await
            .unwrap();

        let header_id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert_eq!(ctx.request_id().to_string(), header_id);
        assert_eq!(ctx.request_id().as_uuid().get_version_num(), 7);
        assert_eq!(response.body().as_bytes(), Some(header_id.as_bytes()));
    }

    #[tokio::test]
    async fn test_propagates_valid_incoming_id() {
        let incoming = "0190b1c2-7d3e-7a4b-8c5d-6e7f8a9b0c1d";
        let middleware = RequestIdMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let response = middleware
            .process(&mut ctx, request(Some(incoming)), echo())
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], incoming);
        assert_eq!(ctx.request_id().to_string(), incoming);
    }

    #[tokio::test]
    async fn test_replaces_malformed_incoming_id() {
        let middleware = RequestIdMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let response = middleware
            .process(&mut ctx, request(Some("not-a-uuid")), echo())
            .await
            .unwrap();

        assert_ne!(response.headers()[REQUEST_ID_HEADER], "not-a-uuid");
    }

    #[tokio::test]
    async fn test_ignore_incoming() {
        let incoming = "0190b1c2-7d3e-7a4b-8c5d-6e7f8a9b0c1d";
        let middleware = RequestIdMiddleware::new().ignore_incoming();
        let mut ctx = MiddlewareContext::new();

        let response = middleware
            .process(&mut ctx, request(Some(incoming)), echo())
            .await
            .unwrap();

        assert_ne!(response.headers()[REQUEST_ID_HEADER], incoming);
    }

    #[tokio::test]
    async fn test_error_path_records_header() {
        let middleware = RequestIdMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let next = Next::endpoint(|_ctx, _req| {
            Box::pin(async { Err(HermesError::from(ApiError::forbidden("nope"))) })
        });
        let result = middleware.process(&mut ctx, request(None), next).await;

        assert!(result.is_err());
        let headers = ctx.take_error_headers();
        assert_eq!(headers[REQUEST_ID_HEADER], ctx.request_id().to_string());
    }
}
