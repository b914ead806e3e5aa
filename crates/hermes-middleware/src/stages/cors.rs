//! CORS (Cross-Origin Resource Sharing) middleware.
//!
//! ## CORS Headers
//!
//! - `Access-Control-Allow-Origin`: the allowed origin, omitted when the
//!   request's origin is not allowed
//! - `Access-Control-Allow-Methods`: allowed HTTP methods
//! - `Access-Control-Allow-Headers`: allowed request headers
//! - `Access-Control-Allow-Credentials`: present when credentials are allowed
//! - `Access-Control-Max-Age`: preflight cache duration
//! - `Access-Control-Expose-Headers`: headers exposed to JavaScript
//!
//! ## Preflight Requests
//!
//! Every `OPTIONS` request is answered here with `204 No Content` and the
//! computed headers; the rest of the chain never sees it. Other requests are
//! forwarded and the same headers are added to whatever comes back, including
//! streaming responses, whose body is left untouched.
//!
//! ## Example
//!
//! ```
//! use hermes_middleware::CorsMiddleware;
//! use http::Method;
//! use std::time::Duration;
//!
//! let cors = CorsMiddleware::builder()
//!     .allow_origin("https://app.example.com")
//!     .allow_origin("https://admin.example.com")
//!     .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
//!     .allow_headers(["Content-Type", "Authorization", "X-Request-ID"])
//!     .allow_credentials(true)
//!     .max_age(Duration::from_secs(3600))
//!     .build();
//! ```

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use hermes_core::{Body, HermesResult, Request, Response};
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, ORIGIN,
    VARY,
};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use std::time::Duration;

/// The set of allowed origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Any origin (wildcard `*`).
    Any,
    /// Exactly these origins.
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Checks if an origin is allowed.
    #[must_use]
    pub fn is_allowed(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::List(origins) => origins.iter().any(|o| o == origin),
        }
    }
}

/// Configuration for [`CorsMiddleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    allowed_origins: AllowedOrigins,
    allowed_methods: Vec<Method>,
    allowed_headers: Vec<String>,
    expose_headers: Vec<String>,
    allow_credentials: bool,
    max_age: Option<Duration>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: AllowedOrigins::List(Vec::new()),
            allowed_methods: vec![
                Method::GET,
                Method::HEAD,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
            ],
            allowed_headers: vec![
                "content-type".to_string(),
                "authorization".to_string(),
                "x-request-id".to_string(),
            ],
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age: Some(Duration::from_secs(86400)),
        }
    }
}

impl CorsConfig {
    /// Returns the allowed origins.
    #[must_use]
    pub const fn allowed_origins(&self) -> &AllowedOrigins {
        &self.allowed_origins
    }

    /// Returns whether credentials are allowed.
    #[must_use]
    pub const fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Value of `Access-Control-Allow-Origin` for a request origin.
    ///
    /// With a wildcard and credentials the request origin is echoed, since
    /// browsers reject `*` on credentialed requests.
    fn allow_origin_value(&self, origin: Option<&str>) -> Option<HeaderValue> {
        match (&self.allowed_origins, origin) {
            (AllowedOrigins::Any, Some(origin)) if self.allow_credentials => {
                HeaderValue::from_str(origin).ok()
            }
            (AllowedOrigins::Any, _) => Some(HeaderValue::from_static("*")),
            (AllowedOrigins::List(_), Some(origin)) if self.allowed_origins.is_allowed(origin) => {
                HeaderValue::from_str(origin).ok()
            }
            (AllowedOrigins::List(_), _) => None,
        }
    }

    /// Computes the CORS headers for a request carrying `origin`.
    #[must_use]
    pub fn headers_for(&self, origin: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(value) = self.allow_origin_value(origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }

        if !self.allowed_methods.is_empty() {
            let methods: Vec<&str> = self.allowed_methods.iter().map(Method::as_str).collect();
            insert_joined(&mut headers, ACCESS_CONTROL_ALLOW_METHODS, &methods);
        }

        if !self.allowed_headers.is_empty() {
            insert_joined(&mut headers, ACCESS_CONTROL_ALLOW_HEADERS, &self.allowed_headers);
        }

        if self.allow_credentials {
            headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }

        if let Some(max_age) = self.max_age {
            headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age.as_secs()));
        }

        if !self.expose_headers.is_empty() {
            insert_joined(&mut headers, ACCESS_CONTROL_EXPOSE_HEADERS, &self.expose_headers);
        }

        let varies_by_origin = matches!(self.allowed_origins, AllowedOrigins::List(_))
            || self.allow_credentials;
        if varies_by_origin {
            headers.insert(VARY, HeaderValue::from_static("Origin"));
        }

        headers
    }
}

/// Copies CORS headers onto `target`, appending to any existing `Vary`.
fn merge_headers(target: &mut HeaderMap, cors: &HeaderMap) {
    for (name, value) in cors {
        if name == VARY {
            let present = target.get_all(VARY).iter().any(|existing| {
                existing
                    .to_str()
                    .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case("origin")))
                    .unwrap_or(false)
            });
            if !present {
                target.append(VARY, value.clone());
            }
        } else {
            target.insert(name.clone(), value.clone());
        }
    }
}

fn insert_joined<S: AsRef<str>>(headers: &mut HeaderMap, name: http::HeaderName, values: &[S]) {
    let joined = values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    match HeaderValue::from_str(&joined) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, value = %joined, "invalid CORS header value"),
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Builder for [`CorsMiddleware`].
#[derive(Debug, Clone, Default)]
pub struct CorsBuilder {
    config: CorsConfig,
}

impl CorsBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows any origin.
    #[must_use]
    pub fn allow_any_origin(mut self) -> Self {
        self.config.allowed_origins = AllowedOrigins::Any;
        self
    }

    /// Adds an allowed origin. Has no effect after [`allow_any_origin`](Self::allow_any_origin).
    #[must_use]
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        if let AllowedOrigins::List(origins) = &mut self.config.allowed_origins {
            push_unique(origins, origin.into());
        }
        self
    }

    /// Replaces the allowed origins. A `"*"` entry allows any origin.
    #[must_use]
    pub fn allow_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Vec::new();
        for origin in origins {
            let origin = origin.into();
            if origin == "*" {
                self.config.allowed_origins = AllowedOrigins::Any;
                return self;
            }
            push_unique(&mut list, origin);
        }
        self.config.allowed_origins = AllowedOrigins::List(list);
        self
    }

    /// Sets the allowed HTTP methods.
    #[must_use]
    pub fn allow_methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.config.allowed_methods.clear();
        for method in methods {
            if !self.config.allowed_methods.contains(&method) {
                self.config.allowed_methods.push(method);
            }
        }
        self
    }

    /// Adds an allowed request header.
    #[must_use]
    pub fn allow_header(mut self, header: impl Into<String>) -> Self {
        push_unique(&mut self.config.allowed_headers, header.into().to_lowercase());
        self
    }

    /// Sets the allowed request headers.
    #[must_use]
    pub fn allow_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_headers.clear();
        for header in headers {
            push_unique(&mut self.config.allowed_headers, header.into().to_lowercase());
        }
        self
    }

    /// Sets headers exposed to JavaScript.
    #[must_use]
    pub fn expose_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.expose_headers.clear();
        for header in headers {
            push_unique(&mut self.config.expose_headers, header.into().to_lowercase());
        }
        self
    }

    /// Sets whether credentials are allowed.
    #[must_use]
    pub const fn allow_credentials(mut self, allow: bool) -> Self {
        self.config.allow_credentials = allow;
        self
    }

    /// Sets the preflight cache duration.
    #[must_use]
    pub const fn max_age(mut self, duration: Duration) -> Self {
        self.config.max_age = Some(duration);
        self
    }

    /// Disables preflight caching.
    #[must_use]
    pub const fn no_max_age(mut self) -> Self {
        self.config.max_age = None;
        self
    }

    /// Builds the middleware.
    #[must_use]
    pub fn build(self) -> CorsMiddleware {
        CorsMiddleware {
            config: self.config,
        }
    }
}

/// Middleware that answers preflights and decorates responses with CORS
/// headers.
#[derive(Debug, Clone, Default)]
pub struct CorsMiddleware {
    config: CorsConfig,
}

impl CorsMiddleware {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> CorsBuilder {
        CorsBuilder::new()
    }

    /// Allows any origin, common methods and any header. Development only.
    #[must_use]
    pub fn permissive() -> Self {
        CorsBuilder::new()
            .allow_any_origin()
            .allow_methods([
                Method::GET,
                Method::HEAD,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_headers(["*"])
            .build()
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CorsConfig {
        &self.config
    }
}

impl Middleware for CorsMiddleware {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HermesResult<Response>> {
        Box::pin(async move {
            let origin = request
                .headers()
                .get(ORIGIN)
                .and_then(|v| v.to_str().ok());
            let cors_headers = self.config.headers_for(origin);

            if request.method() == Method::OPTIONS {
                tracing::debug!(request_id = %ctx.request_id(), origin, "answering CORS preflight");
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::NO_CONTENT;
                merge_headers(response.headers_mut(), &cors_headers);
                return Ok(response);
            }

            match next.run(ctx, request).await {
                Ok(mut response) => {
                    merge_headers(response.headers_mut(), &cors_headers);
                    Ok(response)
                }
                Err(error) => {
                    merge_headers(ctx.error_headers_mut(), &cors_headers);
                    Err(error)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MiddlewareChain;
    use bytes::Bytes;
    use hermes_core::{ApiError, HermesError};

    fn request(method: Method, origin: Option<&str>) -> Request {
        let mut builder = http::Request::builder().method(method).uri("/v1/books");
        if let Some(origin) = origin {
            builder = builder.header(ORIGIN, origin);
        }
        builder.body(Bytes::new()).unwrap()
    }

    async fn run(cors: CorsMiddleware, request: Request) -> (HermesResult<Response>, bool) {
        let chain = MiddlewareChain::builder().with(cors).build();
        let reached = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = reached.clone();
        let mut ctx = MiddlewareContext::new();

        let result = chain
            .process(&mut ctx, request, move |_ctx, _req| {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
                Box::pin(async { Ok(Response::new(Body::from("ok"))) })
            })
            .await;

        (result, reached.load(std::sync::atomic::Ordering::SeqCst))
    }

    fn example_only() -> CorsMiddleware {
        CorsMiddleware::builder()
            .allow_origin("https://example.com")
            .build()
    }

    #[tokio::test]
    async fn test_preflight_short_circuits() {
        let (result, reached) = run(
            example_only(),
            request(Method::OPTIONS, Some("https://example.com")),
        )
        .await;
        let response = result.unwrap();

        assert!(!reached);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://example.com"
        );
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_METHODS],
            "GET, HEAD, POST, PUT, DELETE, PATCH"
        );
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_HEADERS],
            "content-type, authorization, x-request-id"
        );
        assert_eq!(response.headers()[ACCESS_CONTROL_MAX_AGE], "86400");
    }

    #[tokio::test]
    async fn test_preflight_without_request_method_header_still_short_circuits() {
        let (result, reached) = run(example_only(), request(Method::OPTIONS, None)).await;
        assert!(!reached);
        assert_eq!(result.unwrap().status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_allowed_origin_is_echoed() {
        let (result, reached) =
            run(example_only(), request(Method::GET, Some("https://example.com"))).await;
        let response = result.unwrap();

        assert!(reached);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://example.com"
        );
        assert_eq!(response.headers()[VARY], "Origin");
    }

    #[tokio::test]
    async fn test_vary_is_appended_to_handler_value() {
        let chain = MiddlewareChain::builder().with(example_only()).build();
        let mut ctx = MiddlewareContext::new();
        let response = chain
            .process(
                &mut ctx,
                request(Method::GET, Some("https://example.com")),
                |_ctx, _req| {
                    Box::pin(async {
                        let mut response = Response::new(Body::from("ok"));
                        response
                            .headers_mut()
                            .insert(VARY, HeaderValue::from_static("Accept-Encoding"));
                        Ok(response)
                    })
                },
            )
            .await
            .unwrap();

        let vary: Vec<_> = response.headers().get_all(VARY).iter().collect();
        assert_eq!(vary, vec!["Accept-Encoding", "Origin"]);
    }

    #[tokio::test]
    async fn test_vary_origin_not_duplicated() {
        let chain = MiddlewareChain::builder().with(example_only()).build();
        let mut ctx = MiddlewareContext::new();
        let response = chain
            .process(
                &mut ctx,
                request(Method::GET, Some("https://example.com")),
                |_ctx, _req| {
                    Box::pin(async {
                        let mut response = Response::new(Body::from("ok"));
                        response
                            .headers_mut()
                            .insert(VARY, HeaderValue::from_static("accept, origin"));
                        Ok(response)
                    })
                },
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get_all(VARY).iter().count(), 1);
    }

    #[tokio::test]
    async fn test_disallowed_origin_omits_allow_origin() {
        let cors = CorsMiddleware::builder()
            .allow_origin("https://other.com")
            .build();
        let (result, _) = run(cors, request(Method::GET, Some("https://example.com"))).await;
        let response = result.unwrap();

        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_METHODS).is_some());
    }

    #[tokio::test]
    async fn test_wildcard() {
        let cors = CorsMiddleware::builder().allow_origins(["*"]).build();
        let (result, _) = run(cors, request(Method::GET, Some("https://a.dev"))).await;
        let response = result.unwrap();

        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response.headers().get(VARY).is_none());
    }

    #[tokio::test]
    async fn test_wildcard_with_credentials_echoes_origin() {
        let cors = CorsMiddleware::builder()
            .allow_any_origin()
            .allow_credentials(true)
            .expose_headers(["X-Request-ID"])
            .build();
        let (result, _) = run(cors, request(Method::GET, Some("https://a.dev"))).await;
        let response = result.unwrap();

        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://a.dev");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(response.headers()[ACCESS_CONTROL_EXPOSE_HEADERS], "x-request-id");
    }

    #[tokio::test]
    async fn test_streaming_response_gets_headers() {
        let chain = MiddlewareChain::builder().with(example_only()).build();
        let mut ctx = MiddlewareContext::new();

        let response = chain
            .process(
                &mut ctx,
                request(Method::GET, Some("https://example.com")),
                |_ctx, _req| {
                    Box::pin(async {
                        let chunks = futures_util::stream::iter([Bytes::from_static(b"data: x\n\n")]);
                        Ok(Response::new(Body::from_stream(chunks)))
                    })
                },
            )
            .await
            .unwrap();

        assert!(response.body().is_streaming());
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://example.com"
        );
    }

    #[tokio::test]
    async fn test_error_records_headers_for_translation() {
        let chain = MiddlewareChain::builder().with(example_only()).build();
        let mut ctx = MiddlewareContext::new();

        let err = chain
            .process(
                &mut ctx,
                request(Method::GET, Some("https://example.com")),
                |_ctx, _req| {
                    Box::pin(async { Err(HermesError::from(ApiError::not_found("missing"))) })
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ctx.take_error_headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://example.com"
        );
    }
}
