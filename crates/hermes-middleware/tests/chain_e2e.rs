//! End-to-end chain tests.
//!
//! Runs the built-in stages in their recommended order:
//!
//! 1. Error translation
//! 2. Request ID
//! 3. CORS
//! 4. Auth

use async_trait::async_trait;
use bytes::Bytes;
use hermes_core::{ApiError, AuthError, Body, HermesError, Identity, Request, Response};
use hermes_middleware::{
    AuthMiddleware, CorsMiddleware, ErrorTranslationMiddleware, MiddlewareChain,
    MiddlewareContext, RequestIdMiddleware, TokenVerifier, REQUEST_ID_HEADER,
};
use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION, ORIGIN};
use http::{Method, StatusCode};

struct Tokens;

#[async_trait]
impl TokenVerifier for Tokens {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        match token {
            "t-bob" => Ok(Identity::new("bob").with_role("reader")),
            _ => Err(AuthError::InvalidToken("unknown".to_string())),
        }
    }
}

fn chain() -> MiddlewareChain {
    MiddlewareChain::builder()
        .with(ErrorTranslationMiddleware::new())
        .with(RequestIdMiddleware::new())
        .with(
            CorsMiddleware::builder()
                .allow_origin("https://app.example.com")
                .build(),
        )
        .with(AuthMiddleware::new(Tokens))
        .build()
}

fn request(method: Method, token: Option<&str>) -> Request {
    let mut builder = http::Request::builder()
        .method(method)
        .uri("/v1/me")
        .header(ORIGIN, "https://app.example.com");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Bytes::new()).unwrap()
}

/// Answers with the caller's user id, or 401 when anonymous.
async fn run(method: Method, token: Option<&str>) -> (Response, MiddlewareContext) {
    let mut ctx = MiddlewareContext::new();
    let response = chain()
        .process(&mut ctx, request(method, token), |ctx, _req| {
            let user = ctx.identity().map(|i| i.user_id().to_string());
            Box::pin(async move {
                match user {
                    Some(user) => Ok(Response::new(Body::from(user))),
                    None => Err(HermesError::from(AuthError::Unauthorized)),
                }
            })
        })
        .await
        .unwrap();
    (response, ctx)
}

#[test]
fn test_chain_order() {
    assert_eq!(
        chain().names(),
        vec!["error_translation", "request_id", "cors", "auth"]
    );
}

#[tokio::test]
async fn test_authenticated_request() {
    let (response, ctx) = run(Method::GET, Some("t-bob")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body().as_bytes(), Some(&b"bob"[..]));
    assert_eq!(
        response.headers()[REQUEST_ID_HEADER],
        ctx.request_id().to_string()
    );
    assert_eq!(
        response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );
}

#[tokio::test]
async fn test_error_response_keeps_decorations() {
    let (response, ctx) = run(Method::GET, Some("forged")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(
        response.headers()[REQUEST_ID_HEADER],
        ctx.request_id().to_string()
    );
    assert_eq!(
        response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );

    let body: serde_json::Value =
        serde_json::from_slice(response.body().as_bytes().unwrap()).unwrap();
    assert_eq!(body["errorCode"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_preflight_never_reaches_auth_or_endpoint() {
    let (response, _) = run(Method::OPTIONS, None).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    assert!(response.body().as_bytes().unwrap().is_empty());
}

#[tokio::test]
async fn test_domain_error_from_endpoint() {
    let mut ctx = MiddlewareContext::new();
    let response = chain()
        .process(&mut ctx, request(Method::GET, None), |_ctx, _req| {
            Box::pin(async { Err(HermesError::from(ApiError::not_found("no such book"))) })
        })
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value =
        serde_json::from_slice(response.body().as_bytes().unwrap()).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"errorCode": "NOT_FOUND", "message": "no such book"})
    );
}
