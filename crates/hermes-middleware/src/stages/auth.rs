//! Bearer token authentication middleware.
//!
//! Reads `Authorization: Bearer <token>`, hands the token to a
//! [`TokenVerifier`] and attaches the resulting [`Identity`] to the
//! [`MiddlewareContext`]. It never rejects a request: whether an endpoint
//! needs an identity is decided when the service context is built.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use async_trait::async_trait;
use hermes_core::{AuthError, HermesResult, Identity, Request, Response};
use http::header::AUTHORIZATION;
use std::sync::Arc;

/// Verifies bearer tokens.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use hermes_core::{AuthError, Identity};
/// use hermes_middleware::TokenVerifier;
///
/// struct StaticTokens;
///
/// #[async_trait]
/// impl TokenVerifier for StaticTokens {
///     async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
///         match token {
///             "letmein" => Ok(Identity::new("user-1")),
///             _ => Err(AuthError::InvalidToken("unknown token".into())),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    /// Returns the identity the token belongs to.
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

#[async_trait]
impl<T: TokenVerifier + ?Sized> TokenVerifier for Arc<T> {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        (**self).verify(token).await
    }
}

/// Middleware that attaches a verified identity.
#[derive(Debug, Clone)]
pub struct AuthMiddleware<V> {
    verifier: V,
}

impl<V: TokenVerifier> AuthMiddleware<V> {
    /// Creates the middleware around `verifier`.
    pub const fn new(verifier: V) -> Self {
        Self { verifier }
    }
}

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace
/// around the token is ignored.
pub(crate) fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl<V: TokenVerifier> Middleware for AuthMiddleware<V> {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HermesResult<Response>> {
        Box::pin(async move {
            let token = request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(bearer_token);

            if let Some(token) = token {
                match self.verifier.verify(token).await {
                    Ok(identity) => {
                        tracing::debug!(
                            request_id = %ctx.request_id(),
                            user = %identity.log_id(),
                            "bearer token verified"
                        );
                        ctx.set_identity(identity);
                    }
                    Err(error) => {
                        tracing::warn!(
                            request_id = %ctx.request_id(),
                            error = %error,
                            "bearer token rejected, continuing unauthenticated"
                        );
                    }
                }
            }

            next.run(ctx, request).await
        })
    }
}
