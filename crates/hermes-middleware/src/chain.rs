//! Ordered middleware chain.
//!
//! Middlewares run in registration order on the way in and in reverse order
//! on the way out. Register the error translation middleware first so that it
//! wraps everything else.
//!
//! ```text
//! Request → ErrorTranslation → RequestId → Cors → Auth → endpoint
//!                                                           ↓
//! Response ← ErrorTranslation ← RequestId ← Cors ← Auth ←───┘
//! ```

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use hermes_core::{HermesResult, Request, Response};
use std::sync::Arc;

/// A type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable, ordered list of middlewares.
///
/// # Example
///
/// ```
/// use hermes_middleware::{
///     CorsMiddleware, ErrorTranslationMiddleware, MiddlewareChain, RequestIdMiddleware,
/// };
///
/// let chain = MiddlewareChain::builder()
///     .with(ErrorTranslationMiddleware::new())
///     .with(RequestIdMiddleware::new())
///     .with(CorsMiddleware::permissive())
///     .build();
///
/// assert_eq!(chain.names(), vec!["error_translation", "request_id", "cors"]);
/// ```
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<BoxedMiddleware>,
}

impl MiddlewareChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain builder.
    #[must_use]
    pub fn builder() -> MiddlewareChainBuilder {
        MiddlewareChainBuilder::default()
    }

    /// Runs `request` through every middleware and then `endpoint`.
    pub async fn process<H>(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
        endpoint: H,
    ) -> HermesResult<Response>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, HermesResult<Response>>
            + Send
            + 'static,
    {
        self.build_chain(endpoint).run(ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, endpoint: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, HermesResult<Response>>
            + Send
            + 'a,
    {
        self.middlewares
            .iter()
            .rev()
            .fold(Next::endpoint(endpoint), |next, middleware| {
                Next::new(middleware.as_ref(), next)
            })
    }

    /// Returns the middleware names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of middlewares.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns `true` if the chain has no middlewares.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("middlewares", &self.names())
            .finish()
    }
}

/// Builder for [`MiddlewareChain`].
#[derive(Default)]
pub struct MiddlewareChainBuilder {
    middlewares: Vec<BoxedMiddleware>,
}

impl MiddlewareChainBuilder {
    /// Appends a middleware; earlier ones wrap later ones.
    #[must_use]
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Appends a shared middleware.
    #[must_use]
    pub fn with_shared(mut self, middleware: BoxedMiddleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Builds the chain.
    #[must_use]
    pub fn build(self) -> MiddlewareChain {
        MiddlewareChain {
            middlewares: self.middlewares,
        }
    }
}
