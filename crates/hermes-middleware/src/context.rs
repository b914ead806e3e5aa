//! Middleware context types.
//!
//! The [`MiddlewareContext`] carries per-request state through the chain. It
//! is passed by `&mut` to every middleware and to the endpoint dispatcher, so
//! nothing about a request lives in task-local or global storage.

use hermes_core::{Identity, RequestId};
use http::HeaderMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

/// Context that flows through the middleware chain.
///
/// # Example
///
/// ```
/// use hermes_middleware::MiddlewareContext;
/// use hermes_core::Identity;
///
/// let mut ctx = MiddlewareContext::new();
/// assert!(ctx.identity().is_none());
///
/// ctx.set_identity(Identity::new("user-123").with_role("admin"));
/// assert_eq!(ctx.identity().map(Identity::user_id), Some("user-123"));
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    request_id: RequestId,

    /// Identity attached by the auth middleware, if a token verified.
    identity: Option<Identity>,

    started_at: Instant,

    /// Headers to add if the request ends in an error.
    ///
    /// Middlewares that decorate responses record their headers here when the
    /// inner chain fails, so the error translation can still apply them.
    error_headers: HeaderMap,

    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a new middleware context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            identity: None,
            started_at: Instant::now(),
            error_headers: HeaderMap::new(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Sets the request ID.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Returns the attached identity.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Attaches a verified identity.
    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Returns when the request started processing.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Headers to apply to an error response.
    pub fn error_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.error_headers
    }

    /// Takes the headers recorded for an error response.
    pub fn take_error_headers(&mut self) -> HeaderMap {
        std::mem::take(&mut self.error_headers)
    }

    /// Stores a typed extension value.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_middleware::MiddlewareContext;
    ///
    /// struct Tenant(&'static str);
    ///
    /// let mut ctx = MiddlewareContext::new();
    /// ctx.set_extension(Tenant("acme"));
    /// assert_eq!(ctx.get_extension::<Tenant>().unwrap().0, "acme");
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}
