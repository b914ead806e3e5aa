//! Endpoint contracts.
//!
//! An endpoint is declared by implementing [`Endpoint`] on a zero-sized type.
//! The associated types carry the typed input and output, and
//! [`Endpoint::descriptor`] returns the static metadata the registrar binds.
//!
//! # Example
//!
//! ```
//! use hermes_core::{AuthRequirement, Endpoint, EndpointDescriptor};
//!
//! struct GetBook;
//!
//! impl Endpoint for GetBook {
//!     type Input = ();
//!     type Output = String;
//!
//!     fn descriptor() -> EndpointDescriptor {
//!         EndpointDescriptor::get("getBook", "/books/:bookId")
//!     }
//! }
//!
//! assert_eq!(GetBook::descriptor().auth(), AuthRequirement::None);
//! ```

use http::Method;
use std::fmt;

/// Whether an endpoint needs an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthRequirement {
    /// Anonymous callers are accepted; an attached identity is still exposed.
    #[default]
    None,
    /// The handler only runs when an identity is attached.
    Required,
}

/// Static metadata for one API operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    name: &'static str,
    method: Method,
    path: &'static str,
    auth: AuthRequirement,
}

impl EndpointDescriptor {
    /// Creates a descriptor. Parameter segments use the `:name` form.
    #[must_use]
    pub fn new(name: &'static str, method: Method, path: &'static str) -> Self {
        Self {
            name,
            method,
            path,
            auth: AuthRequirement::None,
        }
    }

    /// `GET` descriptor.
    #[must_use]
    pub fn get(name: &'static str, path: &'static str) -> Self {
        Self::new(name, Method::GET, path)
    }

    /// `POST` descriptor.
    #[must_use]
    pub fn post(name: &'static str, path: &'static str) -> Self {
        Self::new(name, Method::POST, path)
    }

    /// `PUT` descriptor.
    #[must_use]
    pub fn put(name: &'static str, path: &'static str) -> Self {
        Self::new(name, Method::PUT, path)
    }

    /// `PATCH` descriptor.
    #[must_use]
    pub fn patch(name: &'static str, path: &'static str) -> Self {
        Self::new(name, Method::PATCH, path)
    }

    /// `DELETE` descriptor.
    #[must_use]
    pub fn delete(name: &'static str, path: &'static str) -> Self {
        Self::new(name, Method::DELETE, path)
    }

    /// Marks the endpoint as requiring an authenticated caller.
    #[must_use]
    pub fn require_auth(mut self) -> Self {
        self.auth = AuthRequirement::Required;
        self
    }

    /// Returns the operation name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template relative to the group it is mounted in.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the auth requirement.
    #[must_use]
    pub const fn auth(&self) -> AuthRequirement {
        self.auth
    }
}

impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.method, self.path, self.name)
    }
}

/// A declared API operation.
pub trait Endpoint: Send + Sync + 'static {
    /// Typed input assembled from path, query and body.
    type Input: Send + 'static;

    /// Typed output. Use [`NoContent`] for empty responses and
    /// [`EventStream`] for server-sent event streams.
    type Output: Send + 'static;

    /// Returns the endpoint's static metadata.
    fn descriptor() -> EndpointDescriptor;
}

/// Output marker for endpoints that succeed with `204 No Content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoContent;

/// Output marker for endpoints that answer with a server-sent event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventStream;
