//! Radix tree router for Hermes.
//!
//! Maps `(method, path)` to a value, typically a dispatch unit, and captures
//! named path parameters.
//!
//! # Features
//!
//! - **Path templates**: `:name` parameters (or `{name}`), composable with
//!   [`PathTemplate::join`] for nested groups
//! - **Percent-decoded parameters**: `%2F` inside a segment becomes `/` in the
//!   captured value without creating a new segment
//! - **404 vs 405**: [`MatchError`] tells an unknown path from a known path
//!   with the wrong method
//!
//! # Example
//!
//! ```rust
//! use hermes_router::{PathTemplate, Router};
//! use http::Method;
//!
//! let base = PathTemplate::parse("/v1/books/:bookId").unwrap();
//! let full = base.join(&PathTemplate::parse("/chats/:chatId").unwrap()).unwrap();
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, full, "getChat").unwrap();
//!
//! let found = router.match_route(&Method::GET, "/v1/books/b-1/chats/c-2").unwrap();
//! assert_eq!(found.params.get("bookId"), Some("b-1"));
//! assert_eq!(found.params.get("chatId"), Some("c-2"));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!                     "v1"
//!                      │
//!                   "books"
//!                      │
//!                     ":"          parameter children are unnamed
//!                      │
//!                   "chats"
//!                      │
//!                     ":"
//!                   [GET]          the route carries the full template
//! ```

mod error;
mod method_router;
mod node;
mod params;
mod router;
mod template;

pub use error::{MatchError, RouteError};
pub use method_router::{MethodRouter, Route};
pub use node::Node;
pub use params::Params;
pub use router::Router;
pub use template::{PathTemplate, Segment};

/// A resolved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The routed value.
    pub value: &'a T,
    /// The full template the route was registered with.
    pub template: &'a PathTemplate,
    /// Captured, percent-decoded path parameters.
    pub params: Params,
}
