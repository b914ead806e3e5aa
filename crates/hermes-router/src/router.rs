//! High-level router API.

use http::Method;

use crate::error::{MatchError, RouteError};
use crate::method_router::Route;
use crate::node::Node;
use crate::params::Params;
use crate::template::PathTemplate;
use crate::RouteMatch;

/// A radix tree router mapping `(method, path)` to values of type `T`.
///
/// Mutated only while routes are registered; lookups take `&self`.
///
/// # Example
///
/// ```rust
/// use hermes_router::{MatchError, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(Method::GET, "/users/:id".parse().unwrap(), "getUser").unwrap();
///
/// let found = router.match_route(&Method::GET, "/users/123").unwrap();
/// assert_eq!(*found.value, "getUser");
/// assert_eq!(found.params.get("id"), Some("123"));
///
/// assert_eq!(
///     router.match_route(&Method::POST, "/users/123").unwrap_err(),
///     MatchError::MethodNotAllowed { allowed: vec![Method::GET] },
/// );
/// ```
///
/// # Route Priority
///
/// A static segment is tried before a parameter at the same position; when
/// the static branch does not lead to a route for the requested method, the
/// parameter branch is tried.
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Binds `value` to `method` at `template`.
    ///
    /// Fails if the same method is already bound to a template of the same
    /// shape (same literals, parameters at the same positions).
    pub fn insert(
        &mut self,
        method: Method,
        template: PathTemplate,
        value: T,
    ) -> Result<(), RouteError> {
        self.root.insert(method, Route { template, value })?;
        self.route_count += 1;
        Ok(())
    }

    /// Resolves a request.
    ///
    /// Path parameters in the result are named after the matched template and
    /// percent-decoded.
    pub fn match_route(&self, method: &Method, path: &str) -> Result<RouteMatch<'_, T>, MatchError> {
        if let Some((methods, captures)) = self
            .root
            .match_path(path, &|m| m.get(method).is_some())
        {
            if let Some(route) = methods.get(method) {
                let mut params = Params::new();
                for (name, raw) in route.template.param_names().zip(captures) {
                    params.push_encoded(name, raw);
                }
                return Ok(RouteMatch {
                    value: &route.value,
                    template: &route.template,
                    params,
                });
            }
        }

        match self.root.match_path(path, &|m| !m.is_empty()) {
            Some((methods, _)) => Err(MatchError::MethodNotAllowed {
                allowed: methods.allowed_methods(),
            }),
            None => Err(MatchError::NotFound),
        }
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(routes: &[(Method, &str, &'static str)]) -> Router<&'static str> {
        let mut router = Router::new();
        for (method, template, value) in routes {
            router
                .insert(method.clone(), PathTemplate::parse(template).unwrap(), *value)
                .unwrap();
        }
        router
    }

    #[test]
    fn test_router_new() {
        let router: Router<()> = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn test_nested_params_resolved_by_name() {
        let router = router(&[(
            Method::GET,
            "/v1/books/:bookId/chats/:chatId",
            "getChat",
        )]);

        let found = router
            .match_route(&Method::GET, "/v1/books/book-123/chats/chat-456")
            .unwrap();
        assert_eq!(*found.value, "getChat");
        assert_eq!(found.params.get("bookId"), Some("book-123"));
        assert_eq!(found.params.get("chatId"), Some("chat-456"));
        assert_eq!(found.template.to_string(), "/v1/books/:bookId/chats/:chatId");
    }

    #[test]
    fn test_sibling_routes_name_params_independently() {
        let router = router(&[
            (Method::GET, "/books/:id", "getBook"),
            (Method::GET, "/books/:bookId/chats", "listChats"),
        ]);

        let book = router.match_route(&Method::GET, "/books/b1").unwrap();
        assert_eq!(book.params.get("id"), Some("b1"));

        let chats = router.match_route(&Method::GET, "/books/b1/chats").unwrap();
        assert_eq!(chats.params.get("bookId"), Some("b1"));
        assert_eq!(chats.params.get("id"), None);
    }

    #[test]
    fn test_encoded_slash_stays_in_value() {
        let router = router(&[(Method::GET, "/files/:name", "getFile")]);

        let found = router.match_route(&Method::GET, "/files/a%2Fb.txt").unwrap();
        assert_eq!(found.params.get("name"), Some("a/b.txt"));
    }

    #[test]
    fn test_not_found_and_method_not_allowed() {
        let router = router(&[
            (Method::GET, "/users", "listUsers"),
            (Method::POST, "/users", "createUser"),
        ]);

        assert_eq!(
            router.match_route(&Method::GET, "/posts").unwrap_err(),
            MatchError::NotFound
        );
        assert_eq!(
            router.match_route(&Method::DELETE, "/users").unwrap_err(),
            MatchError::MethodNotAllowed {
                allowed: vec![Method::GET, Method::POST]
            }
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut router = router(&[(Method::GET, "/users/:id", "getUser")]);
        let err = router
            .insert(
                Method::GET,
                PathTemplate::parse("/users/:userId").unwrap(),
                "again",
            )
            .unwrap_err();
        assert!(matches!(err, RouteError::Conflict { .. }));
        assert_eq!(router.len(), 1);
    }

    proptest::proptest! {
        #[test]
        fn prop_any_encoded_segment_decodes_to_original(value in "\\PC{1,24}") {
            use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

            let router = router(&[(Method::GET, "/files/:name", "getFile")]);
            let path = format!("/files/{}", utf8_percent_encode(&value, NON_ALPHANUMERIC));

            let found = router.match_route(&Method::GET, &path).unwrap();
            proptest::prop_assert_eq!(found.params.get("name"), Some(value.as_str()));
        }
    }
}
