//! HTTP method-based routing.
//!
//! [`MethodRouter`] maps HTTP methods to routes for a single path shape.

use crate::error::RouteError;
use crate::template::PathTemplate;
use http::Method;

/// A route bound to one method at one path shape.
#[derive(Debug, Clone)]
pub struct Route<T> {
    /// The full template the route was registered with.
    pub template: PathTemplate,
    /// The routed value, typically a dispatch unit.
    pub value: T,
}

/// Maps HTTP methods to routes for a single path shape.
///
/// Two templates that differ only in parameter names share a path shape,
/// so `GET /books/:id` and `DELETE /books/:bookId` live in the same
/// `MethodRouter` and keep their own parameter names.
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    get: Option<Route<T>>,
    post: Option<Route<T>>,
    put: Option<Route<T>>,
    delete: Option<Route<T>>,
    patch: Option<Route<T>>,
    head: Option<Route<T>>,
    options: Option<Route<T>>,
    trace: Option<Route<T>>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            get: None,
            post: None,
            put: None,
            delete: None,
            patch: None,
            head: None,
            options: None,
            trace: None,
        }
    }
}

const ROUTABLE: [Method; 8] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
];

impl<T> MethodRouter<T> {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, method: &Method) -> Option<&Option<Route<T>>> {
        match *method {
            Method::GET => Some(&self.get),
            Method::POST => Some(&self.post),
            Method::PUT => Some(&self.put),
            Method::DELETE => Some(&self.delete),
            Method::PATCH => Some(&self.patch),
            Method::HEAD => Some(&self.head),
            Method::OPTIONS => Some(&self.options),
            Method::TRACE => Some(&self.trace),
            _ => None,
        }
    }

    fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<Route<T>>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::POST => Some(&mut self.post),
            Method::PUT => Some(&mut self.put),
            Method::DELETE => Some(&mut self.delete),
            Method::PATCH => Some(&mut self.patch),
            Method::HEAD => Some(&mut self.head),
            Method::OPTIONS => Some(&mut self.options),
            Method::TRACE => Some(&mut self.trace),
            _ => None,
        }
    }

    /// Binds `route` to `method`.
    ///
    /// Fails if the method is already bound or is not a standard method.
    pub fn insert(&mut self, method: Method, route: Route<T>) -> Result<(), RouteError> {
        let Some(slot) = self.slot_mut(&method) else {
            return Err(RouteError::UnsupportedMethod(method));
        };
        if let Some(existing) = slot {
            return Err(RouteError::Conflict {
                method,
                path: existing.template.to_string(),
            });
        }
        *slot = Some(route);
        Ok(())
    }

    /// Returns the route bound to `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&Route<T>> {
        self.slot(method).and_then(Option::as_ref)
    }

    /// Returns the methods with a bound route, in a stable order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        ROUTABLE
            .iter()
            .filter(|m| self.get(m).is_some())
            .cloned()
            .collect()
    }

    /// Returns `true` if no method is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        ROUTABLE.iter().all(|m| self.get(m).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(template: &str, value: &'static str) -> Route<&'static str> {
        Route {
            template: PathTemplate::parse(template).unwrap(),
            value,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut router = MethodRouter::new();
        router.insert(Method::GET, route("/users", "listUsers")).unwrap();
        router.insert(Method::POST, route("/users", "createUser")).unwrap();

        assert_eq!(router.get(&Method::GET).map(|r| r.value), Some("listUsers"));
        assert_eq!(router.get(&Method::POST).map(|r| r.value), Some("createUser"));
        assert!(router.get(&Method::DELETE).is_none());
    }

    #[test]
    fn test_conflict_keeps_first_route() {
        let mut router = MethodRouter::new();
        router.insert(Method::GET, route("/users/:id", "first")).unwrap();

        let err = router.insert(Method::GET, route("/users/:userId", "second")).unwrap_err();
        assert_eq!(
            err,
            RouteError::Conflict {
                method: Method::GET,
                path: "/users/:id".to_string()
            }
        );
        assert_eq!(router.get(&Method::GET).map(|r| r.value), Some("first"));
    }

    #[test]
    fn test_unsupported_method() {
        let mut router = MethodRouter::new();
        let err = router.insert(Method::CONNECT, route("/", "tunnel")).unwrap_err();
        assert_eq!(err, RouteError::UnsupportedMethod(Method::CONNECT));
    }

    #[test]
    fn test_allowed_methods_order() {
        let mut router = MethodRouter::new();
        assert!(router.is_empty());
        router.insert(Method::DELETE, route("/x", "d")).unwrap();
        router.insert(Method::GET, route("/x", "g")).unwrap();
        assert_eq!(router.allowed_methods(), vec![Method::GET, Method::DELETE]);
        assert!(!router.is_empty());
    }
}
