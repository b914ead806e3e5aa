//! Radix tree node implementation.
//!
//! Each node stands for one path segment. Parameter children are unnamed in
//! the tree; names live on the registered [`Route`] so that routes sharing a
//! prefix may name the same position differently.

use crate::error::RouteError;
use crate::method_router::{MethodRouter, Route};
use crate::template::Segment;
use http::Method;
use smallvec::SmallVec;

/// Raw (still percent-encoded) values captured for parameter segments.
pub(crate) type Captures<'p> = SmallVec<[&'p str; 4]>;

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    segment: String,
    methods: Option<MethodRouter<T>>,
    /// Sorted by segment for binary search.
    static_children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            methods: None,
            static_children: Vec::new(),
            param_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new("")
    }

    /// Inserts a route at the position described by its template.
    pub fn insert(&mut self, method: Method, route: Route<T>) -> Result<(), RouteError> {
        let segments = route.template.segments().to_vec();
        self.insert_segments(&segments, method, route)
    }

    fn insert_segments(
        &mut self,
        segments: &[Segment],
        method: Method,
        route: Route<T>,
    ) -> Result<(), RouteError> {
        let Some((first, remaining)) = segments.split_first() else {
            return self
                .methods
                .get_or_insert_with(MethodRouter::new)
                .insert(method, route);
        };

        match first {
            Segment::Literal(lit) => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(lit))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children.insert(index, Node::new(lit.clone()));
                        index
                    }
                };
                self.static_children[index].insert_segments(remaining, method, route)
            }
            Segment::Param(_) => self
                .param_child
                .get_or_insert_with(|| Box::new(Node::new(":")))
                .insert_segments(remaining, method, route),
        }
    }

    /// Matches a request path against the tree.
    ///
    /// Only nodes whose method router satisfies `accept` count as a match, so
    /// a static node without the requested method does not shadow a
    /// parameter route that has it. Returns the method router of the matched
    /// node and the raw values of the parameter segments, in order.
    pub(crate) fn match_path<'a, 'p, F>(
        &'a self,
        path: &'p str,
        accept: &F,
    ) -> Option<(&'a MethodRouter<T>, Captures<'p>)>
    where
        F: Fn(&MethodRouter<T>) -> bool,
    {
        let segments: SmallVec<[&str; 8]> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut captures = Captures::new();
        let methods = self.match_segments(&segments, &mut captures, accept)?;
        Some((methods, captures))
    }

    fn match_segments<'a, 'p, F>(
        &'a self,
        segments: &[&'p str],
        captures: &mut Captures<'p>,
        accept: &F,
    ) -> Option<&'a MethodRouter<T>>
    where
        F: Fn(&MethodRouter<T>) -> bool,
    {
        let Some((&segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref().filter(|m| accept(*m));
        };

        // Static segments win over parameters.
        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, captures, accept) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            captures.push(segment);
            if let Some(found) = child.match_segments(remaining, captures, accept) {
                return Some(found);
            }
            captures.pop();
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Node<T>> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::PathTemplate;

    fn insert(root: &mut Node<&'static str>, method: Method, template: &str, value: &'static str) {
        let route = Route {
            template: PathTemplate::parse(template).unwrap(),
            value,
        };
        root.insert(method, route).unwrap();
    }

    fn lookup<'p>(
        root: &Node<&'static str>,
        method: &Method,
        path: &'p str,
    ) -> Option<(&'static str, Vec<&'p str>)> {
        let (methods, captures) = root.match_path(path, &|m| m.get(method).is_some())?;
        let route = methods.get(method)?;
        Some((route.value, captures.to_vec()))
    }

    #[test]
    fn test_static_match() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/users", "listUsers");

        assert_eq!(lookup(&root, &Method::GET, "/users"), Some(("listUsers", vec![])));
        assert_eq!(lookup(&root, &Method::GET, "/posts"), None);
    }

    #[test]
    fn test_param_capture_is_raw() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/files/:name", "getFile");

        assert_eq!(
            lookup(&root, &Method::GET, "/files/a%2Fb"),
            Some(("getFile", vec!["a%2Fb"]))
        );
    }

    #[test]
    fn test_static_priority_over_param() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/users/me", "getCurrentUser");
        insert(&mut root, Method::GET, "/users/:id", "getUser");

        assert_eq!(
            lookup(&root, &Method::GET, "/users/me"),
            Some(("getCurrentUser", vec![]))
        );
        assert_eq!(
            lookup(&root, &Method::GET, "/users/123"),
            Some(("getUser", vec!["123"]))
        );
    }

    #[test]
    fn test_backtracks_from_static_into_param() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/users/me/settings", "settings");
        insert(&mut root, Method::GET, "/users/:id/profile", "profile");

        // "me" matches the static child first, which has no "profile" below it.
        assert_eq!(
            lookup(&root, &Method::GET, "/users/me/profile"),
            Some(("profile", vec!["me"]))
        );
    }

    #[test]
    fn test_backtracking_pops_failed_captures() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/a/:x/z", "static-first");
        insert(&mut root, Method::GET, "/:y/b/c", "param-first");

        // The static branch captures "b" before failing on "c"; that capture
        // must not leak into the param branch.
        assert_eq!(
            lookup(&root, &Method::GET, "/a/b/c"),
            Some(("param-first", vec!["a"]))
        );
    }

    #[test]
    fn test_static_without_method_falls_through_to_param() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/users/me", "getCurrentUser");
        insert(&mut root, Method::DELETE, "/users/:id", "deleteUser");

        assert_eq!(
            lookup(&root, &Method::DELETE, "/users/me"),
            Some(("deleteUser", vec!["me"]))
        );
    }

    #[test]
    fn test_trailing_and_repeated_slashes() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/api/v1/users", "listUsers");

        assert!(lookup(&root, &Method::GET, "/api/v1/users/").is_some());
        assert!(lookup(&root, &Method::GET, "//api//v1/users").is_some());
    }

    #[test]
    fn test_root_route() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/", "index");
        assert_eq!(lookup(&root, &Method::GET, "/"), Some(("index", vec![])));
    }

    #[test]
    fn test_intermediate_node_without_routes_does_not_match() {
        let mut root = Node::root();
        insert(&mut root, Method::GET, "/api/v1/users", "listUsers");
        assert!(root.match_path("/api/v1", &|m| !m.is_empty()).is_none());
    }
}
