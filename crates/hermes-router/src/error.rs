//! Router errors.

use http::Method;
use thiserror::Error;

/// Errors raised while building the route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The template could not be parsed.
    #[error("invalid path template '{template}': {reason}")]
    InvalidTemplate {
        /// The offending template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A parameter name appears twice in one full path.
    #[error("duplicate parameter '{name}' in '{template}'")]
    DuplicateParam {
        /// The full template.
        template: String,
        /// The repeated name.
        name: String,
    },

    /// The (method, path) pair is already bound.
    #[error("route {method} {path} is already registered")]
    Conflict {
        /// Method of the existing route.
        method: Method,
        /// Path of the existing route.
        path: String,
    },

    /// Only the standard methods can be routed.
    #[error("unsupported method {0}")]
    UnsupportedMethod(Method),
}

impl RouteError {
    pub(crate) fn invalid(template: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

/// Why a request did not resolve to a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// No template matches the path.
    #[error("no route matches the path")]
    NotFound,

    /// The path matches but not for this method.
    #[error("method not allowed")]
    MethodNotAllowed {
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },
}
