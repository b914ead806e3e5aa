//! Per-request context types.

use crate::error::AuthError;
use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps request ids sortable in logs.
///
/// # Example
///
/// ```
/// use hermes_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses a request id received from a client header.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Authentication state handed to a handler.
///
/// Built once per request from the identity the auth middleware attached and
/// the endpoint's [`AuthRequirement`](crate::AuthRequirement). A handler for a
/// `Required` endpoint only ever observes `Authenticated`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceContext {
    /// No identity was attached.
    #[default]
    Anonymous,
    /// A verified identity was attached.
    Authenticated(Identity),
}

impl ServiceContext {
    /// Returns the identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(identity) => Some(identity),
        }
    }

    /// Returns the authenticated user id, if any.
    #[must_use]
    pub fn authenticated_user_id(&self) -> Option<&str> {
        self.identity().map(Identity::user_id)
    }

    /// Returns `true` when an identity is attached.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the identity or [`AuthError::Unauthorized`].
    ///
    /// Useful in handlers of public endpoints that want to gate a branch.
    pub fn require_identity(&self) -> Result<&Identity, AuthError> {
        self.identity().ok_or(AuthError::Unauthorized)
    }
}
