//! Caller identity established by token verification.

use serde::{Deserialize, Serialize};

/// An authenticated caller.
///
/// Produced by a token verifier and attached to the request by the auth
/// middleware. Handlers see it through [`ServiceContext`](crate::ServiceContext).
///
/// # Example
///
/// ```rust
/// use hermes_core::Identity;
///
/// let identity = Identity::new("user-123").with_role("reader");
/// assert_eq!(identity.log_id(), "user:user-123");
/// assert!(identity.has_role("reader"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    roles: Vec<String>,
}

impl Identity {
    /// Creates an identity for the given user id.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: Vec::new(),
        }
    }

    /// Adds a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Returns the user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the roles granted by the verifier.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Returns `true` if the identity carries `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never contains token material.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("user:{}", self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_id() {
        assert_eq!(Identity::new("u123").log_id(), "user:u123");
    }

    #[test]
    fn test_roles() {
        let identity = Identity::new("u123").with_role("admin").with_role("user");
        assert_eq!(identity.roles(), ["admin", "user"]);
        assert!(identity.has_role("admin"));
        assert!(!identity.has_role("owner"));
    }

    #[test]
    fn test_serialization_skips_empty_roles() {
        let json = serde_json::to_string(&Identity::new("u123")).expect("serialization should work");
        assert_eq!(json, r#"{"user_id":"u123"}"#);

        let parsed: Identity = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(parsed, Identity::new("u123"));
    }
}
