//! Service context construction.

use hermes_core::{AuthError, AuthRequirement, Identity, ServiceContext};

/// Derives the [`ServiceContext`] a handler receives.
///
/// `identity` is whatever the auth middleware attached; this function never
/// verifies credentials itself.
///
/// | Requirement | Identity | Result |
/// |---|---|---|
/// | `None` | present | `Authenticated` |
/// | `None` | absent | `Anonymous` |
/// | `Required` | present | `Authenticated` |
/// | `Required` | absent | `Err(AuthError::Unauthorized)` |
///
/// # Example
///
/// ```rust
/// use hermes_core::{AuthError, AuthRequirement, Identity, ServiceContext};
/// use hermes_extract::build_service_context;
///
/// let ctx = build_service_context(AuthRequirement::None, None).unwrap();
/// assert_eq!(ctx, ServiceContext::Anonymous);
///
/// let err = build_service_context(AuthRequirement::Required, None).unwrap_err();
/// assert_eq!(err, AuthError::Unauthorized);
/// ```
pub fn build_service_context(
    requirement: AuthRequirement,
    identity: Option<&Identity>,
) -> Result<ServiceContext, AuthError> {
    match (identity, requirement) {
        (Some(identity), _) => Ok(ServiceContext::Authenticated(identity.clone())),
        (None, AuthRequirement::None) => Ok(ServiceContext::Anonymous),
        (None, AuthRequirement::Required) => Err(AuthError::Unauthorized),
    }
}
