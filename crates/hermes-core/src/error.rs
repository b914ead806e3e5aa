//! Error types for Hermes.
//!
//! Every failure that can happen between the wire and a handler converges on
//! [`HermesError`]. The error translation middleware is the only place that
//! turns one into a response, using [`HermesError::to_error_response`].
//!
//! | Variant | Status | `errorCode` |
//! |---|---|---|
//! | [`HermesError::Api`] | carried by the error | carried by the error |
//! | [`HermesError::Auth`] | 401 | `UNAUTHORIZED` |
//! | [`HermesError::Decode`] | 400 | `BAD_REQUEST` |
//! | [`HermesError::Abort`] | carried by the abort | `HTTP_ABORT` |
//! | [`HermesError::Internal`] | 500 | `INTERNAL_SERVER_ERROR` |

use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using [`HermesError`].
pub type HermesResult<T> = Result<T, HermesError>;

/// Fixed error code used for transport aborts.
pub const ABORT_ERROR_CODE: &str = "HTTP_ABORT";

/// Error code used for uncategorized failures.
pub const INTERNAL_ERROR_CODE: &str = "INTERNAL_SERVER_ERROR";

/// Message returned to clients for uncategorized failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// The four disjoint error categories plus the uncategorized fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Raised by handler or business logic with its own status and code.
    Domain,
    /// A required identity was missing.
    Authentication,
    /// Path, query or body data did not match the declared input.
    Decode,
    /// Abort-with-status signal from the transport or router.
    Abort,
    /// Anything else.
    Uncategorized,
}

/// A domain error raised by handler code.
///
/// Carries its own HTTP status, a short symbolic code and a message.
///
/// # Example
///
/// ```
/// use hermes_core::ApiError;
/// use http::StatusCode;
///
/// let err = ApiError::not_found("book book-123 does not exist");
/// assert_eq!(err.status(), StatusCode::NOT_FOUND);
/// assert_eq!(err.code(), "NOT_FOUND");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    status: StatusCode,
    code: String,
    message: String,
}

impl ApiError {
    /// Creates a domain error with an explicit status, code and message.
    #[must_use]
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// 400 with code `BAD_REQUEST`.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 401 with code `UNAUTHORIZED`.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// 403 with code `FORBIDDEN`.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// 404 with code `NOT_FOUND`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// 409 with code `CONFLICT`.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    /// 422 with code `UNPROCESSABLE_ENTITY`.
    #[must_use]
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "UNPROCESSABLE_ENTITY",
            message,
        )
    }

    /// 429 with code `TOO_MANY_REQUESTS`.
    #[must_use]
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "TOO_MANY_REQUESTS", message)
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the symbolic error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The endpoint requires an identity and none was attached.
    #[error("authentication required")]
    Unauthorized,

    /// A presented token was rejected by the verifier.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The verifier itself failed.
    #[error("token verification failed: {0}")]
    Provider(String),
}

/// Where a request value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    /// A router-captured path parameter.
    Path,
    /// A query-string parameter.
    Query,
    /// The request body.
    Body,
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => f.write_str("path"),
            Self::Query => f.write_str("query"),
            Self::Body => f.write_str("body"),
        }
    }
}

/// Request data did not match an endpoint's declared input.
///
/// Each variant renders a description built from the specific structural
/// failure; they all map to 400 `BAD_REQUEST`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A required key was absent.
    #[error("missing key '{key}' in {location}")]
    MissingKey {
        /// Where the key was expected.
        location: ParamSource,
        /// The missing key.
        key: String,
    },

    /// A value had the wrong type.
    #[error("type mismatch in {location}: {detail}")]
    TypeMismatch {
        /// Where the value came from.
        location: ParamSource,
        /// What went wrong, e.g. `invalid type: string "x", expected u32`.
        detail: String,
    },

    /// A value was present but null or empty where one was required.
    #[error("missing value in {location}: {detail}")]
    MissingValue {
        /// Where the value came from.
        location: ParamSource,
        /// What was missing.
        detail: String,
    },

    /// The payload could not be parsed at all.
    #[error("corrupted {location} payload: {detail}")]
    Corrupted {
        /// Where the payload came from.
        location: ParamSource,
        /// Parser diagnostics.
        detail: String,
    },

    /// A single named parameter failed to parse.
    #[error("invalid {location} parameter '{name}': {reason}")]
    InvalidParameter {
        /// Where the parameter came from.
        location: ParamSource,
        /// Parameter name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl DecodeError {
    /// Creates a [`DecodeError::MissingKey`].
    #[must_use]
    pub fn missing_key(location: ParamSource, key: impl Into<String>) -> Self {
        Self::MissingKey {
            location,
            key: key.into(),
        }
    }

    /// Creates a [`DecodeError::InvalidParameter`].
    #[must_use]
    pub fn invalid_parameter(
        location: ParamSource,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            location,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Classifies a `serde_json` failure into one of the structural variants.
    #[must_use]
    pub fn from_json(location: ParamSource, err: &serde_json::Error) -> Self {
        use serde_json::error::Category;

        let detail = err.to_string();
        match err.classify() {
            Category::Syntax | Category::Eof | Category::Io => Self::Corrupted { location, detail },
            Category::Data => Self::from_data_message(location, detail),
        }
    }

    /// Classifies a serde data-model message, as produced by `serde_json`
    /// or `serde_urlencoded`.
    #[must_use]
    pub fn from_data_message(location: ParamSource, detail: String) -> Self {
        if let Some(key) = missing_field_name(&detail) {
            return Self::MissingKey { location, key };
        }
        if detail.starts_with("invalid type: null") {
            return Self::MissingValue { location, detail };
        }
        Self::TypeMismatch { location, detail }
    }

    /// Returns where the failing value came from.
    #[must_use]
    pub const fn location(&self) -> ParamSource {
        match self {
            Self::MissingKey { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::MissingValue { location, .. }
            | Self::Corrupted { location, .. }
            | Self::InvalidParameter { location, .. } => *location,
        }
    }
}

// serde formats these as "missing field `name`" optionally followed by " at line ..".
fn missing_field_name(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Standard error type for Hermes.
///
/// # Example
///
/// ```
/// use hermes_core::{ApiError, HermesError, HermesResult};
///
/// fn find_book(id: &str) -> HermesResult<String> {
///     if id.is_empty() {
///         return Err(ApiError::bad_request("empty book id").into());
///     }
///     Ok(id.to_string())
/// }
///
/// let err = find_book("").unwrap_err();
/// assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum HermesError {
    /// Domain error raised by a handler.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Authentication failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request data did not match the declared input.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Abort-with-status from the transport or router.
    #[error("request aborted with {status}: {reason}")]
    Abort {
        /// Status to respond with.
        status: StatusCode,
        /// Why the request was aborted.
        reason: String,
    },

    /// Anything else.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HermesError {
    /// Creates a transport abort.
    #[must_use]
    pub fn abort(status: StatusCode, reason: impl Into<String>) -> Self {
        Self::Abort {
            status,
            reason: reason.into(),
        }
    }

    /// Creates an uncategorized internal error from a message.
    #[must_use]
    pub fn internal(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Internal(anyhow::Error::msg(message))
    }

    /// Returns the category this error falls into.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Api(_) => ErrorCategory::Domain,
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Decode(_) => ErrorCategory::Decode,
            Self::Abort { .. } => ErrorCategory::Abort,
            Self::Internal(_) => ErrorCategory::Uncategorized,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Api(err) => err.status(),
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Abort { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::Api(err) => err.code(),
            Self::Auth(_) => "UNAUTHORIZED",
            Self::Decode(_) => "BAD_REQUEST",
            Self::Abort { .. } => ABORT_ERROR_CODE,
            Self::Internal(_) => INTERNAL_ERROR_CODE,
        }
    }

    /// Converts this error to its wire representation.
    ///
    /// Internal error details are only included when `expose_internal` is set.
    #[must_use]
    pub fn to_error_response(&self, expose_internal: bool) -> ErrorResponse {
        let message = match self {
            Self::Api(err) => err.message().to_string(),
            Self::Abort { reason, .. } => reason.clone(),
            Self::Internal(err) if expose_internal => format!("{err:#}"),
            Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            Self::Auth(err) => err.to_string(),
            Self::Decode(err) => err.to_string(),
        };
        ErrorResponse::new(self.error_code(), message)
    }
}

/// Wire-level error body: `{ "errorCode": ..., "message": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Short symbolic code.
    pub error_code: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates an error body.
    #[must_use]
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }

    /// Serializes the body to JSON bytes.
    #[must_use]
    pub fn to_json_bytes(&self) -> Bytes {
        match serde_json::to_vec(self) {
            Ok(body) => Bytes::from(body),
            Err(_) => Bytes::from_static(
                br#"{"errorCode":"INTERNAL_SERVER_ERROR","message":"An internal server error occurred"}"#,
            ),
        }
    }
}
