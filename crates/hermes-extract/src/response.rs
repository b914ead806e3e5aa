//! Response encoding.
//!
//! | Function | Status | Body |
//! |---|---|---|
//! | [`encode_json`] | 200 | JSON value |
//! | [`JsonResponse`] | configurable | JSON value |
//! | [`no_content`] | 204 | empty |
//! | [`error_response`] | from the error | `{ "errorCode", "message" }` |

use bytes::Bytes;
use hermes_core::{Body, HermesError, HermesResult, Response};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde::Serialize;

/// Builds a JSON response from already-serialized bytes.
#[must_use]
pub fn json_bytes_response(status: StatusCode, body: Bytes) -> Response {
    let mut response = Response::new(Body::full(body));
    *response.status_mut() = status;
    let content_type = HeaderValue::from_static("application/json");
    response.headers_mut().insert(CONTENT_TYPE, content_type);
    response
}

/// Serializes `value` into a `200 OK` JSON response.
///
/// `chrono` timestamps serialize as ISO-8601 strings. A serialization failure
/// is a programming error; it is logged and surfaces as an internal error.
///
/// # Example
///
/// ```rust
/// use hermes_extract::encode_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Book {
///     title: String,
/// }
///
/// let response = encode_json(&Book { title: "Dune".into() }).unwrap();
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.headers()["content-type"], "application/json");
/// ```
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> HermesResult<Response> {
    JsonResponse::new(value).into_response()
}

/// An empty `204 No Content` response.
#[must_use]
pub fn no_content() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

/// Converts an error into its JSON wire response.
///
/// Equal errors always produce byte-identical bodies.
#[must_use]
pub fn error_response(error: &HermesError, expose_internal: bool) -> Response {
    let body = error.to_error_response(expose_internal).to_json_bytes();
    json_bytes_response(error.status_code(), body)
}

/// JSON response builder with a configurable status.
///
/// # Example
///
/// ```rust
/// use hermes_extract::JsonResponse;
///
/// let response = JsonResponse::created(&vec![1, 2, 3]).into_response().unwrap();
/// assert_eq!(response.status(), http::StatusCode::CREATED);
/// ```
#[derive(Debug)]
pub struct JsonResponse<'a, T: ?Sized> {
    data: &'a T,
    status: StatusCode,
}

impl<'a, T: Serialize + ?Sized> JsonResponse<'a, T> {
    /// Creates a new JSON response with status 200 OK.
    #[must_use]
    pub const fn new(data: &'a T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    /// Creates a JSON response with status 201 Created.
    #[must_use]
    pub const fn created(data: &'a T) -> Self {
        Self {
            data,
            status: StatusCode::CREATED,
        }
    }

    /// Sets a custom status code.
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Builds the HTTP response.
    pub fn into_response(self) -> HermesResult<Response> {
        let body = serde_json::to_vec(self.data).map_err(|e| {
            tracing::error!(error = %e, "response serialization failed");
            HermesError::Internal(anyhow::Error::new(e).context("response serialization failed"))
        })?;
        Ok(json_bytes_response(self.status, Bytes::from(body)))
    }
}
