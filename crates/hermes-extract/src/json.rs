//! Body extractors.

use crate::{DecodeInput, DecodedInput};
use bytes::Bytes;
use hermes_core::{DecodeError, ParamSource};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Deserializes the JSON body into `T`.
///
/// Dates are exchanged as ISO-8601 strings; use `chrono::DateTime<Utc>`
/// fields. An absent body is a [`DecodeError::MissingValue`]. Use
/// `Option<Json<T>>` when the body is optional.
///
/// # Example
///
/// ```rust
/// use hermes_extract::{DecodeInput, DecodedInput, Json};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct CreateBook {
///     title: String,
/// }
///
/// let input = DecodedInput::builder().body(r#"{"title": "Dune"}"#).build();
/// let Json(book) = Json::<CreateBook>::decode(&input).unwrap();
/// assert_eq!(book.title, "Dune");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the Json and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, DecodeError> {
    serde_json::from_slice(body).map_err(|e| DecodeError::from_json(ParamSource::Body, &e))
}

impl<T: DeserializeOwned> DecodeInput for Json<T> {
    fn decode(input: &DecodedInput) -> Result<Self, DecodeError> {
        let body = input.body().ok_or_else(|| DecodeError::MissingValue {
            location: ParamSource::Body,
            detail: "request body is empty".to_string(),
        })?;
        parse_json(body).map(Json)
    }
}

// A malformed body is still an error; only an absent one is `None`.
impl<T: DeserializeOwned> DecodeInput for Option<Json<T>> {
    fn decode(input: &DecodedInput) -> Result<Self, DecodeError> {
        input.body().map(|body| parse_json(body).map(Json)).transpose()
    }
}

/// The raw body bytes, empty when the request had none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawBody(pub Bytes);

impl DecodeInput for RawBody {
    fn decode(input: &DecodedInput) -> Result<Self, DecodeError> {
        Ok(RawBody(input.body().cloned().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct CreateChat {
        title: String,
        created_at: DateTime<Utc>,
    }

    fn body(json: &'static str) -> DecodedInput {
        DecodedInput::builder().body(json).build()
    }

    #[test]
    fn test_json_with_iso8601_date() {
        let Json(chat) = Json::<CreateChat>::decode(&body(
            r#"{"title": "Chapter 1", "createdAt": "2024-03-01T12:30:00Z"}"#,
        ))
        .unwrap();

        assert_eq!(chat.title, "Chapter 1");
        assert_eq!(
            chat.created_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_json_failures_are_classified() {
        let missing = Json::<CreateChat>::decode(&body(r#"{"title": "x"}"#)).unwrap_err();
        assert_eq!(missing, DecodeError::missing_key(ParamSource::Body, "createdAt"));

        let bad_date = Json::<CreateChat>::decode(&body(
            r#"{"title": "x", "createdAt": "yesterday"}"#,
        ))
        .unwrap_err();
        assert!(matches!(bad_date, DecodeError::TypeMismatch { .. }));

        let corrupted = Json::<CreateChat>::decode(&body("{not json")).unwrap_err();
        assert!(matches!(corrupted, DecodeError::Corrupted { .. }));
    }

    #[test]
    fn test_json_requires_body() {
        let err = Json::<CreateChat>::decode(&DecodedInput::default()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingValue { .. }));
        assert_eq!(err.to_string(), "missing value in body: request body is empty");
    }

    #[test]
    fn test_optional_json() {
        assert_eq!(
            Option::<Json<CreateChat>>::decode(&DecodedInput::default()).unwrap(),
            None
        );
        assert!(Option::<Json<CreateChat>>::decode(&body("[]")).is_err());
    }

    #[test]
    fn test_raw_body() {
        let RawBody(bytes) = RawBody::decode(&body("plain text")).unwrap();
        assert_eq!(bytes, Bytes::from_static(b"plain text"));

        let RawBody(empty) = RawBody::decode(&DecodedInput::default()).unwrap();
        assert!(empty.is_empty());
    }
}
