//! Query string decoding and the [`Query`] extractor.

use crate::{DecodeInput, DecodedInput};
use hermes_core::{DecodeError, ParamSource};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::ops::Deref;

/// Parses a raw query string into a map.
///
/// Pairs are split on `&`, then on the first `=`. Keys and values are
/// percent-decoded. A repeated key keeps its last value. A pair without `=`
/// and a pair with an empty key are ignored. `+` is kept as a literal plus.
///
/// # Example
///
/// ```rust
/// use hermes_extract::parse_query;
///
/// let params = parse_query("limit=10&flag&name=caf%C3%A9&limit=20");
/// assert_eq!(params.get("limit").map(String::as_str), Some("20"));
/// assert_eq!(params.get("name").map(String::as_str), Some("café"));
/// assert!(!params.contains_key("flag"));
/// ```
#[must_use]
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in raw.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        params.insert(key, decode_component(value));
    }
    params
}

fn decode_component(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Deserializes the query parameters into `T`.
///
/// Values are coerced by `serde_urlencoded`, so numeric and boolean fields
/// work. Use `Option<T>` fields for optional parameters.
///
/// # Example
///
/// ```rust
/// use hermes_extract::{DecodeInput, DecodedInput, Query};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Page {
///     limit: Option<u32>,
///     offset: Option<u32>,
/// }
///
/// let input = DecodedInput::builder().query_param("limit", "10").build();
/// let Query(page) = Query::<Page>::decode(&input).unwrap();
/// assert_eq!(page.limit, Some(10));
/// assert_eq!(page.offset, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Consumes the Query and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Query<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> DecodeInput for Query<T> {
    fn decode(input: &DecodedInput) -> Result<Self, DecodeError> {
        deserialize_map(ParamSource::Query, input.query_params()).map(Query)
    }
}

/// Re-encodes an already-decoded map so that `serde_urlencoded` can coerce
/// the string values into the target field types.
pub(crate) fn deserialize_map<T: DeserializeOwned>(
    source: ParamSource,
    map: &HashMap<String, String>,
) -> Result<T, DecodeError> {
    let encoded = serde_urlencoded::to_string(map).map_err(|e| DecodeError::Corrupted {
        location: source,
        detail: e.to_string(),
    })?;
    serde_urlencoded::from_str(&encoded)
        .map_err(|e| DecodeError::from_data_message(source, e.to_string()))
}
