//! Per-request decoded input.
//!
//! [`decode`] turns a routed request into a [`DecodedInput`]: path parameters
//! resolved from the full template, percent-decoded query parameters and the
//! raw body bytes. Endpoint input types then assemble themselves from it via
//! [`DecodeInput`](crate::DecodeInput).

use crate::query::parse_query;
use crate::{DecodeInput, Json, Path, Query};
use bytes::Bytes;
use hermes_core::{DecodeError, HermesError, ParamSource, Request};
use hermes_router::{Params, PathTemplate};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;

/// Path parameters, query parameters and body of one request.
///
/// # Example
///
/// ```rust
/// use hermes_extract::DecodedInput;
///
/// let input = DecodedInput::builder()
///     .path_param("bookId", "book-123")
///     .query_param("limit", "10")
///     .build();
///
/// assert_eq!(input.path::<String>("bookId").unwrap(), "book-123");
/// assert_eq!(input.query::<u32>("limit").unwrap(), Some(10));
/// assert_eq!(input.query::<u32>("offset").unwrap(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedInput {
    path_params: HashMap<String, String>,
    query_params: HashMap<String, String>,
    body: Option<Bytes>,
}

impl DecodedInput {
    /// Returns a builder, mainly for tests.
    #[must_use]
    pub fn builder() -> DecodedInputBuilder {
        DecodedInputBuilder::default()
    }

    /// Returns all path parameters.
    #[must_use]
    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    /// Returns all query parameters.
    #[must_use]
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Returns the raw body, `None` when the request had none.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Returns a raw path parameter.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Returns a raw query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Parses a path parameter.
    pub fn path<T: FromStr>(&self, name: &str) -> Result<T, DecodeError> {
        let raw = self
            .path_param(name)
            .ok_or_else(|| DecodeError::missing_key(ParamSource::Path, name))?;
        parse_param(ParamSource::Path, name, raw)
    }

    /// Parses an optional query parameter.
    ///
    /// An absent key yields `Ok(None)`. A present value that does not parse is
    /// an error, not `None`.
    pub fn query<T: FromStr>(&self, name: &str) -> Result<Option<T>, DecodeError> {
        self.query_param(name)
            .map(|raw| parse_param(ParamSource::Query, name, raw))
            .transpose()
    }

    /// Parses a required query parameter.
    pub fn required_query<T: FromStr>(&self, name: &str) -> Result<T, DecodeError> {
        self.query(name)?
            .ok_or_else(|| DecodeError::missing_key(ParamSource::Query, name))
    }

    /// Deserializes all path parameters into `T`.
    pub fn path_as<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        Path::<T>::decode(self).map(Path::into_inner)
    }

    /// Deserializes all query parameters into `T`.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        Query::<T>::decode(self).map(Query::into_inner)
    }

    /// Deserializes the JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        Json::<T>::decode(self).map(Json::into_inner)
    }
}

fn parse_param<T: FromStr>(source: ParamSource, name: &str, raw: &str) -> Result<T, DecodeError> {
    raw.parse().map_err(|_| {
        DecodeError::invalid_parameter(
            source,
            name,
            format!("'{raw}' is not a valid {}", short_type_name::<T>()),
        )
    })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Builds a [`DecodedInput`] by hand.
#[derive(Debug, Default)]
pub struct DecodedInputBuilder {
    input: DecodedInput,
}

impl DecodedInputBuilder {
    /// Adds a path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.input.path_params.insert(name.into(), value.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.input.query_params.insert(name.into(), value.into());
        self
    }

    /// Sets the body. An empty body is stored as `None`.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.input.body = (!body.is_empty()).then_some(body);
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> DecodedInput {
        self.input
    }
}

/// Decodes a routed request against the full template it matched.
///
/// Every parameter of `template` must have been captured by the router; a
/// missing one means the template and the route table disagree. That is
/// logged and reported as an internal error rather than a client error.
pub fn decode(
    template: &PathTemplate,
    params: &Params,
    request: &Request,
) -> Result<DecodedInput, HermesError> {
    let mut path_params = HashMap::with_capacity(template.param_count());
    for name in template.param_names() {
        let Some(value) = params.get(name) else {
            tracing::error!(
                template = %template,
                param = name,
                "router match is missing a template parameter"
            );
            return Err(HermesError::internal(format!(
                "path parameter '{name}' was not captured for {template}"
            )));
        };
        path_params.insert(name.to_string(), value.to_string());
    }

    let query_params = request.uri().query().map(parse_query).unwrap_or_default();

    let body = request.body();
    let body = (!body.is_empty()).then(|| body.clone());

    Ok(DecodedInput {
        path_params,
        query_params,
        body,
    })
}
