//! Captured path parameters.

use percent_encoding::percent_decode_str;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Maximum number of parameters stored inline.
const INLINE_PARAMS: usize = 4;

/// Path parameters captured by a route match, in template order.
///
/// Values are percent-decoded. The path is split on `/` before decoding, so
/// an encoded slash (`%2F`) ends up inside a value instead of creating a new
/// segment.
///
/// # Example
///
/// ```rust
/// use hermes_router::Params;
///
/// let mut params = Params::new();
/// params.push_encoded("path", "a%2Fb");
///
/// assert_eq!(params.get("path"), Some("a/b"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an already-decoded parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Adds a parameter from a raw path segment, percent-decoding it.
    ///
    /// Invalid UTF-8 after decoding is replaced with U+FFFD.
    pub fn push_encoded(&mut self, name: impl Into<String>, raw: &str) {
        let value = percent_decode_str(raw).decode_utf8_lossy().into_owned();
        self.inner.push((name.into(), value));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Converts the parameters into a name-to-value map.
    #[must_use]
    pub fn into_map(self) -> HashMap<String, String> {
        self.inner.into_iter().collect()
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
