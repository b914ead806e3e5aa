//! Path parameter extractor.

use crate::query::deserialize_map;
use crate::{DecodeInput, DecodedInput};
use hermes_core::{DecodeError, ParamSource};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Deserializes the path parameters into `T`.
///
/// Field names match parameter names in the full template, including
/// parameters declared by enclosing groups.
///
/// # Example
///
/// ```rust
/// use hermes_extract::{DecodeInput, DecodedInput, Path};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct ChatPath {
///     book_id: String,
///     chat_id: String,
/// }
///
/// let input = DecodedInput::builder()
///     .path_param("bookId", "book-123")
///     .path_param("chatId", "chat-456")
///     .build();
///
/// let Path(path) = Path::<ChatPath>::decode(&input).unwrap();
/// assert_eq!(path.book_id, "book-123");
/// assert_eq!(path.chat_id, "chat-456");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
    /// Consumes the Path and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Path<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> DecodeInput for Path<T> {
    fn decode(input: &DecodedInput) -> Result<Self, DecodeError> {
        deserialize_map(ParamSource::Path, input.path_params()).map(Path)
    }
}
