//! The [`DecodeInput`] trait.

use crate::DecodedInput;
use hermes_core::DecodeError;

/// Types that can be assembled from a [`DecodedInput`].
///
/// An endpoint's `Input` type implements this. The provided extractors
/// ([`Path`](crate::Path), [`Query`](crate::Query), [`Json`](crate::Json),
/// [`RawBody`](crate::RawBody)) compose as tuples; custom inputs can
/// implement it by hand using the typed accessors on `DecodedInput`.
///
/// # Implementing `DecodeInput`
///
/// ```rust
/// use hermes_extract::{DecodeInput, DecodedInput};
/// use hermes_core::DecodeError;
///
/// struct ListChats {
///     book_id: String,
///     limit: Option<u32>,
///     offset: Option<u32>,
/// }
///
/// impl DecodeInput for ListChats {
///     fn decode(input: &DecodedInput) -> Result<Self, DecodeError> {
///         Ok(Self {
///             book_id: input.path("bookId")?,
///             limit: input.query("limit")?,
///             offset: input.query("offset")?,
///         })
///     }
/// }
///
/// let input = DecodedInput::builder()
///     .path_param("bookId", "book-123")
///     .query_param("limit", "25")
///     .build();
/// let list = ListChats::decode(&input).unwrap();
/// assert_eq!(list.book_id, "book-123");
/// assert_eq!(list.limit, Some(25));
/// assert_eq!(list.offset, None);
/// ```
pub trait DecodeInput: Sized {
    /// Assembles this type from the decoded request.
    fn decode(input: &DecodedInput) -> Result<Self, DecodeError>;
}

impl DecodeInput for () {
    fn decode(_input: &DecodedInput) -> Result<Self, DecodeError> {
        Ok(())
    }
}

impl DecodeInput for DecodedInput {
    fn decode(input: &DecodedInput) -> Result<Self, DecodeError> {
        Ok(input.clone())
    }
}

macro_rules! impl_decode_input_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: DecodeInput),*> DecodeInput for ($($T,)*) {
            fn decode(input: &DecodedInput) -> Result<Self, DecodeError> {
                Ok(($($T::decode(input)?,)*))
            }
        }
    };
}

impl_decode_input_for_tuple!(T1);
impl_decode_input_for_tuple!(T1, T2);
impl_decode_input_for_tuple!(T1, T2, T3);
impl_decode_input_for_tuple!(T1, T2, T3, T4);
