//! # Hermes Extract
//!
//! Request decoding, service context construction and response encoding.
//!
//! ## Decoding
//!
//! [`decode`] turns a routed request into a [`DecodedInput`] with three
//! disjoint sources. Endpoint input types implement [`DecodeInput`] to
//! assemble themselves from it.
//!
//! | Extractor | Source | Description |
//! |-----------|--------|-------------|
//! | [`Path<T>`] | path parameters | Deserialize parameters of the full template |
//! | [`Query<T>`] | query string | Deserialize percent-decoded query parameters |
//! | [`Json<T>`] | body | Deserialize a JSON body |
//! | [`RawBody`] | body | Raw body bytes |
//!
//! Extractors combine as tuples: `(Path<ChatPath>, Query<Page>)`.
//!
//! ## Service context
//!
//! [`build_service_context`] combines the identity attached by the auth
//! middleware with an endpoint's [`AuthRequirement`](hermes_core::AuthRequirement).
//!
//! ## Encoding
//!
//! [`encode_json`], [`no_content`] and [`error_response`] build the
//! buffered responses; event streams live in `hermes-sse`.

#![doc(html_root_url = "https://docs.rs/hermes-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod decoded;
mod extractor;
mod json;
mod path;
mod query;
mod response;

pub use context::build_service_context;
pub use decoded::{decode, DecodedInput, DecodedInputBuilder};
pub use extractor::DecodeInput;
pub use json::{Json, RawBody};
pub use path::Path;
pub use query::{parse_query, Query};
pub use response::{encode_json, error_response, json_bytes_response, no_content, JsonResponse};
