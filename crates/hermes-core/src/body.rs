//! Request and response types shared by every layer.
//!
//! A [`Response`] carries one of two bodies: a buffered one whose bytes are
//! already in memory, or a streaming one that is produced while the response
//! is being written. Both share the same status and header map, so an outer
//! middleware can add headers to an in-flight event stream without touching
//! the body.

use bytes::Bytes;
use futures_core::Stream;
use http_body::{Frame, SizeHint};
use std::convert::Infallible;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Inbound request with its body already collected.
pub type Request = http::Request<Bytes>;

/// Outbound response.
pub type Response = http::Response<Body>;

type BoxStream = Pin<Box<dyn Stream<Item = Bytes> + Send>>;

/// A response body, buffered or streaming.
pub struct Body {
    kind: Kind,
}

enum Kind {
    Buffered(Option<Bytes>),
    Streaming(BoxStream),
}

impl Body {
    /// An empty buffered body.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            kind: Kind::Buffered(None),
        }
    }

    /// A buffered body holding `bytes`.
    #[must_use]
    pub fn full(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Self::empty();
        }
        Self {
            kind: Kind::Buffered(Some(bytes)),
        }
    }

    /// A body whose chunks are produced by `stream`.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Bytes> + Send + 'static,
    {
        Self {
            kind: Kind::Streaming(Box::pin(stream)),
        }
    }

    /// Returns `true` for a streaming body.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self.kind, Kind::Streaming(_))
    }

    /// Returns the buffered bytes, or `None` for a streaming body.
    ///
    /// An empty buffered body yields an empty slice.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            Kind::Buffered(Some(bytes)) => Some(bytes),
            Kind::Buffered(None) => Some(&[]),
            Kind::Streaming(_) => None,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Buffered(bytes) => f
                .debug_tuple("Body::Buffered")
                .field(&bytes.as_ref().map_or(0, Bytes::len))
                .finish(),
            Kind::Streaming(_) => f.write_str("Body::Streaming"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::full(bytes)
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::full(s)
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Self::full(Bytes::from_static(s.as_bytes()))
    }
}

impl http_body::Body for Body {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match &mut self.get_mut().kind {
            Kind::Buffered(bytes) => Poll::Ready(bytes.take().map(|b| Ok(Frame::data(b)))),
            Kind::Streaming(stream) => stream
                .as_mut()
                .poll_next(cx)
                .map(|chunk| chunk.map(|b| Ok(Frame::data(b)))),
        }
    }

    fn is_end_stream(&self) -> bool {
        matches!(self.kind, Kind::Buffered(None))
    }

    fn size_hint(&self) -> SizeHint {
        match &self.kind {
            Kind::Buffered(bytes) => {
                SizeHint::with_exact(bytes.as_ref().map_or(0, |b| b.len() as u64))
            }
            Kind::Streaming(stream) => {
                let (lower, upper) = stream.size_hint();
                let mut hint = SizeHint::new();
                hint.set_lower(lower as u64);
                if let Some(upper) = upper {
                    hint.set_upper(upper as u64);
                }
                hint
            }
        }
    }
}
