//! Error types for SSE operations.

use thiserror::Error;

/// Result type for SSE operations.
pub type SseResult<T> = Result<T, SseError>;

/// Errors that can occur while producing an event stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SseError {
    /// The client went away.
    #[error("stream closed: {0}")]
    StreamClosed(String),

    /// Failed to serialize event data.
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// The event source failed.
    #[error("event source failed: {0}")]
    Source(String),
}

impl SseError {
    /// Creates a stream closed error.
    pub fn stream_closed(reason: impl Into<String>) -> Self {
        Self::StreamClosed(reason.into())
    }

    /// Creates a serialization error.
    pub fn serialization_failed(reason: impl Into<String>) -> Self {
        Self::SerializationFailed(reason.into())
    }

    /// Creates a source error.
    pub fn source_failed(reason: impl Into<String>) -> Self {
        Self::Source(reason.into())
    }

    /// Returns `true` if the client is gone and producing should stop.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::StreamClosed(_))
    }
}
