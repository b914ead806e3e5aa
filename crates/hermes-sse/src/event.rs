//! SSE event types and wire formatting.

use bytes::Bytes;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::time::Duration;

use crate::error::{SseError, SseResult};

/// A Server-Sent Event.
///
/// Every field is optional. Fields are written in a fixed order: `event`,
/// `id`, `retry`, then one `data:` line per line of the data, followed by a
/// blank line. An event with no fields is a bare `\n`.
///
/// Clients end a line at `\r\n`, `\r` or `\n`, so data is split on all
/// three, and line breaks are dropped from `event` and `id`.
///
/// # Example
///
/// ```
/// use hermes_sse::SseEvent;
///
/// let event = SseEvent::new("Hello, World!")
///     .id("1")
///     .event("greeting");
///
/// assert_eq!(
///     event.to_sse_string(),
///     "event: greeting\nid: 1\ndata: Hello, World!\n\n"
/// );
/// assert_eq!(SseEvent::empty().to_sse_string(), "\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    data: Option<String>,
    event: Option<String>,
    id: Option<String>,
    retry: Option<Duration>,
}

impl SseEvent {
    /// Creates an event carrying `data`.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Creates an event with no fields.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates an event whose data is `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> SseResult<Self> {
        let data = serde_json::to_string(value)
            .map_err(|e| SseError::serialization_failed(e.to_string()))?;
        Ok(Self::new(data))
    }

    /// Sets the data.
    #[must_use]
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the event type.
    #[must_use]
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Sets the event id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the reconnection hint.
    #[must_use]
    pub const fn retry(mut self, retry: Duration) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Returns the data.
    #[must_use]
    pub fn data_value(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Returns the event type.
    #[must_use]
    pub fn event_type(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// Returns the event id.
    #[must_use]
    pub fn id_value(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the reconnection hint.
    #[must_use]
    pub const fn retry_interval(&self) -> Option<Duration> {
        self.retry
    }

    /// Formats the event as an SSE block.
    #[must_use]
    pub fn to_sse_string(&self) -> String {
        let mut out = String::new();

        if let Some(event) = &self.event {
            let _ = writeln!(out, "event: {}", single_line(event));
        }
        if let Some(id) = &self.id {
            let _ = writeln!(out, "id: {}", single_line(id));
        }
        if let Some(retry) = self.retry {
            let _ = writeln!(out, "retry: {}", retry.as_millis());
        }
        if let Some(data) = &self.data {
            for line in data_lines(data) {
                let _ = writeln!(out, "data: {line}");
            }
        }

        out.push('\n');
        out
    }

    /// Formats the event as bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_sse_string())
    }
}

impl From<String> for SseEvent {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl From<&str> for SseEvent {
    fn from(data: &str) -> Self {
        Self::new(data)
    }
}

fn data_lines(data: &str) -> impl Iterator<Item = &str> {
    data.split("\r\n").flat_map(|line| line.split(['\r', '\n']))
}

fn single_line(value: &str) -> Cow<'_, str> {
    if value.contains(['\r', '\n']) {
        Cow::Owned(value.chars().filter(|c| !matches!(c, '\r' | '\n')).collect())
    } else {
        Cow::Borrowed(value)
    }
}

/// A comment block, ignored by clients.
///
/// Used for the connection greeting and keep-alive pings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseComment(String);

impl SseComment {
    /// Creates a comment.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The keep-alive comment.
    #[must_use]
    pub fn keep_alive() -> Self {
        Self::new("keepalive")
    }

    /// Returns the comment text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Formats as `: <text>` plus the block terminator.
    #[must_use]
    pub fn to_sse_string(&self) -> String {
        format!(": {}\n\n", single_line(&self.0))
    }

    /// Formats as bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_sse_string())
    }
}

/// Anything that can be written on an SSE stream.
///
/// Event sources may yield either kind; comments do not count as events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseItem {
    /// An event.
    Event(SseEvent),
    /// A comment.
    Comment(SseComment),
}

impl SseItem {
    /// Formats as SSE text.
    #[must_use]
    pub fn to_sse_string(&self) -> String {
        match self {
            Self::Event(e) => e.to_sse_string(),
            Self::Comment(c) => c.to_sse_string(),
        }
    }

    /// Formats as bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_sse_string())
    }
}

impl From<SseEvent> for SseItem {
    fn from(event: SseEvent) -> Self {
        Self::Event(event)
    }
}

impl From<SseComment> for SseItem {
    fn from(comment: SseComment) -> Self {
        Self::Comment(comment)
    }
}
