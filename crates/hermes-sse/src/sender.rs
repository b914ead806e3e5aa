//! Push-style event sources.
//!
//! Handlers that produce events from another task can use [`channel`] instead
//! of building a `Stream` by hand: the [`EventSource`] half is handed to the
//! engine and the [`SseSender`] half is moved into the producing task.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::{SseError, SseResult};
use crate::event::{SseComment, SseEvent, SseItem};

/// Creates a connected sender/source pair.
///
/// The channel holds a single event, so `send` waits until the engine has
/// taken the previous one.
///
/// # Example
///
/// ```rust,no_run
/// use hermes_sse::{channel, sse_response, SseConfig, SseEvent};
///
/// # async fn handler() -> hermes_core::Response {
/// let (sender, source) = channel();
/// tokio::spawn(async move {
///     for i in 0..3 {
///         if sender.send(SseEvent::new(i.to_string())).await.is_err() {
///             break;
///         }
///     }
/// });
/// sse_response(source, SseConfig::default())
/// # }
/// ```
#[must_use]
pub fn channel() -> (SseSender, EventSource) {
    let (tx, rx) = mpsc::channel(1);
    (SseSender { tx }, EventSource { rx })
}

/// Sending half of [`channel`].
#[derive(Debug, Clone)]
pub struct SseSender {
    tx: mpsc::Sender<Result<SseItem, SseError>>,
}

impl SseSender {
    /// Sends an event.
    ///
    /// Fails with [`SseError::StreamClosed`] once the client is gone.
    pub async fn send(&self, event: SseEvent) -> SseResult<()> {
        self.push(event.into()).await
    }

    /// Sends a comment. Clients ignore it; it does not count as an event.
    pub async fn send_comment(&self, text: impl Into<String>) -> SseResult<()> {
        self.push(SseComment::new(text).into()).await
    }

    /// Sends `value` serialized as JSON.
    pub async fn send_json<T: Serialize + ?Sized>(&self, value: &T) -> SseResult<()> {
        self.send(SseEvent::json(value)?).await
    }

    /// Ends the stream as failed.
    pub async fn fail(self, error: SseError) {
        // The client may already be gone; nothing left to report to.
        let _ = self.tx.send(Err(error)).await;
    }

    /// Returns `true` once the stream has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn push(&self, item: SseItem) -> SseResult<()> {
        self.tx
            .send(Ok(item))
            .await
            .map_err(|_| SseError::stream_closed("receiver dropped"))
    }
}

/// Receiving half of [`channel`].
#[derive(Debug)]
pub struct EventSource {
    rx: mpsc::Receiver<Result<SseItem, SseError>>,
}

impl Stream for EventSource {
    type Item = Result<SseItem, SseError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SseConfig, SseStream, StreamState};
    use bytes::Bytes;
    use futures_util::StreamExt;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[tokio::test]
    async fn test_source_waits_for_sender() {
        let (sender, source) = channel();
        let mut source = task::spawn(source);

        assert_pending!(source.poll_next());

        sender.send(SseEvent::new("hello")).await.unwrap();
        assert!(source.is_woken());
        assert_ready_eq!(
            source.poll_next(),
            Some(Ok(SseItem::Event(SseEvent::new("hello"))))
        );

        drop(sender);
        assert_ready_eq!(source.poll_next(), None);
    }

    #[tokio::test]
    async fn test_sender_sees_closed_stream() {
        let (sender, source) = channel();
        drop(source);

        assert!(sender.is_closed());
        assert_eq!(
            sender.send(SseEvent::new("late")).await,
            Err(SseError::stream_closed("receiver dropped"))
        );
    }

    #[tokio::test]
    async fn test_channel_through_engine() {
        let (sender, source) = channel();
        let stream = SseStream::spawn(source, SseConfig::new().without_keep_alive());
        let mut monitor = stream.monitor();

        tokio::spawn(async move {
            sender.send_json(&serde_json::json!({ "n": 1 })).await.unwrap();
            sender.send_comment("thinking").await.unwrap();
            sender.fail(SseError::source_failed("model timeout")).await;
        });

        let chunks: Vec<Bytes> = stream.collect().await;
        assert_eq!(
            chunks,
            vec![
                Bytes::from_static(b": connected\n\n"),
                Bytes::from_static(b"data: {\"n\":1}\n\n"),
                Bytes::from_static(b": thinking\n\n"),
            ]
        );
        assert_eq!(monitor.finished().await, StreamState::Failed);
        assert_eq!(monitor.events_sent(), 1);
    }
}
