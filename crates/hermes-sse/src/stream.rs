//! The SSE streaming engine.
//!
//! [`SseStream::spawn`] moves the caller's event source into a producer task
//! that feeds a channel of capacity one. The next item is only pulled from the
//! source once the previous chunk has been taken by the response body, so a
//! slow client throttles production. Dropping the body stops the producer and
//! drops the source.
//!
//! Sources may yield anything convertible into an [`SseItem`], so a handler
//! can interleave its own comments with events.

use std::fmt::Display;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStream, TryStreamExt};
use hermes_core::{Body, Response};
use http::header::{HeaderName, HeaderValue, CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::config::SseConfig;
use crate::event::{SseComment, SseItem};

/// Lifecycle of one event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Headers returned, preamble not yet delivered.
    Initiated,
    /// Pulling events from the source.
    Producing,
    /// The source was exhausted.
    Completed,
    /// The source yielded an error.
    Failed,
    /// The client went away before the source finished.
    Cancelled,
}

impl StreamState {
    /// Returns `true` once the producer has stopped.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Read-only view of a running stream.
#[derive(Debug, Clone)]
pub struct StreamMonitor {
    state: watch::Receiver<StreamState>,
    events_sent: Arc<AtomicU64>,
}

impl StreamMonitor {
    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// Returns the number of events handed to the body so far.
    #[must_use]
    pub fn events_sent(&self) -> u64 {
        self.events_sent.load(Ordering::Relaxed)
    }

    /// Waits until the producer has stopped and returns its final state.
    pub async fn finished(&mut self) -> StreamState {
        let reached = self
            .state
            .wait_for(|state| state.is_terminal())
            .await
            .map(|state| *state);
        reached.unwrap_or_else(|_| self.state())
    }
}

/// The body side of an event stream.
///
/// Yields formatted SSE chunks and ends when the producer stops.
#[derive(Debug)]
pub struct SseStream {
    rx: mpsc::Receiver<Bytes>,
    monitor: StreamMonitor,
}

impl SseStream {
    /// Spawns the producer task for `source`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S, E>(source: S, config: SseConfig) -> Self
    where
        S: TryStream<Error = E> + Send + 'static,
        S::Ok: Into<SseItem> + Send,
        E: Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(StreamState::Initiated);
        let events_sent = Arc::new(AtomicU64::new(0));

        let producer = Producer {
            tx,
            state: state_tx,
            events_sent: Arc::clone(&events_sent),
        };
        tokio::spawn(producer.run(source, config));

        Self {
            rx,
            monitor: StreamMonitor {
                state: state_rx,
                events_sent,
            },
        }
    }

    /// Returns a monitor for this stream.
    #[must_use]
    pub fn monitor(&self) -> StreamMonitor {
        self.monitor.clone()
    }

    /// Wraps the stream in a `200 OK` response with the SSE headers.
    #[must_use]
    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from_stream(self));
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            HeaderName::from_static("x-accel-buffering"),
            HeaderValue::from_static("no"),
        );
        response
    }
}

impl Stream for SseStream {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Streams `source` as an SSE response.
///
/// # Example
///
/// ```rust,no_run
/// use hermes_sse::{sse_response, SseConfig, SseEvent};
/// use std::convert::Infallible;
///
/// # async fn handler() -> hermes_core::Response {
/// let source = futures_util::stream::iter(
///     ["one", "two"].map(|text| Ok::<_, Infallible>(SseEvent::new(text))),
/// );
/// sse_response(source, SseConfig::default())
/// # }
/// ```
pub fn sse_response<S, E>(source: S, config: SseConfig) -> Response
where
    S: TryStream<Error = E> + Send + 'static,
    S::Ok: Into<SseItem> + Send,
    E: Display + Send + 'static,
{
    SseStream::spawn(source, config).into_response()
}

enum Step<T> {
    Closed,
    KeepAlive,
    Next(Option<T>),
}

struct Producer {
    tx: mpsc::Sender<Bytes>,
    state: watch::Sender<StreamState>,
    events_sent: Arc<AtomicU64>,
}

impl Producer {
    async fn run<S, E>(self, source: S, config: SseConfig)
    where
        S: TryStream<Error = E> + Send + 'static,
        S::Ok: Into<SseItem> + Send,
        E: Display + Send + 'static,
    {
        let outcome = self.produce(source, &config).await;
        let events_sent = self.events_sent.load(Ordering::Relaxed);

        match outcome {
            StreamState::Completed => tracing::info!(events_sent, "SSE stream completed"),
            StreamState::Cancelled => {
                tracing::debug!(events_sent, "SSE client disconnected");
            }
            _ => {}
        }

        self.state.send_replace(outcome);
    }

    async fn produce<S, E>(&self, source: S, config: &SseConfig) -> StreamState
    where
        S: TryStream<Error = E>,
        S::Ok: Into<SseItem>,
        E: Display,
    {
        for chunk in preamble(config) {
            if self.tx.send(chunk).await.is_err() {
                return StreamState::Cancelled;
            }
        }
        self.state.send_replace(StreamState::Producing);

        let mut keep_alive = config.keep_alive_interval.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        let keep_alive_chunk = SseComment::keep_alive().to_bytes();

        let source = source.into_stream();
        tokio::pin!(source);

        loop {
            let Ok(permit) = self.tx.reserve().await else {
                return StreamState::Cancelled;
            };

            let step = tokio::select! {
                biased;
                () = self.tx.closed() => Step::Closed,
                () = tick(keep_alive.as_mut()) => Step::KeepAlive,
                item = source.next() => Step::Next(item),
            };

            match step {
                Step::Closed => return StreamState::Cancelled,
                Step::KeepAlive => permit.send(keep_alive_chunk.clone()),
                Step::Next(Some(Ok(item))) => match item.into() {
                    SseItem::Event(event) => {
                        permit.send(event.to_bytes());
                        self.events_sent.fetch_add(1, Ordering::Relaxed);
                    }
                    SseItem::Comment(comment) => permit.send(comment.to_bytes()),
                },
                Step::Next(Some(Err(error))) => {
                    tracing::error!(
                        error = %error,
                        events_sent = self.events_sent.load(Ordering::Relaxed),
                        "SSE event source failed"
                    );
                    return StreamState::Failed;
                }
                Step::Next(None) => return StreamState::Completed,
            }
        }
    }
}

fn preamble(config: &SseConfig) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(2);
    if let Some(comment) = &config.initial_comment {
        chunks.push(SseComment::new(comment.as_str()).to_bytes());
    }
    if let Some(retry) = config.default_retry {
        chunks.push(Bytes::from(format!("retry: {}\n\n", retry.as_millis())));
    }
    chunks
}

async fn tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
