//! # Hermes SSE
//!
//! Server-Sent Events for Hermes endpoints.
//!
//! ## Features
//!
//! - **Wire formatting**: [`SseEvent`] and [`SseComment`] render the SSE text
//!   grammar with a fixed field order
//! - **Lazy production**: [`SseStream::spawn`] pulls the next event only after
//!   the previous chunk left the channel
//! - **Keep-alive**: optional periodic comments while the source is idle
//! - **Handler comments**: sources may yield [`SseItem::Comment`] alongside
//!   events
//! - **Cancellation**: dropping the response body stops the producer
//!
//! ## Example
//!
//! ```rust,no_run
//! use hermes_sse::{sse_response, SseConfig, SseEvent};
//! use futures_util::StreamExt;
//! use std::convert::Infallible;
//! use std::time::Duration;
//!
//! # async fn handler() -> hermes_core::Response {
//! let ticks = futures_util::stream::iter(1..=3).then(|n| async move {
//!     tokio::time::sleep(Duration::from_millis(100)).await;
//!     Ok::<_, Infallible>(SseEvent::new(format!("tick {n}")).event("tick"))
//! });
//!
//! sse_response(ticks, SseConfig::new().with_keep_alive(Duration::from_secs(15)))
//! # }
//! ```
//!
//! ## Wire format
//!
//! ```text
//! : connected
//!
//! event: tick
//! id: 7
//! retry: 3000
//! data: line one
//! data: line two
//!
//! ```
//!
//! Comments start with `:` and are ignored by clients.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod event;
mod sender;
mod stream;

pub use config::SseConfig;
pub use error::{SseError, SseResult};
pub use event::{SseComment, SseEvent, SseItem};
pub use sender::{channel, EventSource, SseSender};
pub use stream::{sse_response, SseStream, StreamMonitor, StreamState};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::SseConfig;
    pub use crate::error::{SseError, SseResult};
    pub use crate::event::{SseComment, SseEvent, SseItem};
    pub use crate::sender::{channel, SseSender};
    pub use crate::stream::sse_response;
}
