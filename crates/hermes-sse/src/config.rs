//! SSE stream configuration.

use std::time::Duration;

/// Configuration for SSE responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseConfig {
    /// Comment sent as the first chunk; `None` sends nothing up front.
    pub initial_comment: Option<String>,
    /// Interval between keep-alive comments; `None` disables them.
    pub keep_alive_interval: Option<Duration>,
    /// Reconnection hint sent right after the initial comment.
    pub default_retry: Option<Duration>,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            initial_comment: Some("connected".to_string()),
            keep_alive_interval: Some(Duration::from_secs(15)),
            default_retry: None,
        }
    }
}

impl SseConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial comment.
    #[must_use]
    pub fn with_initial_comment(mut self, comment: impl Into<String>) -> Self {
        self.initial_comment = Some(comment.into());
        self
    }

    /// Sends no initial comment.
    #[must_use]
    pub fn without_initial_comment(mut self) -> Self {
        self.initial_comment = None;
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub const fn with_keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = Some(interval);
        self
    }

    /// Disables keep-alive comments.
    #[must_use]
    pub const fn without_keep_alive(mut self) -> Self {
        self.keep_alive_interval = None;
        self
    }

    /// Sets the reconnection hint.
    #[must_use]
    pub const fn with_default_retry(mut self, retry: Duration) -> Self {
        self.default_retry = Some(retry);
        self
    }
}
