//! Configuration schema types.
//!
//! Every section rejects unknown keys and fills absent keys with defaults.

use hermes_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Server section.
///
/// # Example
///
/// ```
/// use hermes_config::ServerSettings;
///
/// let settings = ServerSettings::default();
/// assert_eq!(settings.http_addr, "0.0.0.0:8080");
/// assert!(!settings.expose_internal_errors);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSettings {
    /// Bind address, e.g. `0.0.0.0:8080`.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Seconds to wait for open connections on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Largest request body buffered before answering 413.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Include internal error details in 500 responses.
    #[serde(default)]
    pub expose_internal_errors: bool,

    /// Reuse a well-formed incoming `x-request-id`.
    #[serde(default = "default_true")]
    pub trust_request_id: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_body_bytes: default_max_body_bytes(),
            expose_internal_errors: false,
            trust_request_id: true,
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

/// CORS section.
///
/// An origin of `"*"` allows any origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CorsSettings {
    /// Install the CORS middleware at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Allowed origins.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allowed methods, upper-case.
    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<String>,

    /// Allowed request headers.
    #[serde(default = "default_cors_headers")]
    pub allowed_headers: Vec<String>,

    /// Response headers readable by the browser.
    #[serde(default)]
    pub expose_headers: Vec<String>,

    /// Send `Access-Control-Allow-Credentials: true`.
    #[serde(default)]
    pub allow_credentials: bool,

    /// Preflight cache lifetime; `None` omits the header.
    #[serde(default = "default_cors_max_age")]
    pub max_age_secs: Option<u64>,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
            allowed_methods: default_cors_methods(),
            allowed_headers: default_cors_headers(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age_secs: default_cors_max_age(),
        }
    }
}

fn default_cors_methods() -> Vec<String> {
    ["GET", "HEAD", "POST", "PUT", "DELETE", "PATCH"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_cors_headers() -> Vec<String> {
    ["content-type", "authorization", "x-request-id"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[allow(clippy::unnecessary_wraps)]
fn default_cors_max_age() -> Option<u64> {
    Some(86_400)
}

/// Server-Sent Events section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SseSettings {
    /// First comment written to every stream; `None` sends nothing.
    #[serde(default = "default_initial_comment")]
    pub initial_comment: Option<String>,

    /// Seconds between keep-alive comments; `None` disables them.
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: Option<u64>,

    /// Reconnection hint in milliseconds.
    #[serde(default)]
    pub retry_ms: Option<u64>,
}

impl Default for SseSettings {
    fn default() -> Self {
        Self {
            initial_comment: default_initial_comment(),
            keep_alive_secs: default_keep_alive(),
            retry_ms: None,
        }
    }
}

#[allow(clippy::unnecessary_wraps)]
fn default_initial_comment() -> Option<String> {
    Some("connected".to_string())
}

#[allow(clippy::unnecessary_wraps)]
fn default_keep_alive() -> Option<u64> {
    Some(15)
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Install a subscriber at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Log span creation and close.
    #[serde(default)]
    pub span_events: bool,

    /// Include file and line.
    #[serde(default)]
    pub include_location: bool,

    /// Include the module path.
    #[serde(default = "default_true")]
    pub include_target: bool,

    /// Service name recorded at startup.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
            span_events: false,
            include_location: false,
            include_target: true,
            service_name: default_service_name(),
        }
    }
}

impl LoggingSettings {
    /// Converts the section into a telemetry [`LogConfig`].
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            span_events: self.span_events,
            file_line_info: self.include_location,
            include_target: self.include_target,
            service_name: self.service_name.clone(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "hermes".to_string()
}
