//! The root configuration type and its builder.

use std::net::SocketAddr;

use http::{HeaderName, Method};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, CorsSettings, LogFormat, LoggingSettings, ServerSettings, SseSettings};

/// Complete Hermes configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables over the defaults.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HermesConfig {
    /// Server section.
    #[serde(default)]
    pub server: ServerSettings,

    /// CORS section.
    #[serde(default)]
    pub cors: CorsSettings,

    /// SSE section.
    #[serde(default)]
    pub sse: SseSettings,

    /// Logging section.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl HermesConfig {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> HermesConfigBuilder {
        HermesConfigBuilder::new()
    }

    /// Checks values that deserialization alone cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.logging.enabled {
            hermes_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        for origin in &self.cors.allowed_origins {
            if origin.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "cors.allowed_origins",
                    "origins must not be empty",
                ));
            }
        }
        for method in &self.cors.allowed_methods {
            if Method::from_bytes(method.as_bytes()).is_err() {
                return Err(ConfigError::invalid_value(
                    "cors.allowed_methods",
                    format!("invalid method: {method}"),
                ));
            }
        }
        for (field, names) in [
            ("cors.allowed_headers", &self.cors.allowed_headers),
            ("cors.expose_headers", &self.cors.expose_headers),
        ] {
            if let Some(bad) = names
                .iter()
                .find(|name| HeaderName::from_bytes(name.as_bytes()).is_err())
            {
                return Err(ConfigError::invalid_value(
                    field,
                    format!("invalid header name: {bad}"),
                ));
            }
        }

        if self.sse.keep_alive_secs == Some(0) {
            return Err(ConfigError::invalid_value(
                "sse.keep_alive_secs",
                "must be greater than zero, or null to disable",
            ));
        }

        Ok(())
    }

    /// Local development preset: pretty debug logs, any CORS origin,
    /// internal error details exposed.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config.cors.allowed_origins = vec!["*".to_string()];
        config.server.expose_internal_errors = true;

        config
    }

    /// Production preset: JSON info logs, no CORS origins until configured,
    /// incoming request ids ignored.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;

        config.server.expose_internal_errors = false;
        config.server.trust_request_id = false;

        config
    }
}

/// Builder for [`HermesConfig`].
#[derive(Debug, Default)]
pub struct HermesConfigBuilder {
    server: Option<ServerSettings>,
    cors: Option<CorsSettings>,
    sse: Option<SseSettings>,
    logging: Option<LoggingSettings>,
}

impl HermesConfigBuilder {
    /// Creates a builder with every section unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server section.
    #[must_use]
    pub fn server(mut self, server: ServerSettings) -> Self {
        self.server = Some(server);
        self
    }

    /// Sets the CORS section.
    #[must_use]
    pub fn cors(mut self, cors: CorsSettings) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Sets the SSE section.
    #[must_use]
    pub fn sse(mut self, sse: SseSettings) -> Self {
        self.sse = Some(sse);
        self
    }

    /// Sets the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingSettings) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds the configuration; unset sections use defaults.
    #[must_use]
    pub fn build(self) -> HermesConfig {
        HermesConfig {
            server: self.server.unwrap_or_default(),
            cors: self.cors.unwrap_or_default(),
            sse: self.sse.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Builds and validates the configuration.
    pub fn build_validated(self) -> Result<HermesConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
