//! Wiring from [`HermesConfig`] to running components.
//!
//! These helpers turn configuration sections into the middleware, registrar
//! and server they describe, so that an application's `main` only adds its
//! endpoints and token verifier.

use std::net::SocketAddr;
use std::time::Duration;

use hermes_config::{ConfigError, CorsSettings, HermesConfig, SseSettings};
use hermes_middleware::{
    AuthMiddleware, CorsMiddleware, ErrorTranslationMiddleware, MiddlewareChain,
    RequestIdMiddleware, TokenVerifier,
};
use hermes_server::{App, RouteRegistrar, Server};
use hermes_sse::SseConfig;
use http::Method;

/// Builds the CORS middleware, or `None` when the section is disabled.
pub fn cors_middleware(settings: &CorsSettings) -> Result<Option<CorsMiddleware>, ConfigError> {
    if !settings.enabled {
        return Ok(None);
    }

    let methods = settings
        .allowed_methods
        .iter()
        .map(|m| {
            Method::from_bytes(m.as_bytes()).map_err(|_| {
                ConfigError::invalid_value("cors.allowed_methods", format!("invalid method: {m}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = CorsMiddleware::builder()
        .allow_origins(settings.allowed_origins.iter().cloned())
        .allow_methods(methods)
        .allow_headers(settings.allowed_headers.iter().cloned())
        .expose_headers(settings.expose_headers.iter().cloned())
        .allow_credentials(settings.allow_credentials);

    builder = match settings.max_age_secs {
        Some(secs) => builder.max_age(Duration::from_secs(secs)),
        None => builder.no_max_age(),
    };

    Ok(Some(builder.build()))
}

/// Converts the SSE section.
#[must_use]
pub fn sse_config(settings: &SseSettings) -> SseConfig {
    let mut config = SseConfig::new();
    config.initial_comment.clone_from(&settings.initial_comment);
    config.keep_alive_interval = settings.keep_alive_secs.map(Duration::from_secs);
    config.default_retry = settings.retry_ms.map(Duration::from_millis);
    config
}

/// Builds the standard chain: error translation, request id, CORS, auth.
pub fn standard_chain<V: TokenVerifier>(
    config: &HermesConfig,
    verifier: V,
) -> Result<MiddlewareChain, ConfigError> {
    let request_id = if config.server.trust_request_id {
        RequestIdMiddleware::new()
    } else {
        RequestIdMiddleware::new().ignore_incoming()
    };

    let errors =
        ErrorTranslationMiddleware::new().expose_internal_errors(config.server.expose_internal_errors);

    let mut builder = MiddlewareChain::builder().with(errors).with(request_id);
    if let Some(cors) = cors_middleware(&config.cors)? {
        builder = builder.with(cors);
    }
    Ok(builder.with(AuthMiddleware::new(verifier)).build())
}

/// Creates a registrar that uses the configured SSE and error settings.
#[must_use]
pub fn registrar(config: &HermesConfig) -> RouteRegistrar {
    RouteRegistrar::new()
        .with_sse_config(sse_config(&config.sse))
        .expose_internal_errors(config.server.expose_internal_errors)
}

/// Creates a server for `app` on the configured address.
pub fn server(app: App, config: &HermesConfig) -> Result<Server, ConfigError> {
    let addr: SocketAddr = config.server.http_addr.parse().map_err(|_| {
        ConfigError::invalid_value(
            "server.http_addr",
            format!("invalid socket address: {}", config.server.http_addr),
        )
    })?;
    Ok(Server::new(app, addr)
        .with_shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .with_max_body_size(config.server.max_body_bytes))
}
