//! HTTP server adapter.
//!
//! Binds an [`App`] to hyper's HTTP/1.1 connection driver. Request bodies are
//! collected into [`Bytes`] before dispatch, up to the configured limit; a
//! larger body is answered with 413. Response bodies, buffered or
//! streaming, are handed back to hyper as they are. The adapter does no HTTP
//! parsing of its own.
//!
//! # Example
//!
//! ```rust,no_run
//! use hermes_middleware::MiddlewareChain;
//! use hermes_server::{RouteRegistrar, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hermes_server::ServerError> {
//!     let app = RouteRegistrar::new().into_app(MiddlewareChain::new());
//!     Server::new(app, ([127, 0, 0, 1], 8080).into())
//!         .run_until(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await
//! }
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use hermes_core::{HermesError, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use crate::app::App;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Default time to wait for open connections after shutdown is requested.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on buffered request bodies, in bytes.
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Errors from running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure on the listener.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serves an [`App`] over TCP.
#[derive(Debug)]
pub struct Server {
    app: App,
    addr: SocketAddr,
    shutdown_timeout: Duration,
    max_body_size: usize,
}

impl Server {
    /// Creates a server for `app` on `addr`.
    #[must_use]
    pub fn new(app: App, addr: SocketAddr) -> Self {
        Self {
            app,
            addr,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Sets how long to wait for open connections after shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the largest request body, in bytes, read before answering 413.
    #[must_use]
    pub fn with_max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    /// Returns the configured address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the request body limit in bytes.
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Runs until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        let signal = ShutdownSignal::with_os_signals();
        self.run_until(signal.recv()).await
    }

    /// Binds the configured address and serves until `shutdown` completes.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.addr,
                source,
            })?;
        self.serve(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` completes.
    ///
    /// In-flight connections are asked to finish their current request and
    /// are given the shutdown timeout to close.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, routes = self.app.route_count(), "server listening");

        let signal = ShutdownSignal::new();
        let tracker = ConnectionTracker::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let app = self.app.clone();
                        let signal = signal.clone();
                        let token = tracker.acquire();
                        let limit = self.max_body_size;
                        tokio::spawn(async move {
                            if let Err(error) = serve_connection(app, stream, signal, limit).await {
                                tracing::debug!(remote = %remote_addr, error = %error, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(error) => tracing::error!(error = %error, "failed to accept connection"),
                },
                () = &mut shutdown => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);
        signal.trigger();

        tracing::info!(
            active = tracker.active_connections(),
            timeout_ms = u64::try_from(self.shutdown_timeout.as_millis()).unwrap_or(u64::MAX),
            "draining connections"
        );
        tokio::select! {
            () = tracker.wait_idle() => tracing::info!("all connections closed"),
            () = tokio::time::sleep(self.shutdown_timeout) => tracing::warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            ),
        }

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn serve_connection(
    app: App,
    stream: TcpStream,
    shutdown: ShutdownSignal,
    max_body_size: usize,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);
    let service = service_fn(move |request: http::Request<Incoming>| {
        let app = app.clone();
        async move { Ok::<_, Infallible>(handle_incoming(&app, request, max_body_size).await) }
    });

    let connection = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(connection);

    tokio::select! {
        result = connection.as_mut() => result,
        () = shutdown.recv() => {
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    }
}

async fn handle_incoming(
    app: &App,
    request: http::Request<Incoming>,
    max_body_size: usize,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes: Bytes = match Limited::new(body, max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(error) if error.downcast_ref::<LengthLimitError>().is_some() => {
            tracing::debug!(limit = max_body_size, "request body over limit");
            let error = HermesError::abort(
                http::StatusCode::PAYLOAD_TOO_LARGE,
                "request body too large",
            );
            return hermes_extract::error_response(&error, false);
        }
        Err(error) => {
            tracing::warn!(error = %error, "failed to read request body");
            let error = HermesError::abort(
                http::StatusCode::BAD_REQUEST,
                "failed to read request body",
            );
            return hermes_extract::error_response(&error, false);
        }
    };
    app.handle(http::Request::from_parts(parts, bytes)).await
}
