// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server implementation module
//!
//! This module provides the main server struct and implementation for the price proxy,
//! including server lifecycle management, router configuration, and coordinated graceful
//! shutdown using `CancellationToken`.

use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, http::HeaderName, middleware};
use external_apis::{CoinGeckoClient, CryptoCompareClient, ProviderRegistry};
use hyper::Request;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, info_span, warn};

use crate::{
    config::ServerConfig,
    error::{ServerError, ServerResult},
    middleware::{cors_headers, panic_response},
    routes::create_routes,
    state::ServerState,
};

// Server constants
const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for server shutdown behavior
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Maximum time in-flight requests get to finish once shutdown starts
    pub graceful_timeout: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            graceful_timeout: Duration::from_secs(DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS),
        }
    }
}

/// Main server struct
#[derive(Debug)]
pub struct Server {
    /// Server configuration
    config: ServerConfig,
    /// Application router
    router: Router,
    /// Server state
    state: ServerState,
    /// Cancellation token for coordinated shutdown
    cancellation_token: CancellationToken,
    /// Configuration for coordinated shutdown
    graceful_shutdown_config: ShutdownConfig,
}

impl Server {
    /// Create new server instance
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Dependency` if a provider client cannot be built
    /// from the configuration.
    pub fn new(config: ServerConfig, shutdown_config: ShutdownConfig) -> ServerResult<Self> {
        let registry = Self::create_registry_from_config(&config)?;
        Ok(Self::with_registry(config, shutdown_config, Arc::new(registry)))
    }

    /// Create the provider registry from server configuration
    fn create_registry_from_config(config: &ServerConfig) -> ServerResult<ProviderRegistry> {
        let cryptocompare = CryptoCompareClient::new(config.providers.cryptocompare_client_config())
            .map_err(|e| ServerError::Dependency {
                message: format!("failed to create CryptoCompare client: {e}"),
            })?;
        let coingecko = CoinGeckoClient::new(config.providers.coingecko_client_config())
            .map_err(|e| ServerError::Dependency {
                message: format!("failed to create CoinGecko client: {e}"),
            })?;

        Ok(ProviderRegistry::new(cryptocompare, coingecko))
    }

    /// Create server with a prebuilt provider registry
    pub fn with_registry(
        config: ServerConfig,
        graceful_shutdown_config: ShutdownConfig,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        let cancellation_token = CancellationToken::new();
        let state = ServerState::new(config.clone(), registry, cancellation_token.child_token());
        let router = Self::create_router(state.clone());

        Self {
            config,
            router,
            state,
            cancellation_token,
            graceful_shutdown_config,
        }
    }

    /// Create application router with middleware
    fn create_router(state: ServerState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                    if let Some(request_id) = req.headers().get(REQUEST_ID_HEADER) {
                        info_span!("http_request", ?request_id, method = %req.method())
                    } else {
                        error!("failed to extract id from request");
                        info_span!("http_request", request_id = "unknown")
                    }
                }),
            )
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(middleware::from_fn(cors_headers))
            .layer(CatchPanicLayer::custom(panic_response));

        create_routes().layer(middleware).with_state(state)
    }

    /// Run the server with coordinated graceful shutdown
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address,
    /// `ServerError::Startup` if the server fails to start, or
    /// `ServerError::Timeout` if in-flight requests outlive the graceful timeout.
    pub async fn run(self) -> ServerResult<()> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                address: addr,
                source,
            })?;

        let actual_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Startup { source })?;

        info!(
            address = %actual_addr,
            environment = %self.config.environment,
            "price proxy starting",
        );

        let cancellation_token = self.cancellation_token.clone();
        let shutdown_token = cancellation_token.clone();
        tokio::spawn(async move {
            info!("spawning the graceful shutdown task");
            Self::shutdown_signal_handler(shutdown_token).await;
        });

        let drain_token = cancellation_token.clone();
        let graceful_timeout = self.graceful_shutdown_config.graceful_timeout;
        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                cancellation_token.cancelled().await;
                info!("price proxy draining in-flight requests");
            })
            .into_future();

        tokio::select! {
            server_result = serve => {
                if let Err(e) = server_result {
                    error!(error = ?e, "Server error during shutdown");
                    return Err(ServerError::Shutdown { source: e });
                }
                info!("price proxy shut down gracefully");
                Ok(())
            }
            () = async {
                drain_token.cancelled().await;
                tokio::time::sleep(graceful_timeout).await;
            } => {
                warn!(?graceful_timeout, "graceful shutdown timed out, dropping connections");
                Err(ServerError::Timeout {
                    timeout_seconds: graceful_timeout.as_secs(),
                })
            }
        }
    }

    /// Handle shutdown signals and trigger coordinated cancellation
    ///
    /// This function listens for SIGINT (Ctrl+C) and SIGTERM signals,
    /// and cancels the provided cancellation token when received.
    async fn shutdown_signal_handler(cancellation_token: CancellationToken) {
        let signal_received = async {
            #[cfg(unix)]
            #[allow(clippy::expect_used)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                let mut sigterm =
                    signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
                let mut sigint =
                    signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

                tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = sigint.recv() => "SIGINT",
                }
            }

            #[cfg(not(unix))]
            #[allow(clippy::expect_used)]
            {
                tokio::signal::ctrl_c()
                    .await
                    .expect("Failed to install CTRL+C signal handler");
                "CTRL+C"
            }
        };

        // Wait for either a signal or existing cancellation
        tokio::select! {
            signal_name = signal_received => {
                warn!("Shutdown signal {} received, cancelling all operations...", signal_name);
                cancellation_token.cancel();
            },
            () = cancellation_token.cancelled() => {
                warn!("Cancellation token already cancelled, shutdown signal handler exiting");
            }
        }
    }

    /// Returns a clone of the cancellation token for coordinated shutdown
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Initiates graceful shutdown by cancelling the server's cancellation token
    pub fn shutdown(&self) {
        info!("programmatic shutdown requested");
        self.cancellation_token.cancel();
    }

    /// Run server for testing, returns the bound address
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address.
    pub async fn run_for_testing(self) -> ServerResult<(SocketAddr, CancellationToken)> {
        let addr = self.config.socket_addr();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                address: addr,
                source,
            })?;

        let actual_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Startup { source })?;

        let token = self.cancellation_token.child_token();
        let task = token.child_token();
        tokio::spawn(async move {
            let _ = axum::serve(listener, self.router)
                .with_graceful_shutdown(async move { task.cancelled().await })
                .await;
        });

        Ok((actual_addr, token))
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get server state for testing
    pub fn state(&self) -> &ServerState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[tokio::test]
    async fn server_creation() -> ServerResult<()> {
        let config = ServerConfig::for_testing();
        let server = Server::new(config, ShutdownConfig::default())?;
        assert_eq!(server.config().environment, Environment::Testing);
        assert!(!server.cancellation_token().is_cancelled());
        assert_eq!(server.state().registry().summaries().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn programmatic_shutdown() -> ServerResult<()> {
        let config = ServerConfig::for_testing();
        let server = Server::new(config, ShutdownConfig::default())?;

        assert!(!server.cancellation_token().is_cancelled());

        server.shutdown();

        assert!(server.cancellation_token().is_cancelled());
        assert!(server.state().cancellation_token.is_cancelled());
        Ok(())
    }

    #[test]
    fn invalid_base_url_is_dependency_error() {
        let mut config = ServerConfig::for_testing();
        config.providers.coingecko.base_url = "::not a url::".to_string();

        let err = Server::new(config, ShutdownConfig::default()).unwrap_err();
        assert!(matches!(err, ServerError::Dependency { .. }));
    }

    #[test]
    fn shutdown_config_default() {
        let config = ShutdownConfig::default();
        assert_eq!(
            config.graceful_timeout,
            Duration::from_secs(DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS)
        );
    }

    #[tokio::test]
    async fn run_returns_once_cancelled() -> ServerResult<()> {
        let server = Server::new(ServerConfig::for_testing(), ShutdownConfig::default())?;
        let token = server.cancellation_token();

        let handle = tokio::spawn(server.run());
        token.cancel();

        handle.await.unwrap()?;
        Ok(())
    }
}
