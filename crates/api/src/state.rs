// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! This module provides shared application state for the price proxy,
//! including configuration, the provider registry, and coordinated cancellation.

use std::sync::Arc;

use external_apis::{ProviderRegistry, ProviderSummary};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::{Environment, ServerConfig};

/// Shared application state with cancellation token support
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    config: ServerConfig,
    /// Registry routing lookups to the upstream price providers
    registry: Arc<ProviderRegistry>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Create new server state
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `registry` - Provider registry shared by every request
    /// * `cancellation_token` - Token for coordinated cancellation
    pub fn new(
        config: ServerConfig,
        registry: Arc<ProviderRegistry>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            registry,
            cancellation_token,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Provider registry
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Report service liveness and the configured providers
    pub fn health_check(&self) -> HealthCheck {
        HealthCheck {
            status: Box::from("up"),
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
            providers: self.registry.summaries(),
        }
    }
}

/// Health check status
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    /// Service status
    pub status: Box<str>,
    /// Service version
    pub version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
    /// Configured upstream providers, without credentials
    pub providers: Vec<ProviderSummary>,
}

#[cfg(test)]
mod tests {
    use external_apis::{CoinGeckoClient, CryptoCompareClient};
    use shared_types::PriceSource;

    use super::*;

    fn registry(config: &ServerConfig) -> Arc<ProviderRegistry> {
        let cryptocompare =
            CryptoCompareClient::new(config.providers.cryptocompare_client_config()).unwrap();
        let coingecko = CoinGeckoClient::new(config.providers.coingecko_client_config()).unwrap();
        Arc::new(ProviderRegistry::new(cryptocompare, coingecko))
    }

    #[test]
    fn server_state_with_cancellation_token() {
        let config = ServerConfig::for_testing();
        let token = CancellationToken::new();
        let state = ServerState::new(config.clone(), registry(&config), token.clone());

        assert!(!state.cancellation_token.is_cancelled());

        // Test that the tokens are linked
        token.cancel();
        assert!(state.cancellation_token.is_cancelled());
    }

    #[test]
    fn health_check_lists_providers() {
        let config = ServerConfig::for_testing();
        let state = ServerState::new(config.clone(), registry(&config), CancellationToken::new());

        let health = state.health_check();

        assert_eq!(&*health.status, "up");
        assert_eq!(health.environment, Environment::Testing);
        assert_eq!(health.providers.len(), 2);
        assert_eq!(health.providers[0].source, PriceSource::CryptoCompare);
        assert_eq!(health.providers[0].key_count, Some(1));
    }
}
