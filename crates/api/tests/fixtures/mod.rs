// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Test fixtures for the price proxy integration tests
//!
//! Starts the real server on an ephemeral port with both providers pointed at
//! a single wiremock server.

use std::net::SocketAddr;

use api::{Server, ServerConfig, ShutdownConfig};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

pub const CRYPTOCOMPARE_PATH: &str = "/data/pricemulti";
pub const COINGECKO_PATH: &str = "/api/v3/simple/price";

/// Running proxy plus the upstream it talks to
pub struct TestProxy {
    pub addr: SocketAddr,
    pub upstream: MockServer,
    pub client: reqwest::Client,
    shutdown: CancellationToken,
}

impl TestProxy {
    /// Start a proxy with the given CryptoCompare key pool
    pub async fn start(keys: &[&str]) -> Self {
        let upstream = MockServer::start().await;

        let mut config = ServerConfig::for_testing();
        config.providers.cryptocompare.base_url = upstream.uri();
        config.providers.cryptocompare.api_keys = keys.iter().map(ToString::to_string).collect();
        config.providers.coingecko.base_url = upstream.uri();

        let (addr, shutdown) = Server::new(config, ShutdownConfig::default())
            .expect("Failed to create server")
            .run_for_testing()
            .await
            .expect("Failed to start test server");

        Self {
            addr,
            upstream,
            client: reqwest::Client::new(),
            shutdown,
        }
    }

    /// Absolute URL on the proxy
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.addr)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

pub fn cryptocompare_prices() -> Value {
    json!({
        "BTC": {"USD": 64_250.12},
        "ETH": {"USD": 3_120.5}
    })
}

pub fn coingecko_prices() -> Value {
    json!({
        "bitcoin": {"usd": 64_251},
        "ethereum": {"usd": 3_121.07}
    })
}
