// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! CoinGecko price API integration
//!
//! The secondary [`PriceProvider`]: CoinGecko's public simple price endpoint,
//! quoted in USD. No credentials are involved, so the retry executor's own
//! budget is the only resilience layer.

use std::time::Duration;

use price_client::{
    PriceProvider, ProviderError, ProviderResult, RetryExecutor, RetryPolicy, Sleeper,
    TokioSleeper, parse_json_object,
};
use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde_json::Value;
use shared_types::{PriceSource, SymbolList};
use tracing::{debug, error};
use url::Url;

/// Provider name used in error messages and logs
pub const COINGECKO_PROVIDER: &str = "CoinGecko";

const SIMPLE_PRICE_PATH: &str = "api/v3/simple/price";
const VS_CURRENCY: &str = "usd";

/// Configuration for the CoinGecko API client
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// Base URL for the CoinGecko API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum number of network attempts
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }
}

/// CoinGecko API client implementation
#[derive(Debug)]
pub struct CoinGeckoClient<S = TokioSleeper> {
    executor: RetryExecutor<S>,
    endpoint: Url,
    headers: HeaderMap,
}

impl CoinGeckoClient {
    /// Create a new CoinGecko API client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot be created
    pub fn new(config: CoinGeckoConfig) -> ProviderResult<Self> {
        Self::with_sleeper(config, TokioSleeper)
    }
}

impl<S: Sleeper> CoinGeckoClient<S> {
    /// Create a client whose backoff waits go through `sleeper`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot be created
    pub fn with_sleeper(config: CoinGeckoConfig, sleeper: S) -> ProviderResult<Self> {
        let endpoint = Url::parse(&format!(
            "{}/{SIMPLE_PRICE_PATH}",
            config.base_url.trim_end_matches('/')
        ))
        .map_err(|e| ProviderError::Config(format!("invalid CoinGecko base URL: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("price-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let policy = RetryPolicy::new(
            config.max_retries,
            Duration::from_millis(config.base_delay_ms),
        );

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            executor: RetryExecutor::with_sleeper(client, policy, sleeper),
            endpoint,
            headers,
        })
    }

    /// Base endpoint, without query parameters
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn prices_url(&self, ids: &SymbolList) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("ids", &ids.joined())
            .append_pair("vs_currencies", VS_CURRENCY);
        url
    }
}

impl<S: Sleeper> PriceProvider for CoinGeckoClient<S> {
    async fn fetch_prices(&self, symbols: &SymbolList) -> ProviderResult<Value> {
        let url = self.prices_url(symbols);

        debug!(url = %url, "fetching prices from CoinGecko");

        let response = self.executor.execute(&url, &self.headers).await?;
        parse_json_object(COINGECKO_PROVIDER, response)
            .await
            .inspect_err(|e| error!(ids = %symbols, error = %e, "CoinGecko lookup failed"))
    }

    fn source(&self) -> PriceSource {
        PriceSource::CoinGecko
    }
}
