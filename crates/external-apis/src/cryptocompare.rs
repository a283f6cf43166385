// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! CryptoCompare price API integration
//!
//! This module provides the primary [`PriceProvider`]: CryptoCompare's
//! multi-symbol price endpoint, quoted in USD. Requests are authenticated with
//! a key from a rotating pool and the lookup is retried once per key when the
//! upstream keeps throttling.

use std::{fmt, time::Duration};

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
use tracing::{debug, error, info, warn};
use url::Url;

use crate::key_rotation::KeyRotator;

/// Provider name used in error messages and logs
pub const CRYPTOCOMPARE_PROVIDER: &str = "CryptoCompare";

const PRICE_MULTI_PATH: &str = "data/pricemulti";
const TARGET_CURRENCY: &str = "USD";

/// Configuration for the CryptoCompare API client
#[derive(Clone)]
pub struct CryptoCompareConfig {
    /// Base URL for the CryptoCompare API
    pub base_url: String,
    /// Pool of API keys, rotated on every attempt
    pub api_keys: Vec<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum number of network attempts per key
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
}

impl Default for CryptoCompareConfig {
    fn default() -> Self {
        Self {
            base_url: "https://min-api.cryptocompare.com".to_string(),
            api_keys: vec!["test-api-key".to_string()],
            timeout_seconds: 30,
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }
}

impl fmt::Debug for CryptoCompareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoCompareConfig")
            .field("base_url", &self.base_url)
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_retries", &self.max_retries)
            .field("base_delay_ms", &self.base_delay_ms)
            .finish()
    }
}

/// CryptoCompare API client implementation
#[derive(Debug)]
pub struct CryptoCompareClient<S = TokioSleeper> {
    executor: RetryExecutor<S>,
    rotator: KeyRotator,
    endpoint: Url,
    headers: HeaderMap,
}

impl CryptoCompareClient {
    /// Create a new CryptoCompare API client
    ///
    /// # Errors
    ///
    /// Returns an error if the key pool or base URL is invalid, or the HTTP
    /// client cannot be created
    pub fn new(config: CryptoCompareConfig) -> ProviderResult<Self> {
        Self::with_sleeper(config, TokioSleeper)
    }
}

impl<S: Sleeper> CryptoCompareClient<S> {
    /// Create a client whose backoff waits go through `sleeper`
    ///
    /// # Errors
    ///
    /// Returns an error if the key pool or base URL is invalid, or the HTTP
    /// client cannot be created
    pub fn with_sleeper(config: CryptoCompareConfig, sleeper: S) -> ProviderResult<Self> {
        let rotator = KeyRotator::new(config.api_keys)
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        let endpoint = Url::parse(&format!(
            "{}/{PRICE_MULTI_PATH}",
            config.base_url.trim_end_matches('/')
        ))
        .map_err(|e| ProviderError::Config(format!("invalid CryptoCompare base URL: {e}")))?;

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

        info!(
            pool_size = rotator.len(),
            endpoint = %endpoint,
            "CryptoCompare client configured"
        );

        Ok(Self {
            executor: RetryExecutor::with_sleeper(client, policy, sleeper),
            rotator,
            endpoint,
            headers,
        })
    }

    /// Number of API keys in the rotation pool
    pub fn key_count(&self) -> usize {
        self.rotator.len()
    }

    /// Base endpoint, without query parameters
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Build the price request URL for one attempt
    fn prices_url(&self, symbols: &SymbolList, api_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("fsyms", &symbols.joined())
            .append_pair("tsyms", TARGET_CURRENCY)
            .append_pair("api_key", api_key);
        url
    }

    /// One pass through the executor and the validation pipeline
    async fn fetch_with_key(&self, symbols: &SymbolList, api_key: &str) -> ProviderResult<Value> {
        let url = self.prices_url(symbols, api_key);
        let response = self.executor.execute(&url, &self.headers).await?;
        parse_json_object(CRYPTOCOMPARE_PROVIDER, response).await
    }
}

impl<S: Sleeper> PriceProvider for CryptoCompareClient<S> {
    async fn fetch_prices(&self, symbols: &SymbolList) -> ProviderResult<Value> {
        let pool_size = self.rotator.len();
        let mut last_error = None;

        debug!(symbols = %symbols, pool_size, "fetching prices from CryptoCompare");

        for attempt in 1..=pool_size {
            let api_key = self.rotator.next_key();

            match self.fetch_with_key(symbols, api_key).await {
                Ok(prices) => {
                    debug!(symbols = %symbols, attempt, "CryptoCompare lookup succeeded");
                    return Ok(prices);
                }
                Err(e) if e.is_rate_limited() => {
                    warn!(
                        attempt,
                        pool_size,
                        error = %e,
                        "CryptoCompare key rate limited, rotating to next key"
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    error!(symbols = %symbols, error = %e, "CryptoCompare lookup failed");
                    return Err(e);
                }
            }
        }

        error!(symbols = %symbols, pool_size, "all CryptoCompare keys exhausted");
        Err(last_error.unwrap_or(ProviderError::CredentialsExhausted { pool_size }))
    }

    fn source(&self) -> PriceSource {
        PriceSource::CryptoCompare
    }
}
