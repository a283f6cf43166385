// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Provider registry
//!
//! Owns one client per upstream and routes a lookup to the one selected by
//! [`PriceSource`]. There is no failover between providers: the caller picks
//! one and gets that provider's answer or error.

use price_client::{PriceProvider, ProviderResult};
use serde::Serialize;
use serde_json::Value;
use shared_types::{PriceSource, SymbolList};
use tracing::{debug, info};

use crate::{CoinGeckoClient, CryptoCompareClient};

/// Registry holding both upstream price clients
#[derive(Debug)]
pub struct ProviderRegistry {
    cryptocompare: CryptoCompareClient,
    coingecko: CoinGeckoClient,
}

/// Public description of a configured provider, free of credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSummary {
    /// Provider wire name
    pub source: PriceSource,
    /// Endpoint queried, without query parameters
    pub endpoint: String,
    /// Size of the API key pool, for providers that use one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_count: Option<usize>,
}

impl ProviderRegistry {
    /// Create a registry from the two provider clients
    pub fn new(cryptocompare: CryptoCompareClient, coingecko: CoinGeckoClient) -> Self {
        info!(
            cryptocompare_keys = cryptocompare.key_count(),
            "provider registry initialised"
        );
        Self {
            cryptocompare,
            coingecko,
        }
    }

    /// Fetch prices from the selected provider
    ///
    /// # Errors
    ///
    /// Returns the selected provider's error unchanged.
    pub async fn fetch_prices(
        &self,
        source: PriceSource,
        symbols: &SymbolList,
    ) -> ProviderResult<Value> {
        debug!(%source, symbols = %symbols, "dispatching price lookup");
        match source {
            PriceSource::CryptoCompare => self.cryptocompare.fetch_prices(symbols).await,
            PriceSource::CoinGecko => self.coingecko.fetch_prices(symbols).await,
        }
    }

    /// Describe the configured providers, primary first
    pub fn summaries(&self) -> Vec<ProviderSummary> {
        PriceSource::all()
            .iter()
            .map(|&source| self.summary(source))
            .collect()
    }

    fn summary(&self, source: PriceSource) -> ProviderSummary {
        match source {
            PriceSource::CryptoCompare => ProviderSummary {
                source: self.cryptocompare.source(),
                endpoint: self.cryptocompare.endpoint().to_string(),
                key_count: Some(self.cryptocompare.key_count()),
            },
            PriceSource::CoinGecko => ProviderSummary {
                source: self.coingecko.source(),
                endpoint: self.coingecko.endpoint().to_string(),
                key_count: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{CoinGeckoConfig, CryptoCompareConfig};

    fn registry() -> ProviderRegistry {
        let cryptocompare = CryptoCompareClient::new(CryptoCompareConfig {
            api_keys: vec!["k1".to_string(), "k2".to_string(), "k3".to_string()],
            ..Default::default()
        })
        .unwrap();
        let coingecko = CoinGeckoClient::new(CoinGeckoConfig::default()).unwrap();
        ProviderRegistry::new(cryptocompare, coingecko)
    }

    #[test]
    fn summaries_list_primary_first() {
        let summaries = registry().summaries();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].source, PriceSource::CryptoCompare);
        assert_eq!(summaries[0].key_count, Some(3));
        assert_eq!(summaries[1].source, PriceSource::CoinGecko);
        assert_eq!(summaries[1].key_count, None);
    }

    #[test]
    fn summaries_serialize_without_credentials() {
        let value = serde_json::to_value(registry().summaries()).unwrap();

        assert_eq!(
            value,
            json!([
                {
                    "source": "cryptocompare",
                    "endpoint": "https://min-api.cryptocompare.com/data/pricemulti",
                    "key_count": 3
                },
                {
                    "source": "coingecko",
                    "endpoint": "https://api.coingecko.com/api/v3/simple/price"
                }
            ])
        );
    }
}
