// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Upstream price provider selector
//!
//! The proxy fronts exactly two providers. Callers pick one with the free-form
//! `source` query parameter; only the secondary provider's name diverts from
//! the default, everything else resolves to the primary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upstream price data providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// CryptoCompare multi-symbol price API, keyed by ticker symbols (primary)
    #[default]
    CryptoCompare,
    /// CoinGecko simple price API, keyed by coin ids (secondary)
    CoinGecko,
}

impl PriceSource {
    /// Resolve a provider from the raw `source` query parameter
    ///
    /// Unknown or missing values fall back to [`PriceSource::CryptoCompare`].
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("coingecko") => Self::CoinGecko,
            _ => Self::CryptoCompare,
        }
    }

    /// Wire name of the provider, as echoed back in error bodies
    pub const fn name(self) -> &'static str {
        match self {
            Self::CryptoCompare => "cryptocompare",
            Self::CoinGecko => "coingecko",
        }
    }

    /// Returns both supported providers, primary first
    pub const fn all() -> &'static [Self] {
        &[Self::CryptoCompare, Self::CoinGecko]
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_param_selects_secondary_only_on_exact_name() {
        assert_eq!(
            PriceSource::from_param(Some("coingecko")),
            PriceSource::CoinGecko
        );
        assert_eq!(
            PriceSource::from_param(Some("cryptocompare")),
            PriceSource::CryptoCompare
        );
        assert_eq!(
            PriceSource::from_param(Some("CoinGecko")),
            PriceSource::CryptoCompare
        );
        assert_eq!(
            PriceSource::from_param(Some("binance")),
            PriceSource::CryptoCompare
        );
        assert_eq!(PriceSource::from_param(None), PriceSource::CryptoCompare);
    }

    #[test]
    fn default_is_primary() {
        assert_eq!(PriceSource::default(), PriceSource::CryptoCompare);
        assert_eq!(PriceSource::all()[0], PriceSource::default());
    }

    #[test]
    fn display_matches_wire_name() {
        for &source in PriceSource::all() {
            assert_eq!(source.to_string(), source.name());
            let serialized = serde_json::to_string(&source).unwrap();
            assert_eq!(serialized, format!("\"{}\"", source.name()));
        }
    }
}
