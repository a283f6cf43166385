// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module
//!
//! The price handler resolves the provider from `source`, splits `symbols`
//! and returns the provider's JSON unchanged. Failures are mapped to the JSON
//! error bodies by [`ServerError`].

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use shared_types::{PriceSource, SymbolList};
use tracing::{debug, warn};

use crate::{error::ServerError, state::ServerState};

/// Query parameters accepted by the price endpoint
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PriceQuery {
    /// Provider selector, `coingecko` or anything else for CryptoCompare
    pub source: Option<String>,
    /// Comma-separated symbols or coin ids
    pub symbols: Option<String>,
}

impl PriceQuery {
    /// Pick the recognised parameters out of decoded query pairs
    ///
    /// The first occurrence of a repeated key wins; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "source" => &mut query.source,
                "symbols" => &mut query.symbols,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Health check endpoint handler
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.health_check())
}

/// CORS preflight, answered with an empty 200
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// Price lookup handler, served for any path and method
///
/// # Errors
///
/// - `ServerError::Request` when the query string cannot be decoded
/// - `ServerError::MissingSymbols` when no symbol survives splitting
/// - `ServerError::PriceLookup` when the selected provider fails
pub async fn price_handler(
    State(state): State<ServerState>,
    method: Method,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, ServerError> {
    if method == Method::OPTIONS {
        return Ok(preflight_handler().await.into_response());
    }

    let Query(pairs) = query.map_err(|rejection| ServerError::Request {
        message: rejection.body_text(),
    })?;
    let query = PriceQuery::from_pairs(pairs);

    let provider = PriceSource::from_param(query.source.as_deref());
    let symbols = query
        .symbols
        .as_deref()
        .and_then(|raw| raw.parse::<SymbolList>().ok())
        .ok_or(ServerError::MissingSymbols)?;

    debug!(%provider, %symbols, "price lookup");

    match state.registry().fetch_prices(provider, &symbols).await {
        Ok(prices) => Ok(Json(prices).into_response()),
        Err(source) => {
            warn!(%provider, %symbols, error = %source, "price lookup failed");
            Err(ServerError::PriceLookup {
                source,
                provider,
                symbols,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn from_pairs_reads_known_keys() {
        let query = PriceQuery::from_pairs(pairs(&[
            ("source", "coingecko"),
            ("symbols", "bitcoin"),
            ("cache", "no"),
        ]));

        assert_eq!(query.source.as_deref(), Some("coingecko"));
        assert_eq!(query.symbols.as_deref(), Some("bitcoin"));
    }

    #[test]
    fn from_pairs_first_occurrence_wins() {
        let query = PriceQuery::from_pairs(pairs(&[
            ("symbols", "BTC"),
            ("source", "coingecko"),
            ("symbols", "ETH"),
            ("source", "cryptocompare"),
        ]));

        assert_eq!(query.source.as_deref(), Some("coingecko"));
        assert_eq!(query.symbols.as_deref(), Some("BTC"));
    }

    #[test]
    fn from_pairs_repeated_source_without_symbols() {
        let query = PriceQuery::from_pairs(pairs(&[("source", "a"), ("source", "b")]));

        assert_eq!(query.source.as_deref(), Some("a"));
        assert_eq!(query.symbols, None);
    }

    #[test]
    fn from_pairs_empty() {
        assert_eq!(PriceQuery::from_pairs(Vec::new()), PriceQuery::default());
    }
}
