// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Comma-separated symbol lists
//!
//! Symbols are opaque to the proxy: CryptoCompare expects ticker symbols
//! (`BTC`), CoinGecko expects coin ids (`bitcoin`). Neither is validated beyond
//! being non-empty.

use std::{fmt, ops::Deref, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A non-empty, ordered list of symbol or coin identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolList(Vec<String>);

/// Error returned when a symbol list contains no identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("symbol list cannot be empty")]
pub struct EmptySymbolList;

impl SymbolList {
    /// Build a list from already split identifiers
    ///
    /// Entries are trimmed and blank entries dropped.
    pub fn new<I, S>(symbols: I) -> Result<Self, EmptySymbolList>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symbols: Vec<String> = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if symbols.is_empty() {
            return Err(EmptySymbolList);
        }
        Ok(Self(symbols))
    }

    /// Join the identifiers back into the upstream comma-separated form
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

impl FromStr for SymbolList {
    type Err = EmptySymbolList;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.split(','))
    }
}

impl Deref for SymbolList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for SymbolList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_comma_separated() {
        let symbols: SymbolList = "BTC,ETH".parse().unwrap();
        assert_eq!(&symbols[..], ["BTC", "ETH"]);
        assert_eq!(symbols.joined(), "BTC,ETH");
    }

    #[test]
    fn parse_trims_and_skips_blanks() {
        let symbols: SymbolList = " bitcoin, ,ethereum,".parse().unwrap();
        assert_eq!(&symbols[..], ["bitcoin", "ethereum"]);
    }

    #[test]
    fn parse_preserves_order_and_case() {
        let symbols: SymbolList = "eth,BTC,Sol".parse().unwrap();
        assert_eq!(&symbols[..], ["eth", "BTC", "Sol"]);
    }

    #[test]
    fn empty_input_rejected() {
        assert_eq!("".parse::<SymbolList>(), Err(EmptySymbolList));
        assert_eq!(",, ,".parse::<SymbolList>(), Err(EmptySymbolList));
        assert_eq!(SymbolList::new(Vec::<String>::new()), Err(EmptySymbolList));
    }

    #[test]
    fn serializes_as_plain_array() {
        let symbols: SymbolList = "BTC,ETH".parse().unwrap();
        assert_eq!(
            serde_json::to_value(&symbols).unwrap(),
            serde_json::json!(["BTC", "ETH"])
        );
    }
}
