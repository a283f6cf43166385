// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Generic price provider traits and utilities for upstream integrations
//!
//! This crate provides the common abstractions shared by every upstream price
//! provider client.
//!
//! # Core Abstractions
//!
//! - **`PriceProvider` Trait**: Common interface for fetching prices for a symbol list
//! - **Retry Executor**: [`retry::RetryExecutor`] wraps a single GET with bounded retries,
//!   exponential backoff and `Retry-After` handling for HTTP 429
//! - **Response Validation**: [`validation`] turns a raw upstream response into an opaque
//!   JSON object or a descriptive [`ProviderError`]
//!
//! Upstream payloads are never modelled field by field. A successful lookup is
//! whatever JSON object the provider returned, passed through untouched.

use serde_json::Value;
use shared_types::{PriceSource, SymbolList};

pub mod error;
pub mod retry;
pub mod validation;

pub use error::{ProviderError, ProviderResult};
pub use retry::{RetryExecutor, RetryPolicy, Sleeper, TokioSleeper};
pub use validation::{parse_json_object, validate_body};

/// Generic trait for upstream price providers
///
/// Implementations translate a symbol list into a provider-specific request
/// and return the provider's JSON object unmodified.
pub trait PriceProvider: Send + Sync {
    /// Fetch prices for the given symbols
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream rejects the request, answers with
    /// something other than a JSON object, or cannot be reached within the
    /// retry budget.
    fn fetch_prices(
        &self,
        symbols: &SymbolList,
    ) -> impl Future<Output = ProviderResult<Value>> + Send;

    /// Which provider this client talks to
    fn source(&self) -> PriceSource;
}
