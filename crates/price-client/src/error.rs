// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while talking to an upstream price provider

use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Common errors that can occur when querying a price provider
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ProviderError {
    /// Upstream answered with a non-success status other than 429
    #[error("{provider} API error: {status} - {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Upstream answered 429 and the response reached the adapter
    #[error("{provider} rate limit exceeded")]
    RateLimited { provider: &'static str },

    /// Upstream declared a content type that is not JSON
    #[error("{provider} returned a non-JSON response (content-type: {content_type}): {body}")]
    ContentType {
        provider: &'static str,
        content_type: String,
        body: String,
    },

    /// Upstream body could not be parsed as JSON
    #[error("{provider} returned invalid JSON: {source}")]
    Json {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Upstream body parsed, but is not a JSON object
    #[error("{provider} returned an invalid response structure: expected a JSON object")]
    Structure { provider: &'static str },

    /// Network level failure (connect, TLS, body read, client timeout)
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Every attempt of the retry budget was answered with 429
    #[error("max retries reached after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Every credential in the pool failed without recording an error
    #[error("all {pool_size} API keys failed")]
    CredentialsExhausted { pool_size: usize },

    /// Client configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Whether this failure means the upstream is throttling us
    ///
    /// The CryptoCompare adapter moves on to the next key for these.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::RetriesExhausted { .. }
        )
    }
}
