// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! This module provides the error types for server operations and their
//! mapping onto the proxy's JSON error bodies:
//!
//! - missing symbols: 400 `{error}`
//! - provider failure: 500 `{error, source, symbols}`
//! - anything else: 500 `{error, timestamp}`

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use price_client::ProviderError;
use serde_json::json;
use shared_types::{PriceSource, SymbolList};
use thiserror::Error;
use tracing::error;

/// Error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Provider client construction errors
    #[error("Dependency error: {message}")]
    Dependency {
        /// Error message
        message: String,
    },

    /// Graceful shutdown did not drain in time
    #[error("Operation timed out after {timeout_seconds} seconds")]
    Timeout {
        /// Timeout duration in seconds
        timeout_seconds: u64,
    },

    /// The `symbols` query parameter is absent or holds no symbols
    #[error("Missing symbols parameter")]
    MissingSymbols,

    /// The selected provider failed to produce prices
    #[error("{source}")]
    PriceLookup {
        /// Provider failure
        source: ProviderError,
        /// Provider that was queried
        provider: PriceSource,
        /// Symbols that were requested
        symbols: SymbolList,
    },

    /// Request could not be interpreted, e.g. a malformed query string
    #[error("{message}")]
    Request {
        /// Error message
        message: String,
    },

    /// A handler panicked
    #[error("{message}")]
    Internal {
        /// Panic payload, when it was a string
        message: String,
    },
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingSymbols => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn to_json_response(&self) -> serde_json::Value {
        match self {
            Self::MissingSymbols => json!({ "error": self.to_string() }),
            Self::PriceLookup {
                provider, symbols, ..
            } => json!({
                "error": self.to_string(),
                "source": provider.name(),
                "symbols": symbols,
            }),
            _ => json!({
                "error": self.to_string(),
                "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            }),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(self.to_json_response())).into_response()
    }
}
