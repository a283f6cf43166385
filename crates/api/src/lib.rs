// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Price Proxy Server Implementation
//!
//! This crate provides the HTTP server that fronts the upstream price
//! providers, built with Axum. Browsers call it directly, so every response
//! carries permissive CORS headers and a JSON body.
//!
//! # Module Structure
//!
//! - [`config`]: Server and provider configuration with hierarchical loading
//! - [`error`]: Error types and their JSON response bodies
//! - [`state`]: Shared application state with cancellation token support
//! - [`server`]: Main server implementation, lifecycle, and coordinated shutdown
//! - [`routes`]: Price dispatcher (router fallback) and health endpoint
//! - [`middleware`]: CORS headers and panic recovery
//!
//! # Key Features
//!
//! - **Provider Selection**: `?source=coingecko` picks CoinGecko, anything else CryptoCompare
//! - **Passthrough**: successful upstream JSON is returned unmodified
//! - **Graceful Shutdown**: coordinated termination using `CancellationToken`
//! - **Health Monitoring**: configured providers and key pool size, never the keys

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{Server, ShutdownConfig};
pub use state::{HealthCheck, ServerState};
