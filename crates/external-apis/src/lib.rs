// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! External API integrations for cryptocurrency price providers
//!
//! This crate provides implementations of the `PriceProvider` trait for the
//! upstream services the proxy fronts, along with the registry that routes a
//! lookup to the selected one.
//!
//! # Architecture
//!
//! - **Client Implementations**: [`cryptocompare`] (primary, key-authenticated) and
//!   [`coingecko`] (secondary, public)
//! - **Key Rotation**: [`key_rotation::KeyRotator`] - lock-free round-robin over the
//!   CryptoCompare key pool
//! - **Registry Pattern**: [`registry::ProviderRegistry`] - selects a client by `PriceSource`
//!
//! # Features
//!
//! - **Per-key Retry**: CryptoCompare lookups move to the next key while the upstream
//!   keeps throttling
//! - **Bounded Backoff**: every request goes through the shared `RetryExecutor`
//! - **Testing Support**: clients accept a custom `Sleeper` so backoff can be observed;
//!   wiremock drives the HTTP side

pub mod coingecko;
pub mod cryptocompare;
pub mod key_rotation;
pub mod registry;

pub use coingecko::*;
pub use cryptocompare::*;
pub use key_rotation::{KeyRotationError, KeyRotator};
pub use registry::*;
