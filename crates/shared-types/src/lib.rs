// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the price proxy service
//!
//! This crate provides common types that are shared across multiple crates
//! in the price proxy workspace, avoiding circular dependencies.

pub mod price_source;
pub mod symbols;

pub use price_source::PriceSource;
pub use symbols::{EmptySymbolList, SymbolList};
