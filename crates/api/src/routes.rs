// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! The price handler is the router fallback, so it answers every path and
//! method. Only `GET /health` is routed explicitly; other methods on that path
//! fall through to the price handler as well.

pub mod handlers;

use axum::{Router, routing::get};
use handlers::{health_handler, preflight_handler, price_handler};

use crate::state::ServerState;

/// Create application routes
pub fn create_routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/health",
            get(health_handler)
                .options(preflight_handler)
                .fallback(price_handler),
        )
        .fallback(price_handler)
}
