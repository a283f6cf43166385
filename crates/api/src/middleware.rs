// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Middleware module for HTTP request processing
//!
//! This module provides the cross-cutting response concerns of the proxy:
//! the fixed CORS header set stamped on every response and the conversion of
//! handler panics into the JSON 500 body.

use std::any::Any;

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
        },
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ServerError;

const ALLOW_ORIGIN: HeaderValue = HeaderValue::from_static("*");
const ALLOW_HEADERS: HeaderValue =
    HeaderValue::from_static("authorization, x-client-info, apikey, content-type");
const ALLOW_METHODS: HeaderValue = HeaderValue::from_static("GET, POST, OPTIONS");
const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");

/// Stamp the CORS headers and a JSON content type on every response
///
/// CORS headers overwrite anything set further in; the content type is only
/// added when the response has none.
pub async fn cors_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN);
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS);
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS);
    headers.entry(CONTENT_TYPE).or_insert(APPLICATION_JSON);

    response
}

/// Turn a caught handler panic into the uncaught-failure response
#[allow(clippy::needless_pass_by_value)] // signature required by `CatchPanicLayer::custom`
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "Internal server error".to_string()
    };

    ServerError::Internal { message }.into_response()
}
