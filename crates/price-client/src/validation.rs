// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Upstream response validation
//!
//! Both providers share one pipeline: status check, content-type check, JSON
//! parse, and a structural check that the document is a JSON object.

use reqwest::{Response, StatusCode, header::CONTENT_TYPE};
use serde_json::Value;
use tracing::warn;

use crate::error::{ProviderError, ProviderResult};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Validate a raw upstream response and return its JSON object
///
/// # Errors
///
/// - [`ProviderError::RateLimited`] for a 429 status
/// - [`ProviderError::Status`] for any other non-success status, with the upstream body
/// - [`ProviderError::ContentType`], [`ProviderError::Json`] or
///   [`ProviderError::Structure`] when the body is not a JSON object
/// - [`ProviderError::Transport`] if the body cannot be read
pub async fn parse_json_object(provider: &'static str, response: Response) -> ProviderResult<Value> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(provider, "upstream rate limit response reached validation");
        return Err(ProviderError::RateLimited { provider });
    }

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!(provider, status = status.as_u16(), body = %body, "upstream returned error status");
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    let body = response.text().await.map_err(reqwest::Error::without_url)?;

    validate_body(provider, content_type.as_deref(), &body)
}

/// Validate an already read body against its declared content type
///
/// # Errors
///
/// Returns [`ProviderError::ContentType`] when the content type is missing or
/// not JSON, [`ProviderError::Json`] when the body does not parse, and
/// [`ProviderError::Structure`] when it parses to anything but an object.
pub fn validate_body(
    provider: &'static str,
    content_type: Option<&str>,
    body: &str,
) -> ProviderResult<Value> {
    let content_type = content_type.unwrap_or_default();
    if !content_type.contains(JSON_CONTENT_TYPE) {
        warn!(provider, content_type, "upstream returned non-JSON content type");
        return Err(ProviderError::ContentType {
            provider,
            content_type: content_type.to_string(),
            body: body.to_string(),
        });
    }

    let value: Value =
        serde_json::from_str(body).map_err(|source| ProviderError::Json { provider, source })?;

    if !value.is_object() {
        warn!(provider, "upstream JSON is not an object");
        return Err(ProviderError::Structure { provider });
    }

    Ok(value)
}
