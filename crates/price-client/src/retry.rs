// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Bounded retry executor for upstream GET requests
//!
//! [`RetryExecutor::execute`] performs a single logical GET and only retries
//! two kinds of outcome:
//!
//! - **HTTP 429**: waits for `Retry-After` seconds when the header holds an
//!   integer, otherwise for `base_delay * 2^attempt`.
//! - **Transport failure**: waits for `base_delay * 2^attempt`, unless the
//!   failed attempt was the last one, in which case the error is returned.
//!
//! Every other response, error statuses included, is handed back to the caller
//! for inspection. Waits go through a [`Sleeper`] so tests can substitute one
//! that records instead of sleeping.

use std::{fmt, time::Duration};

use reqwest::{
    Client, Response, StatusCode,
    header::{HeaderMap, RETRY_AFTER},
};
use tracing::{debug, error, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Retry budget and backoff base for a single upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of network attempts
    pub max_retries: u32,
    /// Base delay, doubled on every attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and backoff base
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Exponential backoff delay for a zero-based attempt: `base * 2^attempt`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.checked_pow(attempt).unwrap_or(u32::MAX))
    }
}

/// Parse an integer `Retry-After` header into a wait duration
///
/// HTTP-date values and anything else that is not a plain integer are ignored.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Source of timed waits between attempts
pub trait Sleeper: Send + Sync + fmt::Debug {
    /// Wait for the given duration
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Executes GET requests with bounded retries and exponential backoff
#[derive(Debug, Clone)]
pub struct RetryExecutor<S = TokioSleeper> {
    client: Client,
    policy: RetryPolicy,
    sleeper: S,
}

impl RetryExecutor {
    /// Create an executor that sleeps on the tokio timer
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self::with_sleeper(client, policy, TokioSleeper)
    }
}

impl<S: Sleeper> RetryExecutor<S> {
    /// Create an executor with a custom wait source
    pub fn with_sleeper(client: Client, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            client,
            policy,
            sleeper,
        }
    }

    /// Perform a GET against `url` with the given headers
    ///
    /// Returns the first response that is not a 429, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Transport`] if the final attempt fails at the
    /// network level, or [`ProviderError::RetriesExhausted`] if every attempt
    /// was answered with 429.
    pub async fn execute(&self, url: &Url, headers: &HeaderMap) -> ProviderResult<Response> {
        let max_retries = self.policy.max_retries;
        // Query strings may carry credentials, only log where we are going
        let host = url.host_str().unwrap_or_default();
        let path = url.path();

        for attempt in 0..max_retries {
            let is_last = attempt + 1 >= max_retries;

            debug!(host, path, attempt = attempt + 1, max_retries, "sending upstream request");

            // reqwest errors embed the request URL, query string included
            let result = self
                .client
                .get(url.clone())
                .headers(headers.clone())
                .send()
                .await
                .map_err(reqwest::Error::without_url);

            match result {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    if is_last {
                        warn!(host, path, attempt = attempt + 1, "rate limited on final attempt");
                        break;
                    }

                    let delay = match retry_after(response.headers()) {
                        Some(delay) => {
                            warn!(host, path, ?delay, "rate limited, honouring Retry-After");
                            delay
                        }
                        None => {
                            let delay = self.policy.backoff_delay(attempt);
                            warn!(host, path, ?delay, "rate limited, backing off");
                            delay
                        }
                    };
                    self.sleeper.sleep(delay).await;
                }
                Ok(response) => return Ok(response),
                Err(e) if is_last => {
                    error!(host, path, error = %e, "request failed on final attempt");
                    return Err(ProviderError::Transport(e));
                }
                Err(e) => {
                    let delay = self.policy.backoff_delay(attempt);
                    warn!(host, path, error = %e, ?delay, "request failed, retrying");
                    self.sleeper.sleep(delay).await;
                }
            }
        }

        Err(ProviderError::RetriesExhausted {
            attempts: max_retries,
        })
    }
}
