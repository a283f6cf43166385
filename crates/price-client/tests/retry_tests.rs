// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for `RetryExecutor`
//!
//! These tests use wiremock to script upstream responses and a recording
//! sleeper to observe backoff waits without sleeping.

use std::time::Duration;

use price_client::{ProviderError, RetryExecutor, RetryPolicy};
use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde_json::json;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

use fixtures::RecordingSleeper;

const BASE_DELAY: Duration = Duration::from_millis(1000);

fn executor(max_retries: u32) -> (RetryExecutor<RecordingSleeper>, RecordingSleeper) {
    let sleeper = RecordingSleeper::new();
    let executor = RetryExecutor::with_sleeper(
        Client::new(),
        RetryPolicy::new(max_retries, BASE_DELAY),
        sleeper.clone(),
    );
    (executor, sleeper)
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

fn prices_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/prices", server.uri())).unwrap()
}

/// Success is returned on the first attempt without waiting
#[tokio::test]
async fn success_returns_immediately() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"BTC": {"USD": 1.0}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (executor, sleeper) = executor(3);
    let response = executor
        .execute(&prices_url(&mock_server), &json_headers())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert!(sleeper.delays().is_empty());
}

/// Non-429 error statuses are handed back for inspection, never retried
#[tokio::test]
async fn error_status_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (executor, sleeper) = executor(3);
    let response = executor
        .execute(&prices_url(&mock_server), &json_headers())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(response.text().await.unwrap(), "upstream exploded");
    assert!(sleeper.delays().is_empty());
}

/// A numeric Retry-After header of R seconds causes a wait of exactly R seconds
#[tokio::test]
async fn retry_after_header_sets_wait() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (executor, sleeper) = executor(3);
    let response = executor
        .execute(&prices_url(&mock_server), &json_headers())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(sleeper.delays(), vec![Duration::from_secs(2)]);
}

/// Without a usable Retry-After the wait is `base * 2^attempt`
#[tokio::test]
async fn rate_limit_without_header_uses_exponential_backoff() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "soon"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (executor, sleeper) = executor(3);
    let response = executor
        .execute(&prices_url(&mock_server), &json_headers())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(1000), Duration::from_millis(2000)]
    );
}

/// With `max_retries = N` and a permanently throttled upstream, exactly N
/// attempts are made before giving up
#[tokio::test]
async fn persistent_rate_limit_exhausts_retries() {
    for max_retries in [1, 3, 5] {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/prices"))
            .respond_with(ResponseTemplate::new(429))
            .expect(u64::from(max_retries))
            .mount(&mock_server)
            .await;

        let (executor, sleeper) = executor(max_retries);
        let result = executor
            .execute(&prices_url(&mock_server), &json_headers())
            .await;

        match result {
            Err(ProviderError::RetriesExhausted { attempts }) => {
                assert_eq!(attempts, max_retries);
            }
            other => panic!("Expected RetriesExhausted error, got: {other:?}"),
        }
        // No wait after the final attempt
        assert_eq!(sleeper.delays().len(), (max_retries - 1) as usize);

        mock_server.verify().await;
    }
}

/// Transport failures are retried with backoff and surface on the last attempt
#[tokio::test]
async fn transport_failure_propagates_after_last_attempt() {
    // Grab a free port and release it so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{addr}/prices?api_key=secret-key")).unwrap();
    let (executor, sleeper) = executor(3);
    let result = executor.execute(&url, &json_headers()).await;

    let err = result.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
    assert!(!err.to_string().contains("secret-key"));
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(1000), Duration::from_millis(2000)]
    );
}

/// A zero budget makes no network attempt at all
#[tokio::test]
async fn zero_budget_fails_without_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (executor, _) = executor(0);
    let result = executor
        .execute(&prices_url(&mock_server), &json_headers())
        .await;

    assert!(matches!(
        result,
        Err(ProviderError::RetriesExhausted { attempts: 0 })
    ));
}
