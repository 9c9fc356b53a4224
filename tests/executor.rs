//! Retry, backoff, and timeout behavior of the request executor, observed
//! through the public client against a mock backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use devcollab_client::{ApiClient, ApiConfig, AuthMode, Error, MemoryCredentialStore, RetryPolicy};

#[derive(Debug, Deserialize)]
struct Pong {
    ok: bool,
}

/// Client pointed at the mock server with millisecond-scale backoff so the
/// full retry schedule runs in test time.
fn fast_client(server: &MockServer) -> ApiClient {
    let config = ApiConfig::new(server.uri().parse().unwrap()).with_retry(
        RetryPolicy::default()
            .with_base_delay(Duration::from_millis(5))
            .with_max_delay(Duration::from_millis(20)),
    );
    ApiClient::new(config, Arc::new(MemoryCredentialStore::new()))
}

#[tokio::test]
async fn success_takes_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let pong: Pong = fast_client(&server)
        .get("/ping", AuthMode::Anonymous)
        .await
        .unwrap();
    assert!(pong.ok);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "bad request body"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result: Result<Pong, Error> = fast_client(&server).get("/ping", AuthMode::Anonymous).await;
    assert!(matches!(result, Err(Error::Response(m)) if m == "bad request body"));
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let result: Result<Pong, Error> = fast_client(&server).get("/ping", AuthMode::Anonymous).await;
    assert!(matches!(result, Err(Error::Unauthorized)));
}

#[tokio::test]
async fn server_error_exhausts_four_attempts_then_surfaces_last_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;

    let result: Result<Pong, Error> = fast_client(&server).get("/ping", AuthMode::Anonymous).await;
    assert!(matches!(result, Err(Error::ServerError)));
}

#[tokio::test]
async fn rate_limit_exhausts_four_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let result: Result<Pong, Error> = fast_client(&server).get("/ping", AuthMode::Anonymous).await;
    assert!(matches!(result, Err(Error::RateLimited)));
}

#[tokio::test]
async fn transient_server_errors_recover_within_the_attempt_cap() {
    let server = MockServer::start().await;
    // First three attempts fail, the fourth lands inside the retry budget.
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let pong: Pong = fast_client(&server)
        .get("/ping", AuthMode::Anonymous)
        .await
        .unwrap();
    assert!(pong.ok);
}

#[tokio::test]
async fn backoff_delays_accumulate_between_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let started = Instant::now();
    let result: Result<Pong, Error> = fast_client(&server).get("/ping", AuthMode::Anonymous).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(Error::ServiceUnavailable)));
    // base 5ms doubling under a 20ms cap: 5 + 10 + 20 = 35ms of sleep minimum.
    assert!(elapsed >= Duration::from_millis(35), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn slow_attempt_times_out_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ok": true}))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ApiConfig::new(server.uri().parse().unwrap()).with_retry(
        RetryPolicy::default()
            .with_timeout(Duration::from_millis(50))
            .with_base_delay(Duration::from_millis(5)),
    );
    let client = ApiClient::new(config, Arc::new(MemoryCredentialStore::new()));

    let result: Result<Pong, Error> = client.get("/ping", AuthMode::Anonymous).await;
    assert!(matches!(result, Err(Error::Timeout)));
}

#[tokio::test]
async fn unreachable_backend_surfaces_network_error_after_retries() {
    // Port 1 is never listening; every attempt fails at the transport level.
    let config = ApiConfig::new("http://127.0.0.1:1".parse().unwrap()).with_retry(
        RetryPolicy::default()
            .with_max_retries(1)
            .with_base_delay(Duration::from_millis(1)),
    );
    let client = ApiClient::new(config, Arc::new(MemoryCredentialStore::new()));

    let result: Result<Pong, Error> = client.get("/ping", AuthMode::Anonymous).await;
    assert!(matches!(result, Err(Error::Network(_))));
}

#[tokio::test]
async fn success_with_unparsable_body_is_invalid_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let result: Result<Pong, Error> = fast_client(&server).get("/ping", AuthMode::Anonymous).await;
    assert!(matches!(result, Err(Error::InvalidResponseFormat)));
}
