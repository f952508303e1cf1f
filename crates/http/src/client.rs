//! HTTP core (C1): a single shared client underlying all resource
//! clients, ported 1:1 in behavior from
//! `original_source/.../base_client.py::BaseClient` (spec.md §4.3).

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::circuit_breaker::CircuitBreaker;
use crate::error::{ApiError, Error, Result};
use crate::error_codes;
use crate::rate_limiter::RateLimiter;

/// Per-call overrides layered on top of the client's defaults (spec.md
/// §4.3 step 1-2).
#[derive(Default)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
    pub backoff_factor: Option<f64>,
    pub idempotency_key: Option<String>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }
}

/// A provider consulted on every request for dynamic headers (e.g. a
/// freshly-signed auth token). Mirrors the original's
/// `HeaderProvider = Callable[[str, str], Awaitable[Mapping] | Mapping]`
/// — may itself perform async work.
pub type HeaderProvider =
    Arc<dyn Fn(&str, &str) -> Pin<Box<dyn Future<Output = Vec<(String, String)>> + Send>> + Send + Sync>;

/// What a decoded response body looks like once past error handling.
pub enum Body {
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

impl Body {
    /// Deserialize a JSON body into `T`. Errors if the response wasn't JSON.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Body::Json(value) => Ok(serde_json::from_value(value)?),
            Body::Bytes(_) => Err(Error::Api(ApiError {
                kind: crate::error::ApiErrorKind::Api,
                message: "expected a JSON response but got raw bytes".into(),
                status: 0,
                body: String::new(),
                docs_url: "docs.signalrt.dev/errors#api-error".into(),
            })),
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Body::Json(value) => serde_json::to_vec(&value).unwrap_or_default(),
            Body::Bytes(bytes) => bytes,
        }
    }
}

pub struct ClientConfig {
    pub base_url: String,
    pub retries: u32,
    pub backoff_factor: f64,
    pub timeout: Duration,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    pub circuit_breaker: Option<Arc<CircuitBreaker>>,
    pub default_headers: Vec<(String, String)>,
    pub header_provider: Option<HeaderProvider>,
    /// Path-prefix → timeout. Longest matching prefix wins.
    pub endpoint_timeouts: BTreeMap<String, Duration>,
    pub idempotency_header_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            retries: 3,
            backoff_factor: 0.5,
            timeout: Duration::from_secs(30),
            rate_limiter: None,
            circuit_breaker: None,
            default_headers: Vec::new(),
            header_provider: None,
            endpoint_timeouts: BTreeMap::new(),
            idempotency_header_name: "Idempotency-Key".to_string(),
        }
    }
}

/// The shared HTTP client all resource clients (`signalrt-gateway`) are
/// built on. Thread/task-safe by construction: `reqwest::Client` clones
/// share a connection pool, and all other state here is behind
/// `Arc`/atomics.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl HttpClient {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
        }
    }

    /// Build with an explicit `reqwest::Client`, e.g. to share a
    /// connection pool with another part of the process.
    #[must_use]
    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    /// Issue a request with no body.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Body> {
        self.request_with_body::<()>(method, path, None, options).await
    }

    /// Issue a request with a JSON-serializable body.
    pub async fn request_json<B: Serialize>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<Body> {
        self.request_with_body(method, path, Some(serde_json::to_value(body)?), options)
            .await
    }

    async fn request_with_body<B>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<Body> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let timeout = self.resolve_timeout(path, &options);
        let headers = self.headers_for_request(&method, path, &options).await;

        if let Some(limiter) = &self.config.rate_limiter {
            limiter.acquire().await;
        }

        let metrics_timer = std::time::Instant::now();
        let result = if let Some(breaker) = &self.config.circuit_breaker {
            breaker
                .guard(path, || {
                    self.send_with_retries(method, url, timeout, headers, body, &options)
                })
                .await
        } else {
            self.send_with_retries(method, url, timeout, headers, body, &options)
                .await
        };
        signalrt_metrics::histogram!(signalrt_metrics::http::REQUEST_DURATION_SECONDS)
            .record(metrics_timer.elapsed().as_secs_f64());
        if result.is_err() {
            signalrt_metrics::counter!(signalrt_metrics::http::REQUEST_ERRORS_TOTAL).increment(1);
        }
        result
    }

    async fn send_with_retries(
        &self,
        method: reqwest::Method,
        url: String,
        timeout: Duration,
        headers: Vec<(String, String)>,
        body: Option<serde_json::Value>,
        options: &RequestOptions,
    ) -> Result<Body> {
        let retries = options.retries.unwrap_or(self.config.retries);
        let backoff_factor = options.backoff_factor.unwrap_or(self.config.backoff_factor);

        let mut last_error: Option<Error> = None;
        for attempt in 0..=retries {
            signalrt_metrics::counter!(signalrt_metrics::http::REQUESTS_TOTAL).increment(1);
            match self
                .send_once(
                    method.clone(),
                    &url,
                    timeout,
                    &headers,
                    body.clone(),
                    &options.query,
                )
                .await
            {
                Ok(body) => return Ok(body),
                Err(err) if err.is_transient() && attempt < retries => {
                    let delay = Duration::from_secs_f64(backoff_factor * 2f64.powi(attempt as i32));
                    warn!(
                        method = %method,
                        url,
                        attempt = attempt + 1,
                        max_retries = retries,
                        delay_secs = delay.as_secs_f64(),
                        error = %err,
                        "retrying after transient http failure"
                    );
                    signalrt_metrics::counter!(signalrt_metrics::http::RETRIES_TOTAL).increment(1);
                    tokio::time::sleep(delay).await;
                    last_error = Some(err);
                },
                Err(err) => return Err(err),
            }
        }
        Err(last_error.unwrap_or(Error::Timeout(timeout)))
    }

    async fn send_once(
        &self,
        method: reqwest::Method,
        url: &str,
        timeout: Duration,
        headers: &[(String, String)],
        body: Option<serde_json::Value>,
        query: &[(String, String)],
    ) -> Result<Body> {
        let mut req = self.http.request(method, url).timeout(timeout);
        for (k, v) in headers {
            req = req.header(k, v);
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(timeout)
            } else {
                Error::Transport(e)
            }
        })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(Error::Api(self.decode_error(status.as_u16(), response).await));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.starts_with("application/json") {
            let value = response.json::<serde_json::Value>().await?;
            Ok(Body::Json(value))
        } else {
            let bytes = response.bytes().await?;
            Ok(Body::Bytes(bytes.to_vec()))
        }
    }

    async fn decode_error(&self, status: u16, response: reqwest::Response) -> ApiError {
        let text = response.text().await.unwrap_or_default();
        let parsed: Option<serde_json::Value> = serde_json::from_str(&text).ok();

        let code = parsed
            .as_ref()
            .and_then(|v| v.get("code"))
            .and_then(|v| v.as_str())
            .map(error_codes::normalize);

        let message = parsed
            .as_ref()
            .and_then(|v| v.get("error").or_else(|| v.get("message")))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    format!("HTTP {status}")
                } else {
                    text.clone()
                }
            });

        let (kind, docs_url) = code
            .as_deref()
            .and_then(error_codes::lookup)
            .unwrap_or_else(|| error_codes::from_status(status));

        ApiError {
            kind,
            message,
            status,
            body: text,
            docs_url: docs_url.to_string(),
        }
    }

    async fn headers_for_request(
        &self,
        method: &reqwest::Method,
        path: &str,
        options: &RequestOptions,
    ) -> Vec<(String, String)> {
        let mut headers = self.config.default_headers.clone();

        if let Some(provider) = &self.config.header_provider {
            headers.extend(provider(method.as_str(), path).await);
        }

        headers.extend(options.headers.iter().cloned());

        if let Some(key) = &options.idempotency_key {
            headers.push((self.config.idempotency_header_name.clone(), key.clone()));
        }

        headers
    }

    /// Longest matching path-prefix wins; request-scoped timeout wins
    /// over everything (spec.md §4.3 step 2).
    fn resolve_timeout(&self, path: &str, options: &RequestOptions) -> Duration {
        if let Some(timeout) = options.timeout {
            return timeout;
        }
        let trimmed = path.trim_end_matches('/');
        self.config
            .endpoint_timeouts
            .iter()
            .filter(|(prefix, _)| trimmed.starts_with(prefix.trim_end_matches('/').as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or(self.config.timeout, |(_, timeout)| *timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
    use crate::rate_limiter::NoopRateLimiter;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpClient {
        HttpClient::new(ClientConfig {
            base_url: server.uri(),
            retries: 3,
            backoff_factor: 0.01,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn successful_json_response_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let body = client(&server)
            .request(reqwest::Method::GET, "/v2/ping", RequestOptions::new())
            .await
            .unwrap();
        let value: serde_json::Value = body.into_json().unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn retries_transient_5xx_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"timestamp": 1})))
            .mount(&server)
            .await;

        let body = client(&server)
            .request_json(
                reqwest::Method::POST,
                "/v2/send",
                &json!({"message": "hi"}),
                RequestOptions::new(),
            )
            .await
            .unwrap();
        let value: serde_json::Value = body.into_json().unwrap();
        assert_eq!(value["timestamp"], 1);
    }

    #[tokio::test]
    async fn non_transient_4xx_does_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/groups/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .request(reqwest::Method::GET, "/v1/groups/missing", RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(api) if api.status == 404));
    }

    #[tokio::test]
    async fn structured_error_code_maps_over_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/groups/1/members"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"code": "user-not-group-member", "error": "nope"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .request_json(
                reqwest::Method::POST,
                "/v1/groups/1/members",
                &json!({}),
                RequestOptions::new(),
            )
            .await
            .unwrap_err();
        match err {
            Error::Api(api) => assert_eq!(api.kind, crate::error::ApiErrorKind::Conflict),
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn exhausting_retries_raises_last_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let http = HttpClient::new(ClientConfig {
            base_url: server.uri(),
            retries: 2,
            backoff_factor: 0.001,
            ..Default::default()
        });
        let err = http
            .request(reqwest::Method::GET, "/v1/flaky", RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(api) if api.status == 500));
    }

    #[tokio::test]
    async fn idempotency_key_is_written_to_configured_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .and(wiremock::matchers::header("Idempotency-Key", "abc-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"timestamp": 1})))
            .mount(&server)
            .await;

        let result = client(&server)
            .request_json(
                reqwest::Method::POST,
                "/v2/send",
                &json!({}),
                RequestOptions::new().with_idempotency_key("abc-123"),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn endpoint_timeout_table_prefers_longest_prefix() {
        let mut endpoint_timeouts = BTreeMap::new();
        endpoint_timeouts.insert("/v1".to_string(), Duration::from_secs(5));
        endpoint_timeouts.insert("/v1/attachments".to_string(), Duration::from_secs(60));

        let http = HttpClient::new(ClientConfig {
            base_url: "http://example.invalid".to_string(),
            endpoint_timeouts,
            ..Default::default()
        });

        assert_eq!(
            http.resolve_timeout("/v1/attachments/xyz", &RequestOptions::new()),
            Duration::from_secs(60)
        );
        assert_eq!(
            http.resolve_timeout("/v1/groups", &RequestOptions::new()),
            Duration::from_secs(5)
        );
    }

    #[tokio::test]
    async fn circuit_open_short_circuits_without_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            cooldown: Duration::from_secs(30),
        }));
        let http = HttpClient::new(ClientConfig {
            base_url: server.uri(),
            retries: 0,
            circuit_breaker: Some(breaker),
            rate_limiter: Some(Arc::new(NoopRateLimiter)),
            ..Default::default()
        });

        let first = http
            .request(reqwest::Method::GET, "/v1/flaky", RequestOptions::new())
            .await;
        assert!(first.is_err());

        let second = http
            .request(reqwest::Method::GET, "/v1/flaky", RequestOptions::new())
            .await;
        assert!(matches!(second, Err(Error::CircuitOpen(_))));
    }
}
