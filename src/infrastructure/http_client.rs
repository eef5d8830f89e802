//! HTTP client for product page fetching
//!
//! One client per run. The browser identity is picked once at construction,
//! so every request of a run looks like the same visitor. Transient failures
//! (transport errors, 429 and 5xx gateway statuses) are retried with
//! exponential backoff; each fetch owns its own attempt counter.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::canonical_url::CanonicalUrl;
use crate::domain::services::{FetchError, PageFetcher};
use crate::infrastructure::config::HttpConfig;

/// Statuses worth another attempt
pub const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Shared HTTP client with a fixed identity and a GET-only retry policy
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
    user_agent: String,
}

impl HttpClient {
    /// Create a client using `config.request_timeout_seconds` as the per-request timeout
    pub fn with_config(config: HttpConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);
        Self::with_request_timeout(config, timeout)
    }

    /// Create a client with an explicit per-request timeout
    pub fn with_request_timeout(config: HttpConfig, timeout: Duration) -> Result<Self> {
        let user_agent = pick_user_agent(&config.user_agents)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent).context("Invalid user agent")?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).context("Invalid Accept-Language header")?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.referer).context("Invalid Referer header")?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&config.accept).context("Invalid Accept header")?,
        );

        let client = ClientBuilder::new()
            .timeout(timeout)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        info!("HTTP client ready (timeout {:?}, max attempts {})", timeout, config.max_attempts);
        debug!("User agent for this run: {}", user_agent);

        Ok(Self {
            client,
            config,
            user_agent,
        })
    }

    /// The identity chosen for this client's lifetime
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Delay before the retry that follows failed attempt `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.config.backoff_base_ms.saturating_mul(1_u64 << exponent))
    }

    /// GET `url` and return the body text, retrying transient failures
    pub async fn fetch_html_string(&self, url: &str) -> Result<String, FetchError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("🌐 HTTP GET (attempt {}/{}): {}", attempt, max_attempts, url);

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let text = response.text().await.map_err(|e| FetchError::Body {
                            url: url.to_string(),
                            cause: e.to_string(),
                        })?;
                        if attempt > 1 {
                            info!("Fetched {} on attempt {}", url, attempt);
                        }
                        return Ok(text);
                    }

                    if !is_retryable_status(status) || attempt >= max_attempts {
                        return Err(FetchError::HttpStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                            attempts: attempt,
                        });
                    }

                    warn!("⚠️ HTTP {} on attempt {}/{}: {}", status, attempt, max_attempts, url);
                }
                Err(e) => {
                    if attempt >= max_attempts {
                        return Err(classify_transport_error(url, &e, attempt));
                    }
                    warn!("⚠️ Network error on attempt {}/{} for {}: {}", attempt, max_attempts, url, e);
                }
            }

            sleep(self.backoff_delay(attempt)).await;
        }
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &CanonicalUrl) -> Result<String, FetchError> {
        self.fetch_html_string(url.as_str()).await
    }
}

fn pick_user_agent(pool: &[String]) -> Result<String> {
    let candidates: Vec<&String> = pool.iter().filter(|ua| !ua.trim().is_empty()).collect();
    if candidates.is_empty() {
        return Err(anyhow!("User agent pool is empty"));
    }
    Ok(candidates[fastrand::usize(..candidates.len())].clone())
}

fn classify_transport_error(url: &str, error: &reqwest::Error, attempts: u32) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            attempts,
        }
    } else {
        FetchError::Connection {
            url: url.to_string(),
            cause: error.to_string(),
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config(max_attempts: u32) -> HttpConfig {
        HttpConfig {
            max_attempts,
            backoff_base_ms: 1,
            ..HttpConfig::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = HttpClient::with_config(HttpConfig::default()).unwrap();
        assert!(
            crate::infrastructure::config::defaults::USER_AGENTS.contains(&client.user_agent())
        );
    }

    #[test]
    fn test_empty_user_agent_pool_is_rejected() {
        let config = HttpConfig {
            user_agents: vec![String::new()],
            ..HttpConfig::default()
        };
        assert!(HttpClient::with_config(config).is_err());
    }

    #[test]
    fn test_backoff_doubles_from_base() {
        let client = HttpClient::with_config(HttpConfig::default()).unwrap();
        assert_eq!(client.backoff_delay(1), Duration::from_millis(500));
        assert_eq!(client.backoff_delay(2), Duration::from_millis(1000));
        assert_eq!(client.backoff_delay(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [429, 500, 502, 503, 504] {
            assert!(is_retryable_status(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [400, 403, 404, 501] {
            assert!(!is_retryable_status(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }

    #[tokio::test]
    async fn test_sends_fixed_identity_headers() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/den-ban-p1.html"))
            .and(header("referer", "https://tiki.vn/"))
            .and(header("accept-language", "vi-VN,vi;q=0.9,en-US;q=0.8"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_config(fast_config(3)).unwrap();
        let url = format!("{}/den-ban-p1.html", mock_server.uri());
        assert_eq!(client.fetch_html_string(&url).await.unwrap(), "<html>ok</html>");
        client.fetch_html_string(&url).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        for request in &requests {
            let ua = request.headers.get("user-agent").and_then(|v| v.to_str().ok());
            assert_eq!(ua, Some(client.user_agent()));
        }
    }

    #[tokio::test]
    async fn test_retries_transient_status_then_succeeds() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p2"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_config(fast_config(3)).unwrap();
        let body = client
            .fetch_html_string(&format!("{}/p2", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(body, "recovered");
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_permanent_status_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_config(fast_config(3)).unwrap();
        let err = client
            .fetch_html_string(&format!("{}/missing", mock_server.uri()))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(matches!(err, FetchError::HttpStatus { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_retry_budget_is_exhausted_on_persistent_500() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_config(fast_config(3)).unwrap();
        let err = client
            .fetch_html_string(&format!("{}/broken", mock_server.uri()))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FetchError::HttpStatus {
                url: format!("{}/broken", mock_server.uri()),
                status: 500,
                attempts: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_slow_response_becomes_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let client =
            HttpClient::with_request_timeout(fast_config(2), Duration::from_millis(150)).unwrap();
        let err = client
            .fetch_html_string(&format!("{}/slow", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout { attempts: 2, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_connection_refused_becomes_connection_error() {
        let client = HttpClient::with_config(fast_config(2)).unwrap();
        let err = client
            .fetch_html_string("http://127.0.0.1:1/unreachable")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Connection { attempts: 2, .. }), "{err:?}");
        assert_eq!(err.url(), "http://127.0.0.1:1/unreachable");
    }
}
