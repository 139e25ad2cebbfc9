//! HTTP client for the Sendbird Platform API
//!
//! Wraps reqwest with:
//! - The fixed `Api-Token` credential header on every request
//! - Token bucket rate limiting ahead of every send
//! - Retry with exponential backoff for retriable failures (429, 5xx,
//!   timeouts, connection errors), classified by [`super::classify_status`]
//!
//! Callers never see raw transport errors for expected retriable
//! conditions; they get the parsed JSON body on success or a typed error.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::retry::{classify_status, Classification, RetryPolicy};
use crate::error::{Error, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: String,
    /// API credential sent as the `Api-Token` header
    pub api_token: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retry policy for retriable failures
    pub retry: RetryPolicy,
    /// Rate limiter configuration, None disables limiting
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Create a config for the given base URL and credential
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            rate_limit: Some(RateLimiterConfig::default()),
            user_agent: format!("sendbird-tap/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Override the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Disable rate limiting
    #[must_use]
    pub fn without_rate_limit(mut self) -> Self {
        self.rate_limit = None;
        self
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new client, validating the base URL up front
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        Url::parse(&config.base_url)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Issue a GET request and parse the JSON body
    ///
    /// Retriable failures are retried per the configured policy; a fatal
    /// status aborts on the first attempt with [`Error::HttpStatus`].
    pub async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        let full_url = self.build_url(path);
        let policy = &self.config.retry;
        let mut failed_attempts = 0u32;
        let mut last_error: Option<Error> = None;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let mut req = self
                .client
                .get(&full_url)
                .header("Api-Token", &self.config.api_token);
            if !query.is_empty() {
                req = req.query(query);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    match classify_status(status) {
                        Classification::Success => {
                            debug!(url = %full_url, status, "request succeeded");
                            let body: Value = response.json().await?;
                            return Ok(body);
                        }
                        Classification::Retriable => {
                            failed_attempts += 1;
                            last_error = Some(Error::http_status(status, String::new()));
                            if !policy.should_retry(failed_attempts) {
                                break;
                            }
                            let delay = policy.delay_for(failed_attempts - 1);
                            warn!(
                                url = %full_url,
                                status,
                                attempt = failed_attempts,
                                max = policy.max_attempts,
                                ?delay,
                                "retriable response, backing off"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        Classification::Fatal => {
                            let body = response.text().await.unwrap_or_default();
                            return Err(Error::http_status(status, body));
                        }
                    }
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    failed_attempts += 1;
                    last_error = Some(if e.is_timeout() {
                        Error::Timeout {
                            timeout_ms: self.config.timeout.as_millis() as u64,
                        }
                    } else {
                        Error::Http(e)
                    });
                    if !policy.should_retry(failed_attempts) {
                        break;
                    }
                    let delay = policy.delay_for(failed_attempts - 1);
                    warn!(
                        url = %full_url,
                        attempt = failed_attempts,
                        max = policy.max_attempts,
                        ?delay,
                        "transport error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(Error::Http(e)),
            }
        }

        Err(last_error.unwrap_or(Error::MaxRetriesExceeded {
            max_attempts: policy.max_attempts,
        }))
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
