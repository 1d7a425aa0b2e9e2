//! JSON-over-POST client for the GraphQL endpoint
//!
//! Every backend call is a POST with a JSON body. The client adds the
//! configured headers and authentication, waits on the rate limiter, and
//! retries attempts that failed for transport reasons. A 200 response is
//! returned as-is; GraphQL-level errors inside it are the transport's
//! concern, not this layer's.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use crate::types::{BackoffType, StringMap};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Fallback wait for a 429 without a usable `retry-after`
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// When and how long to wait before re-sending a failed POST
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Growth of the delay between attempts
    pub backoff: BackoffType,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any delay, including `retry-after`
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffType::Exponential,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy that sends each request exactly once
    pub fn never() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay after the failed attempt numbered `attempt` (zero-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.initial_delay,
            BackoffType::Linear => self.initial_delay.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_delay)
    }

    /// Total attempts including the first
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Settings the client is built from
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Retry behavior for transient failures
    pub retry: RetryPolicy,
    /// Request rate cap; `None` sends as fast as callers ask
    pub rate_limit: Option<RateLimiterConfig>,
    /// Headers added to every POST
    pub headers: StringMap,
    /// `User-Agent` value
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            rate_limit: Some(RateLimiterConfig::default()),
            headers: StringMap::new(),
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl HttpClientConfig {
    /// Start from the defaults
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`]
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Keep the backoff, change only the retry count
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry.max_retries = max_retries;
        self
    }

    /// Set or clear (`None`) the rate limit
    pub fn rate_limit(mut self, rate_limit: Option<RateLimiterConfig>) -> Self {
        self.config.rate_limit = rate_limit;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// What one attempt amounted to
enum Attempt {
    Succeeded(Response),
    Transient { error: Error, wait: Option<Duration> },
    Fatal(Error),
}

/// POST client shared by every backend call
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Authenticator,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Unauthenticated client
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        Self::with_auth(config, AuthConfig::None)
    }

    /// Client that applies `auth` to every request
    ///
    /// Token endpoint calls reuse the same connection pool.
    pub fn with_auth(config: HttpClientConfig, auth: AuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            authenticator: Authenticator::with_client(auth, client.clone()),
            rate_limiter: config.rate_limit.as_ref().map(RateLimiter::new),
            client,
            config,
        })
    }

    /// Settings the client was built from
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// POST `body` as JSON to `url` and decode the JSON reply
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;
        let retry = self.config.retry;

        for attempt in 0..retry.attempts() {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            let request = self.request(url, payload.clone()).await?;
            match self.attempt(request).await {
                Attempt::Succeeded(response) => {
                    debug!("POST {} succeeded on attempt {}", url, attempt + 1);
                    return Ok(response.json().await?);
                }
                Attempt::Fatal(error) => return Err(error),
                Attempt::Transient { error, .. } if attempt + 1 == retry.attempts() => {
                    return Err(error)
                }
                Attempt::Transient { error, wait } => {
                    let wait = wait.map_or_else(|| retry.delay(attempt), |w| w.min(retry.max_delay));
                    warn!(
                        "POST {} failed ({}), attempt {}/{}, next in {:?}",
                        url,
                        error,
                        attempt + 1,
                        retry.attempts(),
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }

        Err(Error::MaxRetriesExceeded {
            max_retries: retry.max_retries,
        })
    }

    /// Build one authenticated POST
    async fn request(&self, url: &str, payload: Vec<u8>) -> Result<RequestBuilder> {
        let request = self
            .config
            .headers
            .iter()
            .fold(self.client.post(url), |req, (name, value)| {
                req.header(name.as_str(), value.as_str())
            })
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);
        self.authenticator.apply(request).await
    }

    /// Send and sort the outcome into success, retry or give up
    async fn attempt(&self, request: RequestBuilder) -> Attempt {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Attempt::Transient {
                    error: Error::Timeout {
                        timeout_ms: u64::try_from(self.config.timeout.as_millis())
                            .unwrap_or(u64::MAX),
                    },
                    wait: None,
                }
            }
            Err(e) if e.is_connect() => {
                return Attempt::Transient {
                    error: Error::Http(e),
                    wait: None,
                }
            }
            Err(e) => return Attempt::Fatal(Error::Http(e)),
        };

        let status = response.status();
        if status.is_success() {
            return Attempt::Succeeded(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_seconds = retry_after(&response);
            return Attempt::Transient {
                error: Error::RateLimited {
                    retry_after_seconds,
                },
                wait: Some(Duration::from_secs(retry_after_seconds)),
            };
        }

        let error = Error::http_status(status.as_u16(), response.text().await.unwrap_or_default());
        if error.is_retryable() {
            Attempt::Transient { error, wait: None }
        } else {
            Attempt::Fatal(error)
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.config.timeout)
            .field("retry", &self.config.retry)
            .field("auth", &self.authenticator)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Seconds from a numeric `retry-after` header
fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
