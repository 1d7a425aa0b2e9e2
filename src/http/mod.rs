//! HTTP layer under the GraphQL transport
//!
//! [`HttpClient`] POSTs JSON with auth applied, retries connect errors,
//! timeouts, 429 and 5xx according to a [`RetryPolicy`], and paces requests
//! through an optional [`RateLimiter`].

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RetryPolicy};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
