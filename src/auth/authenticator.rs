//! Authenticator implementation
//!
//! Applies an [`AuthConfig`] to outgoing requests. OIDC tokens are fetched
//! lazily and shared by every request until they near expiry.

use super::types::{AuthConfig, CachedToken, TokenEndpoint, DEFAULT_API_KEY_HEADER};
use crate::error::{Error, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Applies authentication to HTTP requests
pub struct Authenticator {
    config: AuthConfig,
    token: RwLock<Option<CachedToken>>,
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator that requests tokens through `http_client`
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            token: RwLock::new(None),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match &self.config {
            AuthConfig::None => req,
            AuthConfig::ApiKey { value, header } => req.header(
                header.as_deref().unwrap_or(DEFAULT_API_KEY_HEADER),
                value.as_str(),
            ),
            AuthConfig::Bearer { token } => req.bearer_auth(token),
            AuthConfig::Lambda { token } => req.header(AUTHORIZATION, token.as_str()),
            AuthConfig::Oidc(endpoint) => req.bearer_auth(self.access_token(endpoint).await?),
            AuthConfig::Headers { headers } => headers
                .iter()
                .fold(req, |req, (name, value)| req.header(name.as_str(), value.as_str())),
        })
    }

    /// Current access token, fetching a new one when none is cached or it expired
    async fn access_token(&self, endpoint: &TokenEndpoint) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.token.clone());
        }

        let mut cached = self.token.write().await;

        // Another request may have refreshed while this one waited
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.token.clone());
        }

        let token = self.request_token(endpoint).await?;
        let access_token = token.token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// One round trip to the token endpoint
    async fn request_token(&self, endpoint: &TokenEndpoint) -> Result<CachedToken> {
        debug!(
            "Requesting {} token from {}",
            endpoint.grant_type(),
            endpoint.token_url
        );
        let response = self
            .http_client
            .post(&endpoint.token_url)
            .form(&endpoint.form())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("Token endpoint returned {}: {body}", status.as_u16());
            return Err(if endpoint.refresh_token.is_some() {
                Error::TokenRefresh { message }
            } else {
                Error::OAuth2 { message }
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken::new(token.access_token, token.expires_in))
    }

    /// Forget the cached token, forcing a fetch on the next request
    pub async fn clear_cache(&self) {
        *self.token.write().await = None;
    }

    /// The auth config being applied
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secrets stay out of logs
        let mode = match &self.config {
            AuthConfig::None => "none",
            AuthConfig::ApiKey { .. } => "api_key",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::Lambda { .. } => "lambda",
            AuthConfig::Oidc(_) => "oidc",
            AuthConfig::Headers { .. } => "headers",
        };
        f.debug_struct("Authenticator")
            .field("mode", &mode)
            .finish_non_exhaustive()
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}
