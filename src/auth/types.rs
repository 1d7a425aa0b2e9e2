//! Auth configuration types
//!
//! One variant per way an AppSync-style endpoint authorizes a request. The
//! config is deserialized after template interpolation, so secrets normally
//! arrive from `{{ env.NAME }}`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header AppSync reads API keys from
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECS: i64 = 30;

/// How requests to the GraphQL endpoint authenticate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Unauthenticated endpoint
    #[default]
    None,

    /// API key in `x-api-key`, or in `header` when given
    ApiKey {
        value: String,
        #[serde(default)]
        header: Option<String>,
    },

    /// Cognito user pool or OIDC token, sent as `Authorization: Bearer ...`
    Bearer { token: String },

    /// Lambda authorizer token, sent as the bare `Authorization` value
    Lambda { token: String },

    /// OIDC access token minted by a token endpoint and cached until expiry
    Oidc(TokenEndpoint),

    /// Fixed headers added to every request
    Headers { headers: HashMap<String, String> },
}

impl AuthConfig {
    /// API key sent in the `x-api-key` header
    pub fn api_key(value: impl Into<String>) -> Self {
        Self::ApiKey {
            value: value.into(),
            header: None,
        }
    }

    /// Bearer token auth
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Whether requests wait on a token endpoint
    pub fn needs_token_endpoint(&self) -> bool {
        matches!(self, Self::Oidc(_))
    }
}

/// OAuth2 token endpoint settings
///
/// With a `refresh_token` the refresh grant is used, otherwise client
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEndpoint {
    /// Token endpoint URL
    pub token_url: String,
    /// Client ID
    pub client_id: String,
    /// Client secret, omitted for public clients
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Long-lived refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Requested scopes
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenEndpoint {
    /// Client credentials grant
    pub fn client_credentials(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: Some(client_secret.into()),
            refresh_token: None,
            scopes: Vec::new(),
        }
    }

    /// Use the refresh grant
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Request scopes
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// `grant_type` sent to the endpoint
    pub fn grant_type(&self) -> &'static str {
        if self.refresh_token.is_some() {
            "refresh_token"
        } else {
            "client_credentials"
        }
    }

    /// Form body of the token request
    pub fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("grant_type", self.grant_type().to_string()),
            ("client_id", self.client_id.clone()),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.clone()));
        }
        if let Some(refresh_token) = &self.refresh_token {
            form.push(("refresh_token", refresh_token.clone()));
        }
        if !self.scopes.is_empty() {
            form.push(("scope", self.scopes.join(" ")));
        }
        form
    }
}

/// Access token with its expiry
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires, `None` when the endpoint gave no lifetime
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Token valid for `seconds` from now, or indefinitely
    pub fn new(token: impl Into<String>, seconds: Option<i64>) -> Self {
        Self {
            token: token.into(),
            expires_at: seconds.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }

    /// Check if the token expires within the skew window
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= at)
    }
}
