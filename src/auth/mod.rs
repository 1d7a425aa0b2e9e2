//! Authentication module
//!
//! Supports the AppSync authorization modes: API key, Cognito / OIDC bearer
//! tokens, Lambda authorizer tokens, plus OIDC tokens minted from a token
//! endpoint and fixed custom headers.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, TokenEndpoint, DEFAULT_API_KEY_HEADER};
