//! Crate-wide error type
//!
//! Variants fall into four groups: loading the config and catalog, reaching
//! the backend, interpreting what the backend answered, and rejecting what
//! the caller asked for. [`Error::status_code`] folds them onto the HTTP
//! statuses the serve mode answers with.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Loading
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Undefined template variable(s): {variable}")]
    UndefinedVariable { variable: String },

    #[error("No {kind} named '{name}' in the operation catalog")]
    OperationNotFound { kind: String, name: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Reaching the backend
    // ============================================================================
    #[error("Token request failed: {message}")]
    OAuth2 { message: String },

    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend answered HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Throttled by backend, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("No response within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Gave up after {max_retries} retries")]
    MaxRetriesExceeded { max_retries: u32 },

    // ============================================================================
    // Backend answers
    // ============================================================================
    #[error("GraphQL operation '{operation}' failed: {}", .messages.join("; "))]
    GraphQl {
        operation: String,
        messages: Vec<String>,
    },

    #[error("GraphQL operation '{operation}' returned no data")]
    NoData { operation: String },

    #[error("Unexpected response from '{operation}': {message}")]
    UnexpectedResponse { operation: String, message: String },

    // ============================================================================
    // Caller mistakes
    // ============================================================================
    #[error("Not found: {resource} {id}")]
    NotFound { resource: String, id: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// `kind` is `query` or `mutation`
    pub fn operation_not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::OperationNotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    pub fn no_data(operation: impl Into<String>) -> Self {
        Self::NoData {
            operation: operation.into(),
        }
    }

    pub fn unexpected(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Whether sending the same POST again could succeed
    ///
    /// GraphQL errors are answers, not transport failures, and never qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::RateLimited { .. } | Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status an admin UI should see for this error
    ///
    /// Backend 4xx answers pass through; backend 5xx and malformed answers
    /// become 502; failures of this process's own setup are 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidRequest { .. } | Self::JsonParse(_) => 400,
            Self::OAuth2 { .. } | Self::TokenRefresh { .. } => 401,
            Self::RateLimited { .. } => 429,
            Self::Timeout { .. } => 504,
            Self::HttpStatus { status, .. } if (400..500).contains(status) => *status,
            Self::Http(_)
            | Self::HttpStatus { .. }
            | Self::MaxRetriesExceeded { .. }
            | Self::GraphQl { .. }
            | Self::NoData { .. }
            | Self::UnexpectedResponse { .. } => 502,
            Self::Config { .. }
            | Self::MissingConfigField { .. }
            | Self::UndefinedVariable { .. }
            | Self::OperationNotFound { .. }
            | Self::FileNotFound { .. }
            | Self::Io(_)
            | Self::YamlParse(_)
            | Self::InvalidUrl(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graphql(messages: &[&str]) -> Error {
        Error::GraphQl {
            operation: "listPosts".to_string(),
            messages: messages.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            graphql(&["Not Authorized", "Field 'x' undefined"]).to_string(),
            "GraphQL operation 'listPosts' failed: Not Authorized; Field 'x' undefined"
        );
        assert_eq!(
            Error::operation_not_found("mutation", "deletePost").to_string(),
            "No mutation named 'deletePost' in the operation catalog"
        );
        assert_eq!(
            Error::undefined_var("env.KEY, vars.endpoint").to_string(),
            "Undefined template variable(s): env.KEY, vars.endpoint"
        );
    }

    #[test]
    fn test_only_transport_failures_retry() {
        assert!(Error::RateLimited {
            retry_after_seconds: 2
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 500 }.is_retryable());
        assert!(Error::http_status(504, "").is_retryable());

        assert!(!Error::http_status(400, "bad query").is_retryable());
        assert!(!graphql(&["ConditionalCheckFailedException"]).is_retryable());
        assert!(!Error::no_data("getPost").is_retryable());
        assert!(!Error::not_found("posts", "p1").is_retryable());
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (Error::not_found("posts", "p1"), 404),
            (Error::invalid_request("perPage must be positive"), 400),
            (Error::http_status(401, "UnauthorizedException"), 401),
            (Error::http_status(500, "boom"), 502),
            (Error::OAuth2 { message: "invalid_client".into() }, 401),
            (Error::RateLimited { retry_after_seconds: 1 }, 429),
            (Error::Timeout { timeout_ms: 30_000 }, 504),
            (graphql(&["denied"]), 502),
            (Error::unexpected("listPosts", "items is not an array"), 502),
            (Error::operation_not_found("query", "listWidgets"), 500),
            (Error::missing_field("endpoint"), 500),
        ];
        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "{error}");
        }
    }
}
