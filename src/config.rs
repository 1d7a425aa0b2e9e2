//! Provider configuration
//!
//! One YAML file describes the backend endpoint, how to authenticate, the
//! HTTP client behavior, token cache bounds, the operation catalog source and
//! per-resource field policies. String values may reference
//! `{{ env.NAME }}` / `{{ vars.NAME }}`; they are rendered once at load time
//! and the resulting [`ProviderConfig`] is never mutated afterwards.

use crate::auth::AuthConfig;
use crate::catalog::{OperationCatalog, OperationDocument};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig, RetryPolicy};
use crate::pagination::{SortTrigger, TokenStoreConfig};
use crate::schema::SchemaRegistry;
use crate::template::{self, TemplateContext};
use crate::types::{BackoffType, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Provider Config
// ============================================================================

/// Complete provider configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// How requests authenticate
    #[serde(default)]
    pub auth: AuthConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Token cache and sort behavior
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// File storage settings exposed to the UI
    #[serde(default)]
    pub storage: Option<StorageConfig>,

    /// Where the operation documents come from
    #[serde(default)]
    pub operations: OperationsConfig,

    /// Per-resource field policies
    #[serde(default)]
    pub resources: SchemaRegistry,
}

impl ProviderConfig {
    /// Parse a config from YAML text, rendering templates against `ctx`
    pub fn from_yaml_str(yaml: &str, ctx: &TemplateContext) -> Result<Self> {
        let raw: JsonValue = serde_yaml::from_str(yaml)?;
        let rendered = template::render_value(&raw, ctx)?;
        let config: Self = serde_json::from_value(rendered)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    ///
    /// A relative `operations.path` is resolved against the file's directory.
    pub fn from_path(path: impl AsRef<Path>, ctx: &TemplateContext) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let yaml = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&yaml, ctx)?;

        if let (Some(operations), Some(dir)) = (config.operations.path.as_mut(), path.parent()) {
            if operations.is_relative() {
                *operations = dir.join(&*operations);
            }
        }

        Ok(config)
    }

    /// Check the values serde cannot
    pub fn validate(&self) -> Result<()> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| Error::config(format!("Invalid endpoint '{}': {e}", self.endpoint)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Endpoint must be http(s), got '{}'",
                endpoint.scheme()
            )));
        }

        if self.pagination.max_identities == 0 {
            return Err(Error::config("pagination.max_identities must be at least 1"));
        }

        if self.pagination.ttl_secs == Some(0) {
            return Err(Error::config(
                "pagination.ttl_secs must be at least 1, omit it to disable expiry",
            ));
        }

        if self.operations.is_empty() {
            return Err(Error::missing_field("operations"));
        }

        if let Some(storage) = &self.storage {
            if storage.bucket.is_empty() {
                return Err(Error::missing_field("storage.bucket"));
            }
            if storage.region.is_empty() {
                return Err(Error::missing_field("storage.region"));
            }
        }

        Ok(())
    }

    /// Build the operation catalog from the configured sources
    pub fn load_catalog(&self) -> Result<OperationCatalog> {
        self.operations.load()
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting; `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
            headers: HashMap::new(),
        }
    }
}

impl HttpConfig {
    /// Client configuration for these settings
    pub fn to_client_config(&self) -> HttpClientConfig {
        let retry = RetryPolicy {
            max_retries: self.max_retries,
            backoff: self.retry_backoff.backoff_type,
            initial_delay: Duration::from_millis(self.retry_backoff.initial_ms),
            max_delay: Duration::from_millis(self.retry_backoff.max_ms),
        };

        self.headers
            .iter()
            .fold(
                HttpClientConfig::builder()
                    .timeout(Duration::from_secs(self.timeout_seconds))
                    .retry(retry)
                    .rate_limit(self.rate_limit),
                |builder, (name, value)| builder.header(name, value),
            )
            .build()
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    30_000
}

// ============================================================================
// Pagination Config
// ============================================================================

/// Token cache bounds and sort forwarding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Maximum distinct query identities kept
    #[serde(default = "default_max_identities")]
    pub max_identities: usize,

    /// Seconds a chain may sit idle before it is dropped; `null` keeps it forever
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: Option<u64>,

    /// When a requested sort is forwarded as `sortDirection`
    #[serde(default)]
    pub sort_trigger: SortTrigger,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_identities: default_max_identities(),
            ttl_secs: default_ttl_secs(),
            sort_trigger: SortTrigger::default(),
        }
    }
}

impl PaginationConfig {
    /// Token store bounds for these settings
    pub fn to_store_config(&self) -> TokenStoreConfig {
        TokenStoreConfig::new(self.max_identities, self.ttl_secs.map(Duration::from_secs))
    }
}

fn default_max_identities() -> usize {
    1024
}

fn default_ttl_secs() -> Option<u64> {
    Some(30 * 60)
}

// ============================================================================
// Storage Config
// ============================================================================

/// Object storage used for file fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket name
    pub bucket: String,
    /// Bucket region
    pub region: String,
}

// ============================================================================
// Operations Config
// ============================================================================

/// Sources of operation documents
///
/// `path` points at a YAML catalog, a `.graphql` file or a directory of them.
/// Inline `queries` / `mutations` are merged over whatever `path` provides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationsConfig {
    /// Catalog file or directory
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Inline query documents keyed by root field
    #[serde(default)]
    pub queries: HashMap<String, String>,

    /// Inline mutation documents keyed by root field
    #[serde(default)]
    pub mutations: HashMap<String, String>,
}

impl OperationsConfig {
    /// Whether no source is configured
    pub fn is_empty(&self) -> bool {
        self.path.is_none() && self.queries.is_empty() && self.mutations.is_empty()
    }

    /// Load and merge every configured source
    pub fn load(&self) -> Result<OperationCatalog> {
        let mut catalog = match &self.path {
            Some(path) => OperationCatalog::from_path(path)?,
            None => OperationCatalog::new(),
        };

        for (name, document) in &self.queries {
            catalog.insert(OperationDocument::query(name, document));
        }
        for (name, document) in &self.mutations {
            catalog.insert(OperationDocument::mutation(name, document));
        }

        if catalog.is_empty() {
            return Err(Error::config("Operation catalog is empty"));
        }
        Ok(catalog)
    }
}
