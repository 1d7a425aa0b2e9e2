// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # GraphQL Admin Provider
//!
//! Page-oriented CRUD for admin UIs over GraphQL backends that only paginate
//! forward with opaque continuation tokens (`limit` / `nextToken`).
//!
//! ## Features
//!
//! - **Page Emulation**: Random page access over forward-only cursors, with
//!   a per-query token chain recorded as pages are visited
//! - **Approximate Totals**: The smallest total consistent with what has been seen
//! - **Operation Catalog**: Named query/mutation documents resolved by convention
//! - **Field Stripping**: Server-managed fields and relations removed from updates
//! - **Auth**: API key, bearer, basic and OAuth2 against the GraphQL endpoint
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use graphql_admin_provider::{DataProvider, GetListParams, ProviderConfig, Result};
//! use graphql_admin_provider::template::TemplateContext;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ProviderConfig::from_path("provider.yaml", &TemplateContext::from_env())?;
//!     let provider = DataProvider::from_config(&config)?;
//!
//!     // Page 1 records the token for page 2
//!     let first = provider.get_list("posts", &GetListParams::page(1, 10)).await?;
//!     let second = provider.get_list("posts", &GetListParams::page(2, 10)).await?;
//!     println!("{} of at least {}", second.data.len(), second.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DataProvider                          │
//! │  get_list  get_one  get_many  get_many_reference             │
//! │  create    update   update_many  delete  delete_many         │
//! └──────────────────────────────────────────────────────────────┘
//!                │                               │
//! ┌──────────────┴─────────────┐   ┌─────────────┴──────────────┐
//! │       ListOrchestrator     │   │   Catalog    │   Schema    │
//! │  PageResolver  TokenStore  │   │  (naming)    │ (stripping) │
//! └──────────────┬─────────────┘   └─────────────┬──────────────┘
//!                │                               │
//! ┌──────────────┴───────────────────────────────┴──────────────┐
//! │             Transport (GraphQL over HttpClient)             │
//! │         Auth  │  Retry  │  Rate Limit  │  Backoff           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the provider
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication implementations
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// GraphQL request/response types and transport
pub mod graphql;

/// Named operation documents
pub mod catalog;

/// Page emulation over continuation tokens
pub mod pagination;

/// Update input sanitizing
pub mod schema;

/// Admin data provider operations
pub mod provider;

/// Provider configuration
pub mod config;

/// Template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use catalog::{OperationCatalog, OperationDocument};
pub use config::ProviderConfig;
pub use graphql::{GraphQlTransport, Transport};
pub use pagination::{ListResult, SortTrigger, TokenStore, TokenStoreConfig};
pub use provider::{
    BulkResult, DataProvider, DeleteParams, GetListParams, GetManyReferenceParams, Pagination,
    UpdateParams,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
