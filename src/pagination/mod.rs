//! Pagination module
//!
//! Emulates page-number pagination on top of a backend that only hands out
//! opaque continuation tokens.
//!
//! # Overview
//!
//! - `TokenStore` - per-query-identity chains of continuation tokens
//! - `PageResolver` - maps a page number to the token that fetches it
//! - `ListOrchestrator` - one backend call per list request, records the
//!   returned token and computes an approximate total
//!
//! A chain for an identity is built strictly left to right: page `n` can
//! only be resolved after page `n - 1` was fetched. Jumping ahead resolves
//! to [`PageCursor::OutOfRange`], which the orchestrator answers with an
//! empty page and a zero total so the UI falls back to page 1.

mod orchestrator;
mod resolver;
mod store;
mod types;

pub use orchestrator::{approximate_total, ListOrchestrator, ListQuery};
pub use resolver::{resolve_in_chain, PageResolver};
pub use store::{TokenStore, TokenStoreConfig};
pub use types::{ListResult, Page, PageCursor, QueryIdentity, SortTrigger, TokenChain};

#[cfg(test)]
mod tests;
