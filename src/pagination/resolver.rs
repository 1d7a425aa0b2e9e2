//! Page resolver
//!
//! Maps a requested page number onto the continuation token that fetches it.

use super::store::TokenStore;
use super::types::{PageCursor, QueryIdentity, TokenChain};
use std::sync::Arc;
use tracing::debug;

/// Resolve `page` against an identity's chain (if any)
///
/// Page 1 needs no token. Page `n > 1` needs slot `n - 1`: a real token
/// resolves to [`PageCursor::After`], the terminal marker or a missing slot
/// resolve to [`PageCursor::OutOfRange`]. Page 0 is never valid.
pub fn resolve_in_chain(chain: Option<&TokenChain>, page: u32) -> PageCursor {
    match page {
        0 => PageCursor::OutOfRange,
        1 => PageCursor::First,
        n => match chain.and_then(|c| c.slot(n - 1)) {
            Some(Some(token)) => PageCursor::After(token.to_string()),
            Some(None) | None => PageCursor::OutOfRange,
        },
    }
}

/// Read-only view of the token store that answers page lookups
#[derive(Debug, Clone)]
pub struct PageResolver {
    store: Arc<TokenStore>,
}

impl PageResolver {
    /// Create a resolver over a store
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self { store }
    }

    /// Resolve a page for an identity
    pub async fn resolve(&self, identity: &QueryIdentity, page: u32) -> PageCursor {
        if page == 1 {
            return PageCursor::First;
        }
        let chain = self.store.get(identity).await;
        let cursor = resolve_in_chain(chain.as_ref(), page);
        if cursor.is_out_of_range() {
            debug!(
                "Page {} of {} is out of range ({} pages known)",
                page,
                identity.operation(),
                chain.as_ref().map_or(0, TokenChain::len)
            );
        }
        cursor
    }
}
