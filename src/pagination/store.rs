//! Token store implementation
//!
//! In-memory cache of token chains, bounded by identity count (LRU) and by
//! age since the last write (TTL). Reads refresh LRU recency but not age.

use super::types::{QueryIdentity, TokenChain};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Bounds for the token store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStoreConfig {
    /// Maximum number of identities kept; least recently used are evicted
    pub max_identities: NonZeroUsize,
    /// Chains not written for longer than this are dropped
    pub ttl: Option<Duration>,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            max_identities: NonZeroUsize::new(1024).unwrap_or(NonZeroUsize::MIN),
            ttl: Some(Duration::from_secs(30 * 60)),
        }
    }
}

impl TokenStoreConfig {
    /// Create a config with the given bounds
    pub fn new(max_identities: usize, ttl: Option<Duration>) -> Self {
        Self {
            max_identities: NonZeroUsize::new(max_identities).unwrap_or(NonZeroUsize::MIN),
            ttl,
        }
    }
}

#[derive(Debug)]
struct Entry {
    chain: TokenChain,
    written: Instant,
}

/// Shared cache of continuation token chains
///
/// Concurrent writes to the same (identity, page) slot are last-write-wins.
#[derive(Debug)]
pub struct TokenStore {
    chains: Mutex<LruCache<QueryIdentity, Entry>>,
    ttl: Option<Duration>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(TokenStoreConfig::default())
    }
}

impl TokenStore {
    /// Create a store with the given bounds
    pub fn new(config: TokenStoreConfig) -> Self {
        Self {
            chains: Mutex::new(LruCache::new(config.max_identities)),
            ttl: config.ttl,
        }
    }

    /// Get a snapshot of the chain for an identity
    pub async fn get(&self, identity: &QueryIdentity) -> Option<TokenChain> {
        let mut chains = self.chains.lock().await;
        let now = Instant::now();

        let expired = match chains.get(identity) {
            Some(entry) if !self.is_expired(entry, now) => return Some(entry.chain.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!("Token chain expired for {}", identity.operation());
            chains.pop(identity);
        }
        None
    }

    /// Record the token returned after fetching `page` for an identity
    ///
    /// Returns `false` when the write would leave a gap in the chain
    /// (no slot for `page - 1`), in which case nothing is stored.
    pub async fn set(
        &self,
        identity: &QueryIdentity,
        page: u32,
        next_token: Option<String>,
    ) -> bool {
        let mut chains = self.chains.lock().await;
        let now = Instant::now();

        if chains
            .peek(identity)
            .is_some_and(|entry| self.is_expired(entry, now))
        {
            debug!("Token chain expired for {}", identity.operation());
            chains.pop(identity);
        }

        if let Some(entry) = chains.get_mut(identity) {
            let recorded = entry.chain.record(page, next_token);
            if recorded {
                entry.written = now;
            } else {
                warn!(
                    "Refusing to record token for page {} of {}: chain has {} pages",
                    page,
                    identity.operation(),
                    entry.chain.len()
                );
            }
            return recorded;
        }

        let mut chain = TokenChain::new();
        if !chain.record(page, next_token) {
            warn!(
                "Refusing to record token for page {} of {}: no chain yet",
                page,
                identity.operation()
            );
            return false;
        }

        if let Some((evicted, _)) = chains.push(
            identity.clone(),
            Entry {
                chain,
                written: now,
            },
        ) {
            if &evicted != identity {
                debug!("Evicted token chain for {}", evicted.operation());
            }
        }
        true
    }

    /// Forget the chain for an identity
    pub async fn remove(&self, identity: &QueryIdentity) -> Option<TokenChain> {
        self.chains.lock().await.pop(identity).map(|e| e.chain)
    }

    /// Drop every chain
    pub async fn clear(&self) {
        self.chains.lock().await.clear();
    }

    /// Number of identities currently cached
    pub async fn len(&self) -> usize {
        self.chains.lock().await.len()
    }

    /// Check if no identity is cached
    pub async fn is_empty(&self) -> bool {
        self.chains.lock().await.is_empty()
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.duration_since(entry.written) > ttl)
    }
}
