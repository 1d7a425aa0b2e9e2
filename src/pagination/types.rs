//! Pagination types
//!
//! Query identities, token chains and the values the resolver and
//! orchestrator hand to each other.

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Query Identity
// ============================================================================

/// Key of one logical paginated result set
///
/// Built from a canonical serialization of (operation name, variables,
/// page size). Object keys are written in sorted order at every depth, so
/// two payloads with the same content always produce the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryIdentity {
    operation: String,
    key: String,
}

impl QueryIdentity {
    /// Build the identity for a list operation
    pub fn new(operation: impl Into<String>, variables: &JsonObject, per_page: u32) -> Self {
        let operation = operation.into();
        let mut key = String::new();
        key.push_str("{\"operation\":");
        write_canonical(&JsonValue::String(operation.clone()), &mut key);
        key.push_str(",\"perPage\":");
        key.push_str(&per_page.to_string());
        key.push_str(",\"variables\":");
        write_canonical(&JsonValue::Object(variables.clone()), &mut key);
        key.push('}');
        Self { operation, key }
    }

    /// Operation this identity pages through
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Canonical key string
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for QueryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Serialize a JSON value with object keys sorted
fn write_canonical(value: &JsonValue, out: &mut String) {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&JsonValue::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        JsonValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

// ============================================================================
// Token Chain
// ============================================================================

/// Continuation tokens discovered so far for one identity
///
/// Slot `n` (1-based) holds the token returned after fetching page `n`,
/// i.e. the token that fetches page `n + 1`. `None` in a slot is the
/// terminal marker: page `n` was the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenChain {
    slots: Vec<Option<String>>,
}

impl TokenChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of populated slots (pages fetched so far)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no page has been fetched yet
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot for `page`: `None` when the page was never fetched,
    /// `Some(None)` for the terminal marker
    pub fn slot(&self, page: u32) -> Option<Option<&str>> {
        let index = (page as usize).checked_sub(1)?;
        self.slots.get(index).map(Option::as_deref)
    }

    /// True when the last populated slot is the terminal marker
    pub fn is_complete(&self) -> bool {
        matches!(self.slots.last(), Some(None))
    }

    /// Record the token returned after fetching `page`
    ///
    /// Only the next unpopulated slot or an existing slot can be written.
    /// Rewriting an existing slot with a different token drops every later
    /// slot, since those were discovered from the old token.
    pub fn record(&mut self, page: u32, next_token: Option<String>) -> bool {
        if page == 0 {
            return false;
        }
        let index = page as usize - 1;

        if index < self.slots.len() {
            if self.slots[index] != next_token {
                self.slots[index] = next_token;
                self.slots.truncate(index + 1);
            }
            true
        } else if index == self.slots.len() {
            self.slots.push(next_token);
            true
        } else {
            false
        }
    }
}

// ============================================================================
// Page Cursor
// ============================================================================

/// What to send to the backend for a requested page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// First page, no token
    First,
    /// Resume after the given continuation token
    After(String),
    /// Page past the end, or not reachable from the pages fetched so far
    OutOfRange,
}

impl PageCursor {
    /// Token to send, if any
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::After(token) => Some(token),
            _ => None,
        }
    }

    /// Check if the page cannot be fetched
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange)
    }
}

// ============================================================================
// Sort Trigger
// ============================================================================

/// When a requested sort is forwarded as `sortDirection`
///
/// The default forwards the direction only when the sort field equals the
/// list operation name (e.g. sorting `listPostsByDate` by
/// `listPostsByDate`), which is how index-backed queries are selected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortTrigger {
    /// Sort field equals the list operation name
    #[default]
    QueryName,
    /// Sort field equals a fixed sentinel field
    Field(String),
    /// Any non-empty sort field
    Always,
    /// Never forward a sort
    Never,
}

impl SortTrigger {
    /// Check if a sort on `field` applies to `query_name`
    pub fn applies(&self, field: &str, query_name: &str) -> bool {
        match self {
            Self::QueryName => field == query_name,
            Self::Field(sentinel) => field == sentinel,
            Self::Always => !field.is_empty(),
            Self::Never => false,
        }
    }
}

// ============================================================================
// Fetch Results
// ============================================================================

/// One page as returned by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records on this page
    pub items: Vec<JsonValue>,
    /// Token for the following page, `None` when this was the last
    pub next_token: Option<String>,
}

impl Page {
    /// Check if the backend reported more pages
    pub fn has_more(&self) -> bool {
        self.next_token.is_some()
    }
}

/// Result of a list request as seen by the admin UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    /// Records on the requested page
    pub data: Vec<JsonValue>,
    /// Smallest total consistent with what has been seen
    pub total: u64,
}

impl ListResult {
    /// Empty result returned for out-of-range pages
    pub fn empty() -> Self {
        Self::default()
    }
}
