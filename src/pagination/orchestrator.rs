//! List orchestrator
//!
//! Drives exactly one backend call per list request and keeps the token
//! store in step with what the backend returned.

use super::resolver::PageResolver;
use super::store::TokenStore;
use super::types::{ListResult, Page, PageCursor, QueryIdentity, SortTrigger};
use crate::catalog::OperationDocument;
use crate::error::{Error, Result};
use crate::graphql::Transport;
use crate::types::{JsonObject, JsonValue, Sort};
use std::sync::Arc;
use tracing::debug;

/// Smallest total consistent with the page just fetched
///
/// `(page - 1) * per_page + returned`, plus one when the backend reported
/// more pages so the UI renders a "next" control.
pub fn approximate_total(page: u32, per_page: u32, returned: usize, has_more: bool) -> u64 {
    let before = u64::from(page.saturating_sub(1)) * u64::from(per_page);
    before + returned as u64 + u64::from(has_more)
}

/// A list request for one page
#[derive(Debug, Clone)]
pub struct ListQuery<'a> {
    /// List operation to run
    pub document: &'a OperationDocument,
    /// Filter and lookup variables (without `limit` / `nextToken`)
    pub variables: JsonObject,
    /// Requested page, 1-based
    pub page: u32,
    /// Page size, sent as `limit`
    pub per_page: u32,
    /// Requested sort, forwarded according to the sort trigger
    pub sort: Option<&'a Sort>,
}

/// Runs list operations against the backend through the token store
pub struct ListOrchestrator {
    transport: Arc<dyn Transport>,
    store: Arc<TokenStore>,
    resolver: PageResolver,
    sort_trigger: SortTrigger,
}

impl ListOrchestrator {
    /// Create an orchestrator
    pub fn new(transport: Arc<dyn Transport>, store: Arc<TokenStore>) -> Self {
        Self {
            transport,
            resolver: PageResolver::new(Arc::clone(&store)),
            store,
            sort_trigger: SortTrigger::default(),
        }
    }

    /// Set when sorts are forwarded
    #[must_use]
    pub fn with_sort_trigger(mut self, sort_trigger: SortTrigger) -> Self {
        self.sort_trigger = sort_trigger;
        self
    }

    /// The token store this orchestrator writes to
    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Variables that identify the result set, with the sort applied
    pub fn identity_variables(&self, query: &ListQuery<'_>) -> JsonObject {
        let mut variables = query.variables.clone();
        if let Some(sort) = query.sort {
            if self.sort_trigger.applies(&sort.field, &query.document.name) {
                variables.insert(
                    "sortDirection".to_string(),
                    JsonValue::from(sort.order.as_str()),
                );
            }
        }
        variables
    }

    /// Fetch one page and compute the UI-facing total
    pub async fn list(&self, query: ListQuery<'_>) -> Result<ListResult> {
        if query.per_page == 0 {
            return Err(Error::invalid_request("perPage must be at least 1"));
        }

        let variables = self.identity_variables(&query);
        let identity = QueryIdentity::new(&query.document.name, &variables, query.per_page);

        let cursor = self.resolver.resolve(&identity, query.page).await;
        if cursor == PageCursor::OutOfRange {
            debug!(
                "Page {} of {} out of range, returning empty result",
                query.page, query.document.name
            );
            return Ok(ListResult::empty());
        }

        let page = self
            .fetch_page(query.document, &variables, cursor.token(), query.per_page)
            .await?;

        self.store
            .set(&identity, query.page, page.next_token.clone())
            .await;

        let total =
            approximate_total(query.page, query.per_page, page.items.len(), page.has_more());
        Ok(ListResult {
            data: page.items,
            total,
        })
    }

    /// One backend round trip for a page
    ///
    /// Sends `variables` plus `limit`, and `nextToken` when resuming.
    pub async fn fetch_page(
        &self,
        document: &OperationDocument,
        variables: &JsonObject,
        token: Option<&str>,
        per_page: u32,
    ) -> Result<Page> {
        let mut request = variables.clone();
        request.insert("limit".to_string(), JsonValue::from(per_page));
        if let Some(token) = token {
            request.insert("nextToken".to_string(), JsonValue::from(token));
        }

        debug!(
            "Fetching {} (limit {}, resuming: {})",
            document.name,
            per_page,
            token.is_some()
        );
        let data = self
            .transport
            .execute(document, JsonValue::Object(request))
            .await?;

        parse_connection(&document.name, &data)
    }
}

/// Read `{items, nextToken}` from the operation's field in `data`
fn parse_connection(operation: &str, data: &JsonValue) -> Result<Page> {
    let connection = match data.get(operation) {
        Some(JsonValue::Null) | None => return Err(Error::no_data(operation)),
        Some(value) => value,
    };

    let items = connection
        .get("items")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| Error::unexpected(operation, "connection has no items array"))?
        .clone();

    let next_token = connection
        .get("nextToken")
        .and_then(JsonValue::as_str)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string);

    Ok(Page { items, next_token })
}

impl std::fmt::Debug for ListOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListOrchestrator")
            .field("sort_trigger", &self.sort_trigger)
            .finish_non_exhaustive()
    }
}
