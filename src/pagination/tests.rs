//! Tests for the pagination module

use super::*;
use crate::catalog::OperationDocument;
use crate::graphql::mock::MockTransport;
use crate::types::{JsonObject, JsonValue, Sort, SortOrder};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;

fn vars(value: JsonValue) -> JsonObject {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("Expected object, got {other}"),
    }
}

fn identity(filter: JsonValue) -> QueryIdentity {
    QueryIdentity::new("listPosts", &vars(filter), 10)
}

// ============================================================================
// Query Identity Tests
// ============================================================================

#[test]
fn test_identity_ignores_key_order() {
    let a = QueryIdentity::new(
        "listPosts",
        &vars(json!({"filter": {"b": 1, "a": {"y": true, "x": null}}})),
        10,
    );
    let b = QueryIdentity::new(
        "listPosts",
        &vars(json!({"filter": {"a": {"x": null, "y": true}, "b": 1}})),
        10,
    );
    assert_eq!(a, b);
    assert_eq!(a.as_str(), b.as_str());
}

#[test]
fn test_identity_distinguishes_each_component() {
    let base = identity(json!({"filter": {"published": {"eq": true}}}));

    assert_ne!(base, identity(json!({"filter": {"published": {"eq": false}}})));
    assert_ne!(
        base,
        QueryIdentity::new("postsByDate", &vars(json!({"filter": {"published": {"eq": true}}})), 10)
    );
    assert_ne!(
        base,
        QueryIdentity::new("listPosts", &vars(json!({"filter": {"published": {"eq": true}}})), 25)
    );
}

#[test]
fn test_identity_array_order_matters() {
    assert_ne!(identity(json!({"ids": [1, 2]})), identity(json!({"ids": [2, 1]})));
}

// ============================================================================
// Token Chain Tests
// ============================================================================

#[test]
fn test_chain_builds_left_to_right() {
    let mut chain = TokenChain::new();
    assert!(chain.is_empty());

    assert!(!chain.record(2, Some("t2".into())));
    assert!(chain.record(1, Some("t1".into())));
    assert!(chain.record(2, Some("t2".into())));
    assert!(!chain.record(4, None));
    assert!(chain.record(3, None));

    assert_eq!(chain.len(), 3);
    assert_eq!(chain.slot(1), Some(Some("t1")));
    assert_eq!(chain.slot(3), Some(None));
    assert_eq!(chain.slot(4), None);
    assert_eq!(chain.slot(0), None);
    assert!(chain.is_complete());
}

#[test]
fn test_chain_rejects_page_zero() {
    let mut chain = TokenChain::new();
    assert!(!chain.record(0, Some("t".into())));
    assert!(chain.is_empty());
}

#[test]
fn test_chain_rewrite_truncates_later_slots() {
    let mut chain = TokenChain::new();
    chain.record(1, Some("t1".into()));
    chain.record(2, Some("t2".into()));
    chain.record(3, Some("t3".into()));

    // Same token: nothing changes
    assert!(chain.record(1, Some("t1".into())));
    assert_eq!(chain.len(), 3);

    // New token for page 1: pages 2 and 3 are stale
    assert!(chain.record(1, Some("t1b".into())));
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.slot(1), Some(Some("t1b")));
}

// ============================================================================
// Resolver Tests
// ============================================================================

fn chain_of(tokens: &[Option<&str>]) -> TokenChain {
    let mut chain = TokenChain::new();
    for (i, token) in tokens.iter().enumerate() {
        assert!(chain.record(i as u32 + 1, token.map(ToString::to_string)));
    }
    chain
}

#[test]
fn test_resolve_in_chain() {
    let cases: [(&[Option<&str>], u32, PageCursor); 7] = [
        // first page needs no chain
        (&[], 1, PageCursor::First),
        (&[], 2, PageCursor::OutOfRange),
        (&[Some("t1")], 2, PageCursor::After("t1".into())),
        // never fetches ahead
        (&[Some("t1")], 3, PageCursor::OutOfRange),
        // past the terminal marker
        (&[Some("t1"), None], 3, PageCursor::OutOfRange),
        (&[Some("t1"), Some("t2")], 2, PageCursor::After("t1".into())),
        (&[Some("t1")], 0, PageCursor::OutOfRange),
    ];

    for (tokens, page, expected) in cases {
        let chain = chain_of(tokens);
        let chain = (!tokens.is_empty()).then_some(&chain);
        assert_eq!(resolve_in_chain(chain, page), expected, "page {page} of {tokens:?}");
    }
}

#[tokio::test]
async fn test_resolver_reads_store() {
    let store = Arc::new(TokenStore::default());
    let resolver = PageResolver::new(Arc::clone(&store));
    let id = identity(json!({}));

    assert_eq!(resolver.resolve(&id, 1).await, PageCursor::First);
    assert_eq!(resolver.resolve(&id, 2).await, PageCursor::OutOfRange);

    store.set(&id, 1, Some("t1".into())).await;
    assert_eq!(
        resolver.resolve(&id, 2).await,
        PageCursor::After("t1".to_string())
    );
    assert!(resolver.resolve(&id, 3).await.is_out_of_range());
}

// ============================================================================
// Token Store Tests
// ============================================================================

#[tokio::test]
async fn test_store_rejects_gap_writes() {
    let store = TokenStore::default();
    let id = identity(json!({}));

    assert!(!store.set(&id, 2, Some("t2".into())).await);
    assert!(store.get(&id).await.is_none());

    assert!(store.set(&id, 1, Some("t1".into())).await);
    assert!(!store.set(&id, 3, None).await);
    assert_eq!(store.get(&id).await.map(|c| c.len()), Some(1));
}

#[tokio::test]
async fn test_store_isolates_identities() {
    let store = TokenStore::default();
    let published = identity(json!({"filter": {"published": {"eq": true}}}));
    let drafts = identity(json!({"filter": {"published": {"eq": false}}}));

    store.set(&published, 1, Some("p1".into())).await;
    store.set(&drafts, 1, Some("d1".into())).await;

    assert_eq!(
        store.get(&published).await.unwrap().slot(1),
        Some(Some("p1"))
    );
    assert_eq!(store.get(&drafts).await.unwrap().slot(1), Some(Some("d1")));
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_store_evicts_least_recently_used() {
    let store = TokenStore::new(TokenStoreConfig::new(2, None));
    let a = identity(json!({"n": "a"}));
    let b = identity(json!({"n": "b"}));
    let c = identity(json!({"n": "c"}));

    store.set(&a, 1, Some("a1".into())).await;
    store.set(&b, 1, Some("b1".into())).await;
    // Touch `a` so `b` is the eviction candidate
    assert!(store.get(&a).await.is_some());
    store.set(&c, 1, Some("c1".into())).await;

    assert_eq!(store.len().await, 2);
    assert!(store.get(&a).await.is_some());
    assert!(store.get(&b).await.is_none());
    assert!(store.get(&c).await.is_some());
}

#[tokio::test]
async fn test_store_expires_idle_chains() {
    let store = TokenStore::new(TokenStoreConfig::new(8, Some(Duration::from_millis(20))));
    let id = identity(json!({}));

    store.set(&id, 1, Some("t1".into())).await;
    assert!(store.get(&id).await.is_some());

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(store.get(&id).await.is_none());
    assert!(store.is_empty().await);

    // An expired chain restarts from page 1
    store.set(&id, 1, Some("t1".into())).await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!store.set(&id, 2, None).await);
}

#[tokio::test]
async fn test_store_age_counts_from_last_write() {
    let store = TokenStore::new(TokenStoreConfig::new(8, Some(Duration::from_millis(150))));
    let id = identity(json!({}));

    store.set(&id, 1, Some("t1".into())).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    // Reading does not extend the lifetime
    assert!(store.get(&id).await.is_some());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.get(&id).await.is_none());

    // A write does
    store.set(&id, 1, Some("t1".into())).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.set(&id, 2, Some("t2".into())).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.get(&id).await.map(|c| c.len()), Some(2));
}

#[tokio::test]
async fn test_store_drops_expired_chain_on_refused_write() {
    let store = TokenStore::new(TokenStoreConfig::new(8, Some(Duration::from_millis(20))));
    let id = identity(json!({}));

    store.set(&id, 1, Some("t1".into())).await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(!store.set(&id, 3, None).await);
    assert!(store.is_empty().await);
    assert!(store.remove(&id).await.is_none());
}

#[tokio::test]
async fn test_store_remove_and_clear() {
    let store = TokenStore::default();
    let a = identity(json!({"n": "a"}));
    let b = identity(json!({"n": "b"}));
    store.set(&a, 1, None).await;
    store.set(&b, 1, None).await;

    assert!(store.remove(&a).await.is_some_and(|c| c.is_complete()));
    assert_eq!(store.len().await, 1);
    store.clear().await;
    assert!(store.is_empty().await);
}

#[test]
fn test_store_config_clamps_zero() {
    let config = TokenStoreConfig::new(0, None);
    assert_eq!(config.max_identities.get(), 1);
    assert_eq!(TokenStoreConfig::default().max_identities.get(), 1024);
}

// ============================================================================
// Total and Sort Tests
// ============================================================================

#[test_case(1, 10, 10, true, 11 ; "full first page with more")]
#[test_case(1, 10, 7, false, 7 ; "short only page")]
#[test_case(3, 10, 10, true, 31 ; "third page with more")]
#[test_case(3, 10, 4, false, 24 ; "short last page")]
#[test_case(2, 10, 0, false, 10 ; "empty trailing page")]
fn test_approximate_total(page: u32, per_page: u32, returned: usize, more: bool, expected: u64) {
    assert_eq!(approximate_total(page, per_page, returned, more), expected);
}

#[test]
fn test_sort_trigger() {
    assert!(SortTrigger::QueryName.applies("listPosts", "listPosts"));
    assert!(!SortTrigger::QueryName.applies("title", "listPosts"));
    assert!(SortTrigger::Field("createdAt".into()).applies("createdAt", "listPosts"));
    assert!(SortTrigger::Always.applies("title", "listPosts"));
    assert!(!SortTrigger::Always.applies("", "listPosts"));
    assert!(!SortTrigger::Never.applies("listPosts", "listPosts"));
}

// ============================================================================
// Orchestrator Tests
// ============================================================================

fn list_posts() -> OperationDocument {
    OperationDocument::query("listPosts", "query ListPosts { ... }")
}

fn orchestrator(transport: &Arc<MockTransport>) -> ListOrchestrator {
    ListOrchestrator::new(transport.clone(), Arc::new(TokenStore::default()))
}

fn query<'a>(document: &'a OperationDocument, page: u32, sort: Option<&'a Sort>) -> ListQuery<'a> {
    ListQuery {
        document,
        variables: JsonObject::new(),
        page,
        per_page: 2,
        sort,
    }
}

#[tokio::test]
async fn test_orchestrator_records_returned_token() {
    let transport = Arc::new(MockTransport::new(|_, _| {
        Ok(json!({"listPosts": {"items": [{"id": 1}, {"id": 2}], "nextToken": "t1"}}))
    }));
    let orchestrator = orchestrator(&transport);
    let document = list_posts();

    let result = orchestrator.list(query(&document, 1, None)).await.unwrap();
    assert_eq!(result.total, 3);

    let id = QueryIdentity::new("listPosts", &JsonObject::new(), 2);
    let chain = orchestrator.store().get(&id).await.unwrap();
    assert_eq!(chain.slot(1), Some(Some("t1")));
}

#[tokio::test]
async fn test_orchestrator_out_of_range_short_circuits() {
    let transport = Arc::new(MockTransport::new(|_, _| panic!("no call expected")));
    let orchestrator = orchestrator(&transport);
    let document = list_posts();

    let result = orchestrator.list(query(&document, 5, None)).await.unwrap();
    assert_eq!(result, ListResult::empty());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_orchestrator_sort_is_part_of_identity() {
    let transport = Arc::new(MockTransport::new(|_, _| {
        Ok(json!({"listPosts": {"items": [{"id": 1}], "nextToken": "t1"}}))
    }));
    let orchestrator = orchestrator(&transport);
    let document = list_posts();
    let desc = Sort::new("listPosts", SortOrder::Desc);

    orchestrator.list(query(&document, 1, Some(&desc))).await.unwrap();

    // Ascending has its own chain, so page 2 is unknown there
    let asc = Sort::new("listPosts", SortOrder::Asc);
    let result = orchestrator.list(query(&document, 2, Some(&asc))).await.unwrap();
    assert_eq!(result.total, 0);

    orchestrator.list(query(&document, 2, Some(&desc))).await.unwrap();
    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1].1,
        json!({"sortDirection": "DESC", "limit": 2, "nextToken": "t1"})
    );
}

#[tokio::test]
async fn test_orchestrator_terminal_page() {
    let transport = Arc::new(MockTransport::new(|_, _| {
        Ok(json!({"listPosts": {"items": [{"id": 1}, null], "nextToken": null}}))
    }));
    let orchestrator = orchestrator(&transport);
    let document = list_posts();

    let result = orchestrator.list(query(&document, 1, None)).await.unwrap();
    // Null items still count toward the page
    assert_eq!(result.total, 2);
    assert_eq!(result.data.len(), 2);

    let result = orchestrator.list(query(&document, 2, None)).await.unwrap();
    assert_eq!(result.total, 0);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_orchestrator_empty_token_is_terminal() {
    let transport = Arc::new(MockTransport::new(|_, _| {
        Ok(json!({"listPosts": {"items": [], "nextToken": ""}}))
    }));
    let orchestrator = orchestrator(&transport);
    let document = list_posts();

    let result = orchestrator.list(query(&document, 1, None)).await.unwrap();
    assert_eq!(result.total, 0);
    assert!(orchestrator
        .store()
        .get(&QueryIdentity::new("listPosts", &JsonObject::new(), 2))
        .await
        .unwrap()
        .is_complete());
}

#[tokio::test]
async fn test_orchestrator_malformed_responses() {
    let document = list_posts();

    let null_field = Arc::new(MockTransport::new(|_, _| Ok(json!({"listPosts": null}))));
    let err = orchestrator(&null_field)
        .list(query(&document, 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, crate::Error::NoData { .. }));

    let no_items = Arc::new(MockTransport::new(|_, _| {
        Ok(json!({"listPosts": {"nextToken": null}}))
    }));
    let err = orchestrator(&no_items)
        .list(query(&document, 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, crate::Error::UnexpectedResponse { .. }));
}
