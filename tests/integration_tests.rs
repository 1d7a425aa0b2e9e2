//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML config → provider → GraphQL requests

use graphql_admin_provider::template::TemplateContext;
use graphql_admin_provider::types::Identifier;
use graphql_admin_provider::{DataProvider, Error, GetListParams, ProviderConfig, UpdateParams};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIG: &str = r#"
endpoint: "{{ vars.endpoint }}"
auth:
  type: api_key
  value: "{{ env.TEST_APPSYNC_KEY }}"
http:
  max_retries: 0
  rate_limit: null
operations:
  queries:
    listPosts: "query ListPosts($limit: Int, $nextToken: String) { listPosts(limit: $limit, nextToken: $nextToken) { items { id title } nextToken } }"
    getPost: "query GetPost($id: ID!) { getPost(id: $id) { id title } }"
  mutations:
    updatePost: "mutation UpdatePost($input: UpdatePostInput!) { updatePost(input: $input) { id title } }"
"#;

fn provider(server: &MockServer) -> DataProvider {
    let ctx = TemplateContext::new()
        .with_env("TEST_APPSYNC_KEY", "da2-test")
        .with_vars(json!({ "endpoint": format!("{}/graphql", server.uri()) }));
    let config = ProviderConfig::from_yaml_str(CONFIG, &ctx).unwrap();
    DataProvider::from_config(&config).unwrap()
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

// ============================================================================
// List Paging
// ============================================================================

#[tokio::test]
async fn test_pages_follow_next_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({"variables": {"nextToken": "t1"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"listPosts": {"items": [{"id": "3"}], "nextToken": null}}
        })))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-api-key", "da2-test"))
        .and(body_partial_json(json!({"variables": {"limit": 2}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"listPosts": {"items": [{"id": "1"}, {"id": "2"}], "nextToken": "t1"}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider(&mock_server);

    let first = provider
        .get_list("posts", &GetListParams::page(1, 2))
        .await
        .unwrap();
    assert_eq!(first.data, vec![json!({"id": "1"}), json!({"id": "2"})]);
    assert_eq!(first.total, 3);

    let second = provider
        .get_list("posts", &GetListParams::page(2, 2))
        .await
        .unwrap();
    assert_eq!(second.data, vec![json!({"id": "3"})]);
    assert_eq!(second.total, 3);

    // Past the last page nothing is fetched
    let third = provider
        .get_list("posts", &GetListParams::page(3, 2))
        .await
        .unwrap();
    assert!(third.data.is_empty());
    assert_eq!(third.total, 0);

    let bodies = request_bodies(&mock_server).await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[1]["variables"], json!({"limit": 2, "nextToken": "t1"}));
}

#[tokio::test]
async fn test_unvisited_page_sends_no_request() {
    let mock_server = MockServer::start().await;
    let provider = provider(&mock_server);

    let result = provider
        .get_list("posts", &GetListParams::page(4, 10))
        .await
        .unwrap();

    assert!(result.data.is_empty());
    assert_eq!(result.total, 0);
    assert!(request_bodies(&mock_server).await.is_empty());
}

#[tokio::test]
async fn test_graphql_errors_fail_the_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"listPosts": null},
            "errors": [{"message": "Not Authorized to access listPosts", "errorType": "Unauthorized"}]
        })))
        .mount(&mock_server)
        .await;

    let provider = provider(&mock_server);
    let err = provider
        .get_list("posts", &GetListParams::page(1, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::GraphQl { .. }));
    assert_eq!(err.status_code(), 502);
    assert!(provider.token_store().is_empty().await);
}

// ============================================================================
// Single Records
// ============================================================================

#[tokio::test]
async fn test_get_one_missing_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({"variables": {"id": "nope"}})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"getPost": null}})),
        )
        .mount(&mock_server)
        .await;

    let provider = provider(&mock_server);
    let err = provider
        .get_one("posts", &Identifier::from("nope"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_update_sends_sanitized_input() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"updatePost": {"id": "p1", "title": "New"}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider(&mock_server);
    let data = json!({
        "title": "New",
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-02T00:00:00Z",
        "__typename": "Post",
        "author": {"__typename": "Author", "id": "a1"},
        "tags": ["x"]
    });
    let params = UpdateParams {
        id: Identifier::from("p1"),
        data: data.as_object().cloned().unwrap(),
        previous_data: None,
    };

    let record = provider.update("posts", &params).await.unwrap();
    assert_eq!(record, json!({"id": "p1", "title": "New"}));

    let bodies = request_bodies(&mock_server).await;
    assert_eq!(
        bodies[0]["variables"],
        json!({"input": {"id": "p1", "title": "New", "tags": ["x"]}})
    );
}
