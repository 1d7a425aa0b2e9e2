//! HTTP server mode exposing the provider operations as a REST API
//!
//! Paths follow the admin contract: `/:resource` lists and creates,
//! `/:resource/:id` reads, updates and deletes one record, and the
//! `many`, `bulk` and `reference` sub-paths cover the multi-record calls.

use axum::{
    extract::{Path, Query, State},
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cli::runner::list_params;
use crate::error::{Error, Result};
use crate::pagination::ListResult;
use crate::provider::{DataProvider, DeleteParams, GetManyReferenceParams, UpdateParams};
use crate::types::{Identifier, JsonObject, JsonValue, SortOrder};

/// Header carrying the list total
const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// App state shared across handlers
type AppState = Arc<DataProvider>;

/// Query string of list and reference requests
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQueryParams {
    page: Option<u32>,
    per_page: Option<u32>,
    sort: Option<String>,
    order: Option<String>,
    /// Filter as a JSON object string
    filter: Option<String>,
}

impl ListQueryParams {
    fn to_list_params(&self) -> Result<crate::provider::GetListParams> {
        let order = match self.order.as_deref() {
            Some(order) => order.parse::<SortOrder>().map_err(Error::invalid_request)?,
            None => SortOrder::default(),
        };
        list_params(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(10),
            self.sort.as_deref(),
            order,
            self.filter.as_deref(),
        )
    }
}

/// Request body for update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest {
    data: JsonObject,
    #[serde(default)]
    previous_data: Option<JsonValue>,
}

/// Request body for delete
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    #[serde(default)]
    previous_data: Option<JsonValue>,
}

/// Request body for get many and bulk delete
#[derive(Debug, Deserialize)]
struct IdsRequest {
    ids: Vec<Identifier>,
}

/// Request body for bulk update
#[derive(Debug, Deserialize)]
struct BulkUpdateRequest {
    ids: Vec<Identifier>,
    data: JsonObject,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            total: None,
            error: Some(msg.into()),
        }
    }
}

impl ApiResponse<Vec<JsonValue>> {
    fn page(result: ListResult) -> Self {
        Self {
            success: true,
            data: Some(result.data),
            total: Some(result.total),
            error: None,
        }
    }
}

/// Provider error rendered with its HTTP status
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self.0);
        }
        (status, Json(ApiResponse::<()>::error(self.0.to_string()))).into_response()
    }
}

type ApiResult = std::result::Result<Response, ApiError>;

/// Build the router over a provider
pub fn router(provider: Arc<DataProvider>) -> Router {
    // Allow all origins; admin UIs are usually served from another host
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(TOTAL_COUNT_HEADER)]);

    Router::new()
        .route("/health", get(health))
        .route("/storage", get(storage))
        .route("/:resource", get(get_list).post(create))
        .route("/:resource/many", post(get_many))
        .route("/:resource/bulk", put(update_many).delete(delete_many))
        .route(
            "/:resource/reference/:target/:id",
            get(get_many_reference),
        )
        .route("/:resource/:id", get(get_one).put(update).delete(delete))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(provider)
}

/// Start the HTTP server
pub async fn serve(provider: Arc<DataProvider>, port: u16) -> Result<()> {
    let app = router(provider);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn storage(State(provider): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(provider.storage().cloned()))
}

/// Respond with one page and the `X-Total-Count` header
fn page_response(result: ListResult) -> Response {
    let total = HeaderValue::from(result.total);
    let mut response = Json(ApiResponse::<Vec<JsonValue>>::page(result)).into_response();
    response
        .headers_mut()
        .insert(HeaderName::from_static(TOTAL_COUNT_HEADER), total);
    response
}

async fn get_list(
    State(provider): State<AppState>,
    Path(resource): Path<String>,
    Query(query): Query<ListQueryParams>,
) -> ApiResult {
    let params = query.to_list_params()?;
    let result = provider.get_list(&resource, &params).await?;
    Ok(page_response(result))
}

async fn get_one(
    State(provider): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult {
    let record = provider.get_one(&resource, &Identifier::parse(&id)).await?;
    Ok(Json(ApiResponse::success(record)).into_response())
}

async fn get_many(
    State(provider): State<AppState>,
    Path(resource): Path<String>,
    Json(req): Json<IdsRequest>,
) -> ApiResult {
    let records = provider.get_many(&resource, &req.ids).await?;
    Ok(Json(ApiResponse::success(records)).into_response())
}

async fn get_many_reference(
    State(provider): State<AppState>,
    Path((resource, target, id)): Path<(String, String, String)>,
    Query(query): Query<ListQueryParams>,
) -> ApiResult {
    let list = query.to_list_params()?;
    let params = GetManyReferenceParams {
        target,
        id: Identifier::parse(&id),
        pagination: list.pagination,
        sort: list.sort,
        filter: list.filter,
    };
    let result = provider.get_many_reference(&resource, &params).await?;
    Ok(page_response(result))
}

async fn create(
    State(provider): State<AppState>,
    Path(resource): Path<String>,
    Json(data): Json<JsonObject>,
) -> ApiResult {
    let record = provider.create(&resource, &data).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))).into_response())
}

async fn update(
    State(provider): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    Json(req): Json<UpdateRequest>,
) -> ApiResult {
    let params = UpdateParams {
        id: Identifier::parse(&id),
        data: req.data,
        previous_data: req.previous_data,
    };
    let record = provider.update(&resource, &params).await?;
    Ok(Json(ApiResponse::success(record)).into_response())
}

async fn update_many(
    State(provider): State<AppState>,
    Path(resource): Path<String>,
    Json(req): Json<BulkUpdateRequest>,
) -> ApiResult {
    let result = provider.update_many(&resource, &req.ids, &req.data).await?;
    Ok(Json(ApiResponse::success(result)).into_response())
}

async fn delete(
    State(provider): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    body: Option<Json<DeleteRequest>>,
) -> ApiResult {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let params = DeleteParams {
        id: Identifier::parse(&id),
        previous_data: req.previous_data,
    };
    let record = provider.delete(&resource, &params).await?;
    Ok(Json(ApiResponse::success(record)).into_response())
}

async fn delete_many(
    State(provider): State<AppState>,
    Path(resource): Path<String>,
    Json(req): Json<IdsRequest>,
) -> ApiResult {
    let result = provider.delete_many(&resource, &req.ids).await?;
    Ok(Json(ApiResponse::success(result)).into_response())
}
