//! Data provider implementation

use super::types::{
    BulkOutcome, BulkResult, DeleteParams, GetListParams, GetManyReferenceParams, StorageObject,
    UpdateParams,
};
use crate::catalog::{query_name, reference_query_name, Action, OperationCatalog, OperationDocument};
use crate::config::{ProviderConfig, StorageConfig};
use crate::error::{Error, Result};
use crate::graphql::{GraphQlTransport, Transport};
use crate::pagination::{ListOrchestrator, ListQuery, ListResult, SortTrigger, TokenStore};
use crate::schema::{delete_input, forward_version, sanitize_update_input, update_input, SchemaRegistry};
use crate::types::{Identifier, JsonObject, JsonValue};
use futures::stream::{self, StreamExt};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// Builder
// ============================================================================

/// Builder for a [`DataProvider`]
pub struct DataProviderBuilder {
    transport: Arc<dyn Transport>,
    catalog: OperationCatalog,
    store: Option<Arc<TokenStore>>,
    sort_trigger: SortTrigger,
    schemas: SchemaRegistry,
    storage: Option<StorageConfig>,
}

impl DataProviderBuilder {
    /// Share an existing token store
    #[must_use]
    pub fn token_store(mut self, store: Arc<TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set when sorts are forwarded
    #[must_use]
    pub fn sort_trigger(mut self, sort_trigger: SortTrigger) -> Self {
        self.sort_trigger = sort_trigger;
        self
    }

    /// Set per-resource field policies
    #[must_use]
    pub fn schemas(mut self, schemas: SchemaRegistry) -> Self {
        self.schemas = schemas;
        self
    }

    /// Set file storage settings
    #[must_use]
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Build the provider
    pub fn build(self) -> DataProvider {
        let store = self.store.unwrap_or_default();
        let orchestrator = ListOrchestrator::new(Arc::clone(&self.transport), store)
            .with_sort_trigger(self.sort_trigger);

        DataProvider {
            transport: self.transport,
            catalog: self.catalog,
            orchestrator,
            schemas: self.schemas,
            storage: self.storage,
        }
    }
}

// ============================================================================
// Data Provider
// ============================================================================

/// Page-oriented CRUD over a cursor-paginated GraphQL backend
pub struct DataProvider {
    transport: Arc<dyn Transport>,
    catalog: OperationCatalog,
    orchestrator: ListOrchestrator,
    schemas: SchemaRegistry,
    storage: Option<StorageConfig>,
}

impl DataProvider {
    /// Start building a provider
    pub fn builder(transport: Arc<dyn Transport>, catalog: OperationCatalog) -> DataProviderBuilder {
        DataProviderBuilder {
            transport,
            catalog,
            store: None,
            sort_trigger: SortTrigger::default(),
            schemas: SchemaRegistry::default(),
            storage: None,
        }
    }

    /// Provider with default settings
    pub fn new(transport: Arc<dyn Transport>, catalog: OperationCatalog) -> Self {
        Self::builder(transport, catalog).build()
    }

    /// Build the HTTP transport, catalog and token store from a config
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let catalog = config.load_catalog()?;
        let transport = GraphQlTransport::from_config(
            &config.endpoint,
            config.http.to_client_config(),
            config.auth.clone(),
        )?;

        info!(
            "Provider for {} with {} operations",
            config.endpoint,
            catalog.len()
        );

        let mut builder = Self::builder(Arc::new(transport), catalog)
            .token_store(Arc::new(TokenStore::new(
                config.pagination.to_store_config(),
            )))
            .sort_trigger(config.pagination.sort_trigger.clone())
            .schemas(config.resources.clone());
        if let Some(storage) = &config.storage {
            builder = builder.storage(storage.clone());
        }

        Ok(builder.build())
    }

    /// The operation catalog
    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// The token store list requests go through
    pub fn token_store(&self) -> &Arc<TokenStore> {
        self.orchestrator.store()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// One page of a resource
    pub async fn get_list(&self, resource: &str, params: &GetListParams) -> Result<ListResult> {
        let (document, variables) = self.list_source(resource, &params.filter)?;

        self.orchestrator
            .list(ListQuery {
                document,
                variables,
                page: params.pagination.page,
                per_page: params.pagination.per_page,
                sort: params.sort.as_ref(),
            })
            .await
    }

    /// One record, or [`Error::NotFound`]
    pub async fn get_one(&self, resource: &str, id: &Identifier) -> Result<JsonValue> {
        let document = self.catalog.query(&query_name(Action::Get, resource))?;

        match self.execute(document, json!({ "id": id.to_value() })).await {
            Ok(JsonValue::Null) | Err(Error::NoData { .. }) => {
                Err(Error::not_found(resource, id.to_string()))
            }
            other => other,
        }
    }

    /// Several records by id, fetched one at a time in input order
    pub async fn get_many(&self, resource: &str, ids: &[Identifier]) -> Result<Vec<JsonValue>> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            records.push(self.get_one(resource, id).await?);
        }
        Ok(records)
    }

    /// One page of the records referencing `params.id` through `params.target`
    pub async fn get_many_reference(
        &self,
        resource: &str,
        params: &GetManyReferenceParams,
    ) -> Result<ListResult> {
        let name = reference_query_name(Action::List, resource, &params.target);
        let document = self.catalog.query(&name)?;

        let mut variables = JsonObject::new();
        variables.insert(params.target.clone(), params.id.to_value());
        if !params.filter.is_empty() {
            variables.insert(
                "filter".to_string(),
                JsonValue::Object(params.filter.clone()),
            );
        }

        self.orchestrator
            .list(ListQuery {
                document,
                variables,
                page: params.pagination.page,
                per_page: params.pagination.per_page,
                sort: params.sort.as_ref(),
            })
            .await
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create a record from `data` as given
    pub async fn create(&self, resource: &str, data: &JsonObject) -> Result<JsonValue> {
        let document = self.catalog.mutation(&query_name(Action::Create, resource))?;
        self.mutate(document, JsonValue::Object(data.clone())).await
    }

    /// Update a record, minus the fields the backend owns
    ///
    /// Without `_version` in the data, the one from `previous_data` is sent
    /// so conflict detection sees the version the caller edited.
    pub async fn update(&self, resource: &str, params: &UpdateParams) -> Result<JsonValue> {
        let document = self.catalog.mutation(&query_name(Action::Update, resource))?;

        let mut input = sanitize_update_input(&params.data, self.schemas.get(resource));
        input
            .entry("id")
            .or_insert_with(|| params.id.to_value());
        forward_version(&mut input, params.previous_data.as_ref());

        self.mutate(document, JsonValue::Object(input)).await
    }

    /// Apply the same update to every id, one at a time
    pub async fn update_many(
        &self,
        resource: &str,
        ids: &[Identifier],
        data: &JsonObject,
    ) -> Result<BulkResult> {
        let document = self.catalog.mutation(&query_name(Action::Update, resource))?;
        let schema = self.schemas.get(resource);

        Ok(self
            .bulk(resource, "update", ids, |id| {
                let input = update_input(id, data, schema);
                self.mutate(document, JsonValue::Object(input))
            })
            .await)
    }

    /// Delete a record, forwarding `_version` from the previous data
    pub async fn delete(&self, resource: &str, params: &DeleteParams) -> Result<JsonValue> {
        let document = self.catalog.mutation(&query_name(Action::Delete, resource))?;
        let input = delete_input(&params.id, params.previous_data.as_ref());
        self.mutate(document, JsonValue::Object(input)).await
    }

    /// Delete every id, one at a time
    pub async fn delete_many(&self, resource: &str, ids: &[Identifier]) -> Result<BulkResult> {
        let document = self.catalog.mutation(&query_name(Action::Delete, resource))?;

        Ok(self
            .bulk(resource, "delete", ids, |id| {
                let input = delete_input(id, None);
                self.mutate(document, JsonValue::Object(input))
            })
            .await)
    }

    // ========================================================================
    // Storage
    // ========================================================================

    /// Bucket and region for file fields, if configured
    pub fn storage(&self) -> Option<&StorageConfig> {
        self.storage.as_ref()
    }

    /// Reference to an object in the configured bucket
    pub fn storage_object(&self, key: impl Into<String>) -> Result<StorageObject> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| Error::config("No storage configured"))?;

        Ok(StorageObject {
            bucket: storage.bucket.clone(),
            region: storage.region.clone(),
            key: key.into(),
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Pick the list document and its variables for a filter
    ///
    /// When the first filter key names a catalog query, that query runs
    /// with the value under the key as its variables. Otherwise the whole
    /// filter goes to the resource's list query as `filter`.
    fn list_source<'a>(
        &'a self,
        resource: &str,
        filter: &JsonObject,
    ) -> Result<(&'a OperationDocument, JsonObject)> {
        if let Some((name, value)) = filter
            .iter()
            .next()
            .filter(|(key, _)| self.catalog.has_query(key))
        {
            let variables = match value {
                JsonValue::Object(variables) => variables.clone(),
                JsonValue::Null => JsonObject::new(),
                other => {
                    return Err(Error::invalid_request(format!(
                        "Filter for query '{name}' must be an object, got {other}"
                    )))
                }
            };
            debug!("Filter selects query {}", name);
            return Ok((self.catalog.query(name)?, variables));
        }

        let document = self.catalog.query(&query_name(Action::List, resource))?;
        let mut variables = JsonObject::new();
        if !filter.is_empty() {
            variables.insert("filter".to_string(), JsonValue::Object(filter.clone()));
        }
        Ok((document, variables))
    }

    /// Run an operation and return the value of its root field
    async fn execute(&self, document: &OperationDocument, variables: JsonValue) -> Result<JsonValue> {
        let mut data = self.transport.execute(document, variables).await?;
        Ok(data
            .get_mut(&document.name)
            .map(JsonValue::take)
            .unwrap_or(JsonValue::Null))
    }

    /// Run a mutation with `{input}` and return the affected record
    async fn mutate(&self, document: &OperationDocument, input: JsonValue) -> Result<JsonValue> {
        match self.execute(document, json!({ "input": input })).await? {
            JsonValue::Null => Err(Error::no_data(&document.name)),
            record => Ok(record),
        }
    }

    /// Run `op` for each id in order, recording failures instead of stopping
    async fn bulk<'a, F, Fut>(
        &self,
        resource: &str,
        action: &str,
        ids: &'a [Identifier],
        op: F,
    ) -> BulkResult
    where
        F: Fn(&'a Identifier) -> Fut,
        Fut: std::future::Future<Output = Result<JsonValue>>,
    {
        let op = &op;
        let outcomes: Vec<BulkOutcome> = stream::iter(ids)
            .then(|id| async move {
                match op(id).await {
                    Ok(_) => BulkOutcome::succeeded(id.clone()),
                    Err(e) => {
                        warn!("Failed to {} {} {}: {}", action, resource, id, e);
                        BulkOutcome::failed(id.clone(), e.to_string())
                    }
                }
            })
            .collect()
            .await;
        let result = BulkResult { outcomes };

        debug!(
            "Bulk {} on {}: {}/{} succeeded",
            action,
            resource,
            result.succeeded_ids().len(),
            ids.len()
        );
        result
    }
}

impl std::fmt::Debug for DataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProvider")
            .field("operations", &self.catalog.len())
            .field("orchestrator", &self.orchestrator)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}
