//! Transport trait and its HTTP implementation

use super::types::{GraphQlRequest, GraphQlResponse};
use crate::auth::AuthConfig;
use crate::catalog::OperationDocument;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::types::JsonValue;
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// Executes catalog operations against a backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run `operation` with `variables` and return the response `data`
    async fn execute(&self, operation: &OperationDocument, variables: JsonValue)
        -> Result<JsonValue>;
}

/// GraphQL over HTTP POST
#[derive(Debug)]
pub struct GraphQlTransport {
    client: HttpClient,
    endpoint: Url,
}

impl GraphQlTransport {
    /// Create a transport for `endpoint` using an existing client
    pub fn new(client: HttpClient, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "GraphQL endpoint must be http(s), got '{}'",
                endpoint.scheme()
            )));
        }
        Ok(Self { client, endpoint })
    }

    /// Build the client from HTTP and auth settings
    pub fn from_config(
        endpoint: &str,
        http: HttpClientConfig,
        auth: AuthConfig,
    ) -> Result<Self> {
        Self::new(HttpClient::with_auth(http, auth)?, endpoint)
    }

    /// The endpoint requests are posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for GraphQlTransport {
    async fn execute(
        &self,
        operation: &OperationDocument,
        variables: JsonValue,
    ) -> Result<JsonValue> {
        debug!("Executing {} {}", operation.kind, operation.name);

        let request = GraphQlRequest::new(operation, variables);
        let response: GraphQlResponse = self
            .client
            .post_json(self.endpoint.as_str(), &request)
            .await?;

        response.into_data(&operation.name)
    }
}
