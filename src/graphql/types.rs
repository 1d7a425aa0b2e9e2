//! GraphQL wire types

use crate::catalog::OperationDocument;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Request body for a GraphQL POST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    /// Operation document
    pub query: String,
    /// Operation variables
    pub variables: JsonValue,
    /// Operation to run when the document declares several
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphQlRequest {
    /// Build a request for a catalog document
    pub fn new(operation: &OperationDocument, variables: JsonValue) -> Self {
        Self {
            query: operation.document.clone(),
            variables,
            operation_name: operation.operation_name.clone(),
        }
    }
}

/// One entry of a response `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlError {
    /// Human-readable message
    pub message: String,
    /// AppSync error type (`Unauthorized`, `DynamoDB:ConditionalCheckFailedException`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Response path of the failing field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<JsonValue>>,
}

impl GraphQlError {
    /// Message prefixed with the error type when one is present
    pub fn describe(&self) -> String {
        match &self.error_type {
            Some(error_type) => format!("{error_type}: {}", self.message),
            None => self.message.clone(),
        }
    }
}

/// Response envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlResponse {
    /// Result data
    #[serde(default)]
    pub data: Option<JsonValue>,
    /// Errors reported by the server
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

impl GraphQlResponse {
    /// Unwrap the `data` object
    ///
    /// Any reported error fails the call even when partial data came back.
    pub fn into_data(self, operation: &str) -> Result<JsonValue> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            return Err(Error::GraphQl {
                operation: operation.to_string(),
                messages: errors.iter().map(GraphQlError::describe).collect(),
            });
        }

        match self.data {
            Some(JsonValue::Null) | None => Err(Error::no_data(operation)),
            Some(data) => Ok(data),
        }
    }
}
