//! Catalog types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of GraphQL operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Read operation
    Query,
    /// Write operation
    Mutation,
}

impl OperationKind {
    /// GraphQL keyword for this kind
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A named operation document
///
/// `name` is the root field the operation selects (`getPost`), which is
/// also the key of its result in the response `data` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDocument {
    /// Catalog name / root field
    pub name: String,
    /// Query or mutation
    pub kind: OperationKind,
    /// GraphQL source text
    pub document: String,
    /// Operation name declared in the document (`GetPost`), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl OperationDocument {
    /// Create a query document
    pub fn query(name: impl Into<String>, document: impl Into<String>) -> Self {
        Self::new(name, OperationKind::Query, document)
    }

    /// Create a mutation document
    pub fn mutation(name: impl Into<String>, document: impl Into<String>) -> Self {
        Self::new(name, OperationKind::Mutation, document)
    }

    /// Create a document of the given kind
    pub fn new(name: impl Into<String>, kind: OperationKind, document: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            document: document.into(),
            operation_name: None,
        }
    }

    /// Set the declared operation name
    #[must_use]
    pub fn with_operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }
}
