//! Schema types

use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Fields the backend manages on every record
pub const DEFAULT_SERVER_MANAGED: [&str; 5] = [
    "_deleted",
    "_lastChangedAt",
    "createdAt",
    "updatedAt",
    TYPENAME_FIELD,
];

/// Type discriminator the backend adds to every object
pub const TYPENAME_FIELD: &str = "__typename";

/// Optimistic-concurrency version field
pub const VERSION_FIELD: &str = "_version";

/// Decides which fields of a record must not be sent back in an update
pub trait FieldPolicy: Send + Sync {
    /// Whether `field` is owned by the backend
    fn is_server_managed(&self, field: &str) -> bool;

    /// Whether `field` holds a related record rather than a scalar
    fn is_relation(&self, field: &str, value: &JsonValue) -> bool;

    /// Whether `field` is removed from update inputs
    fn strips(&self, field: &str, value: &JsonValue) -> bool {
        self.is_server_managed(field) || self.is_relation(field, value)
    }
}

/// Field policy for one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Backend-owned fields
    #[serde(default = "default_server_managed")]
    pub server_managed: BTreeSet<String>,

    /// Relation fields; when unset, relations are detected by `__typename`
    #[serde(default)]
    pub relations: Option<BTreeSet<String>>,
}

fn default_server_managed() -> BTreeSet<String> {
    DEFAULT_SERVER_MANAGED
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for ResourceSchema {
    fn default() -> Self {
        Self {
            server_managed: default_server_managed(),
            relations: None,
        }
    }
}

impl ResourceSchema {
    /// Schema with the default server-managed fields and detected relations
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a server-managed field
    #[must_use]
    pub fn server_managed(mut self, field: impl Into<String>) -> Self {
        self.server_managed.insert(field.into());
        self
    }

    /// Declare the relation fields explicitly
    #[must_use]
    pub fn relations<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

impl FieldPolicy for ResourceSchema {
    fn is_server_managed(&self, field: &str) -> bool {
        self.server_managed.contains(field)
    }

    fn is_relation(&self, field: &str, value: &JsonValue) -> bool {
        match &self.relations {
            Some(relations) => relations.contains(field),
            None => value
                .as_object()
                .is_some_and(|object| object.contains_key(TYPENAME_FIELD)),
        }
    }
}

/// Per-resource schemas with a shared fallback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    /// Schema for resources without an entry
    #[serde(default)]
    pub default: ResourceSchema,

    /// Schemas keyed by plural resource name
    #[serde(default, flatten)]
    pub resources: HashMap<String, ResourceSchema>,
}

impl SchemaRegistry {
    /// Registry where every resource uses the default schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource schema
    #[must_use]
    pub fn with(mut self, resource: impl Into<String>, schema: ResourceSchema) -> Self {
        self.resources.insert(resource.into(), schema);
        self
    }

    /// Schema for a resource
    pub fn get(&self, resource: &str) -> &ResourceSchema {
        self.resources.get(resource).unwrap_or(&self.default)
    }
}
