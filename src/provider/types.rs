//! Provider request and result types

use crate::types::{Identifier, JsonObject, JsonValue, Sort};
use serde::{Deserialize, Serialize};

/// Requested page and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Page number, 1-based
    pub page: u32,
    /// Records per page
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl Pagination {
    /// Create a pagination request
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }
}

/// Parameters of `get_list`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetListParams {
    /// Page to fetch
    #[serde(default)]
    pub pagination: Pagination,
    /// Requested sort
    #[serde(default)]
    pub sort: Option<Sort>,
    /// Filter object; a key naming a catalog query selects that query
    #[serde(default)]
    pub filter: JsonObject,
}

impl GetListParams {
    /// List params for one page
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            pagination: Pagination::new(page, per_page),
            ..Self::default()
        }
    }

    /// Set the sort
    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Add a filter entry
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.filter.insert(key.into(), value);
        self
    }
}

/// Parameters of `get_many_reference`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetManyReferenceParams {
    /// Reference field on the child records (`postID`)
    pub target: String,
    /// Id of the referenced record
    pub id: Identifier,
    /// Page to fetch
    #[serde(default)]
    pub pagination: Pagination,
    /// Requested sort
    #[serde(default)]
    pub sort: Option<Sort>,
    /// Additional filter, sent as the `filter` variable
    #[serde(default)]
    pub filter: JsonObject,
}

impl GetManyReferenceParams {
    /// Reference params for the first page
    pub fn new(target: impl Into<String>, id: impl Into<Identifier>) -> Self {
        Self {
            target: target.into(),
            id: id.into(),
            pagination: Pagination::default(),
            sort: None,
            filter: JsonObject::new(),
        }
    }
}

/// Parameters of `update`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParams {
    /// Record id
    pub id: Identifier,
    /// New record data
    pub data: JsonObject,
    /// Record as last read by the UI; its `_version` is forwarded when
    /// `data` has none
    #[serde(default)]
    pub previous_data: Option<JsonValue>,
}

/// Parameters of `delete`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    /// Record id
    pub id: Identifier,
    /// Record as last read by the UI; its `_version` is forwarded
    #[serde(default)]
    pub previous_data: Option<JsonValue>,
}

/// Result for one id of a bulk operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    /// Record id
    pub id: Identifier,
    /// Failure reason, `None` on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkOutcome {
    /// Successful outcome
    pub fn succeeded(id: Identifier) -> Self {
        Self { id, error: None }
    }

    /// Failed outcome
    pub fn failed(id: Identifier, error: impl Into<String>) -> Self {
        Self {
            id,
            error: Some(error.into()),
        }
    }

    /// Check if this id succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of a bulk operation, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResult {
    /// One outcome per requested id
    pub outcomes: Vec<BulkOutcome>,
}

impl BulkResult {
    /// Ids that succeeded, in input order
    pub fn succeeded_ids(&self) -> Vec<Identifier> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_success())
            .map(|outcome| outcome.id.clone())
            .collect()
    }

    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &BulkOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    /// Check if every id succeeded
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(BulkOutcome::is_success)
    }
}

impl FromIterator<BulkOutcome> for BulkResult {
    fn from_iter<I: IntoIterator<Item = BulkOutcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

/// Reference to a stored file, as a file field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageObject {
    /// Bucket name
    pub bucket: String,
    /// Bucket region
    pub region: String,
    /// Object key
    pub key: String,
}
