//! Common types used throughout the provider
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Record Identifier
// ============================================================================

/// Identifier of a single record
///
/// Admin UIs send both numeric and string ids; GraphQL `ID` values are
/// transmitted as they were received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Int(i64),
    Str(String),
}

impl Identifier {
    /// The id as a JSON value for operation variables
    pub fn to_value(&self) -> JsonValue {
        match self {
            Self::Int(n) => JsonValue::from(*n),
            Self::Str(s) => JsonValue::from(s.as_str()),
        }
    }

    /// Read an id out of a JSON value
    pub fn from_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(n) => n.as_i64().map(Self::Int),
            JsonValue::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }

    /// Id from a path segment or argument
    ///
    /// Only a canonical integer becomes numeric; `007`, `+5` or `-0` keep
    /// their exact text.
    pub fn parse(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => Self::Int(n),
            _ => Self::Str(s.to_string()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

// ============================================================================
// Sort Order
// ============================================================================

/// Sort direction as sent by the admin UI and forwarded as `sortDirection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// The GraphQL enum literal (`ASC` / `DESC`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(format!("invalid sort order: {other}")),
        }
    }
}

/// Sort field and direction requested by the admin UI
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sort {
    /// Field to sort by
    pub field: String,
    /// Direction
    #[serde(default)]
    pub order: SortOrder,
}

impl Sort {
    /// Sort on `field` in `order`
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_untagged() {
        let id: Identifier = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(id, Identifier::Int(7));

        let id: Identifier = serde_json::from_value(json!("a-1")).unwrap();
        assert_eq!(id, Identifier::Str("a-1".to_string()));
        assert_eq!(id.to_string(), "a-1");
        assert_eq!(id.to_value(), json!("a-1"));
    }

    #[test]
    fn test_identifier_from_value() {
        assert_eq!(Identifier::from_value(&json!(3)), Some(Identifier::Int(3)));
        assert_eq!(Identifier::from_value(&json!(null)), None);
    }

    #[test]
    fn test_identifier_parse() {
        assert_eq!(Identifier::parse("42"), Identifier::Int(42));
        assert_eq!(Identifier::parse("-3"), Identifier::Int(-3));
        for text in ["007", "+5", "-0", "99999999999999999999"] {
            assert_eq!(Identifier::parse(text).to_value(), json!(text));
        }
        assert_eq!(
            Identifier::parse("5f1c-uuid"),
            Identifier::Str("5f1c-uuid".to_string())
        );
    }

    #[test]
    fn test_sort_order() {
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(serde_json::to_value(SortOrder::Asc).unwrap(), json!("ASC"));
    }

    #[test]
    fn test_backoff_serde() {
        let backoff: BackoffType = serde_json::from_str("\"linear\"").unwrap();
        assert_eq!(backoff, BackoffType::Linear);
    }
}
