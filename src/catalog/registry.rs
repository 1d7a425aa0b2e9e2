//! Operation catalog and its loaders
//!
//! A catalog can be built from:
//! - YAML with `queries:` and `mutations:` maps of name to document
//! - GraphQL source holding one or more operations (codegen layout,
//!   `query GetPost($id: ID!) { getPost(id: $id) { ... } }`)
//! - a directory of `*.graphql`, `*.gql`, `*.yaml` and `*.yml` files

use super::types::{OperationDocument, OperationKind};
use crate::error::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Start of an operation definition: keyword and optional name
static OPERATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(query|mutation|subscription)\b\s*([A-Za-z_][A-Za-z0-9_]*)?").unwrap()
});

/// First field inside a selection set
static ROOT_FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[A-Za-z_][A-Za-z0-9_]*\s*:\s*)?([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    queries: HashMap<String, String>,
    #[serde(default)]
    mutations: HashMap<String, String>,
}

/// Read and write operations keyed by name
#[derive(Debug, Clone, Default)]
pub struct OperationCatalog {
    queries: HashMap<String, OperationDocument>,
    mutations: HashMap<String, OperationDocument>,
}

impl OperationCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, replacing any previous one with the same name and kind
    pub fn insert(&mut self, document: OperationDocument) {
        let map = match document.kind {
            OperationKind::Query => &mut self.queries,
            OperationKind::Mutation => &mut self.mutations,
        };
        map.insert(document.name.clone(), document);
    }

    /// Add a document (builder style)
    #[must_use]
    pub fn with(mut self, document: OperationDocument) -> Self {
        self.insert(document);
        self
    }

    /// Move every document of `other` into this catalog
    pub fn merge(&mut self, other: OperationCatalog) {
        self.queries.extend(other.queries);
        self.mutations.extend(other.mutations);
    }

    /// Look up a query; a missing name is a configuration error
    pub fn query(&self, name: &str) -> Result<&OperationDocument> {
        self.queries
            .get(name)
            .ok_or_else(|| Error::operation_not_found(OperationKind::Query.keyword(), name))
    }

    /// Look up a mutation; a missing name is a configuration error
    pub fn mutation(&self, name: &str) -> Result<&OperationDocument> {
        self.mutations
            .get(name)
            .ok_or_else(|| Error::operation_not_found(OperationKind::Mutation.keyword(), name))
    }

    /// Check if a query with this name exists
    pub fn has_query(&self, name: &str) -> bool {
        self.queries.contains_key(name)
    }

    /// Check if a mutation with this name exists
    pub fn has_mutation(&self, name: &str) -> bool {
        self.mutations.contains_key(name)
    }

    /// Sorted query names
    pub fn query_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.queries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Sorted mutation names
    pub fn mutation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mutations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Total number of documents
    pub fn len(&self) -> usize {
        self.queries.len() + self.mutations.len()
    }

    /// Check if the catalog has no documents
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a catalog from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse operation catalog YAML: {e}")))?;

        let mut catalog = Self::new();
        for (name, document) in file.queries {
            catalog.insert(OperationDocument::query(name, document));
        }
        for (name, document) in file.mutations {
            catalog.insert(OperationDocument::mutation(name, document));
        }
        Ok(catalog)
    }

    /// Build a catalog from GraphQL source with one or more operations
    ///
    /// Each operation is keyed by its root field. Subscriptions are skipped.
    pub fn from_graphql_str(source: &str) -> Result<Self> {
        let starts: Vec<_> = OPERATION_REGEX.captures_iter(source).collect();
        if starts.is_empty() {
            return Err(Error::config("No GraphQL operations found in document"));
        }

        let mut catalog = Self::new();
        for (i, caps) in starts.iter().enumerate() {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let end = starts
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(source.len(), |m| m.start());
            let text = source[whole.start..end].trim();

            let kind = match caps.get(1).map(|m| m.as_str()) {
                Some("query") => OperationKind::Query,
                Some("mutation") => OperationKind::Mutation,
                _ => continue,
            };
            let operation_name = caps.get(2).map(|m| m.as_str().to_string());

            let name = root_field(&source[whole.end..end])
                .or_else(|| operation_name.as_deref().map(lower_first))
                .ok_or_else(|| {
                    Error::config(format!("Cannot determine root field of operation: {text}"))
                })?;

            let mut document = OperationDocument::new(name, kind, text);
            document.operation_name = operation_name;
            catalog.insert(document);
        }
        Ok(catalog)
    }

    /// Load a catalog file (by extension) or every catalog file in a directory
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        if path.is_dir() {
            let mut entries: Vec<_> = fs::read_dir(path)?
                .filter_map(std::result::Result::ok)
                .map(|e| e.path())
                .filter(|p| p.is_file() && catalog_extension(p).is_some())
                .collect();
            entries.sort();

            let mut catalog = Self::new();
            for entry in entries {
                catalog.merge(Self::from_file(&entry)?);
            }
            debug!(
                "Loaded {} operations from {}",
                catalog.len(),
                path.display()
            );
            return Ok(catalog);
        }

        Self::from_file(path)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read operation file '{}': {}",
                path.display(),
                e
            ))
        })?;

        match catalog_extension(path) {
            Some(CatalogFormat::Yaml) => Self::from_yaml_str(&content),
            Some(CatalogFormat::GraphQl) => Self::from_graphql_str(&content),
            None => Err(Error::config(format!(
                "Unsupported operation file '{}' (expected .graphql, .gql, .yaml or .yml)",
                path.display()
            ))),
        }
    }
}

enum CatalogFormat {
    Yaml,
    GraphQl,
}

fn catalog_extension(path: &Path) -> Option<CatalogFormat> {
    match path.extension()?.to_str()? {
        "yaml" | "yml" => Some(CatalogFormat::Yaml),
        "graphql" | "gql" => Some(CatalogFormat::GraphQl),
        _ => None,
    }
}

/// First field of the operation's top-level selection set
fn root_field(body: &str) -> Option<String> {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '{' if depth == 0 => {
                return ROOT_FIELD_REGEX
                    .captures(&body[i + 1..])
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string());
            }
            _ => {}
        }
    }
    None
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
