//! Operation naming convention

use std::fmt;

/// Admin action mapped onto an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Prefix used in operation names
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Whether the action addresses the whole collection
    pub fn is_plural(self) -> bool {
        matches!(self, Self::List)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper-case the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Drop the trailing pluralizing `s`
pub fn singularize(resource: &str) -> &str {
    resource.strip_suffix('s').unwrap_or(resource)
}

/// Operation name for an action on a resource
///
/// `(List, "posts")` -> `listPosts`, `(Get, "posts")` -> `getPost`.
pub fn query_name(action: Action, resource: &str) -> String {
    let subject = if action.is_plural() {
        resource
    } else {
        singularize(resource)
    };
    format!("{}{}", action.as_str(), capitalize(subject))
}

/// Operation name for a reference lookup
///
/// `(List, "comments", "postID")` -> `listCommentsByPostId`.
pub fn reference_query_name(action: Action, resource: &str, target: &str) -> String {
    let target = ["Id", "ID", "id", "_id"]
        .iter()
        .find_map(|suffix| target.strip_suffix(suffix).filter(|t| !t.is_empty()))
        .unwrap_or(target);
    format!(
        "{}By{}Id",
        query_name(action, resource),
        capitalize(target.trim_end_matches('_'))
    )
}
