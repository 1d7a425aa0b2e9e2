//! Operation catalog module
//!
//! Named GraphQL query and mutation documents, and the convention that maps
//! an admin action on a resource to an operation name.
//!
//! # Naming
//!
//! Resource names are plural (`posts`). `list` uses the plural
//! (`listPosts`), the single-record actions use the singular (`getPost`,
//! `createPost`, `updatePost`, `deletePost`), and reference lookups append
//! `By<Target>Id` (`listCommentsByPostId`).

mod naming;
mod registry;
mod types;

pub use naming::{capitalize, query_name, reference_query_name, singularize, Action};
pub use registry::OperationCatalog;
pub use types::{OperationDocument, OperationKind};
