//! Resource schema module
//!
//! Decides which record fields the backend owns, so they can be removed
//! before a record is sent back as an update input.
//!
//! # Features
//!
//! - **Server-managed fields**: timestamps, soft-delete markers and the type
//!   discriminator (`_deleted`, `_lastChangedAt`, `createdAt`, `updatedAt`,
//!   `__typename`) by default
//! - **Relations**: either declared per resource, or detected by the nested
//!   value carrying a `__typename`
//! - **Delete inputs**: `{id, _version}` for conflict-detected backends

mod input;
mod types;

pub use input::{delete_input, forward_version, previous_version, sanitize_update_input, update_input};
pub use types::{
    FieldPolicy, ResourceSchema, SchemaRegistry, DEFAULT_SERVER_MANAGED, TYPENAME_FIELD,
    VERSION_FIELD,
};
