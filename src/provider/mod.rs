//! Data provider module
//!
//! The page-oriented CRUD contract an admin UI expects, implemented on top
//! of the operation catalog, the transport and the pagination layer.
//!
//! | Operation | Backend operation |
//! |---|---|
//! | `get_list` | `list<Resources>` or a query named by the filter |
//! | `get_one` | `get<Resource>` |
//! | `get_many` | `get<Resource>` per id |
//! | `get_many_reference` | `list<Resources>By<Target>Id` |
//! | `create` | `create<Resource>` |
//! | `update` / `update_many` | `update<Resource>` |
//! | `delete` / `delete_many` | `delete<Resource>` |
//!
//! Bulk operations run one id at a time and report per-id outcomes instead
//! of failing as a whole.

mod data_provider;
mod types;

pub use data_provider::{DataProvider, DataProviderBuilder};
pub use types::{
    BulkOutcome, BulkResult, DeleteParams, GetListParams, GetManyReferenceParams, Pagination,
    StorageObject, UpdateParams,
};
