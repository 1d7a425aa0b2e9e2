//! GraphQL transport
//!
//! The [`Transport`] trait is the only thing the pagination and provider
//! layers know about the backend: run one named operation with a set of
//! variables and hand back the response `data`.
//!
//! [`GraphQlTransport`] is the HTTP implementation, posting
//! `{query, variables, operationName}` to a single endpoint through the
//! retrying, rate-limited [`HttpClient`](crate::http::HttpClient).

mod transport;
mod types;

pub use transport::{GraphQlTransport, Transport};
pub use types::{GraphQlError, GraphQlRequest, GraphQlResponse};

#[cfg(test)]
pub(crate) mod mock;
