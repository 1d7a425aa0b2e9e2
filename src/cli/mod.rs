//! CLI module
//!
//! Command-line interface for the provider.
//!
//! # Commands
//!
//! - `serve` - Start HTTP server mode
//! - `list` - Fetch one page of a resource
//! - `get` - Fetch one record
//! - `operations` - List catalog operations
//! - `validate` - Validate the configuration and catalog

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve};
