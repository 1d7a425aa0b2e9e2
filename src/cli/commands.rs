//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Admin data provider over cursor-paginated GraphQL backends
#[derive(Parser, Debug)]
#[command(name = "graphql-admin-provider")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Provider configuration file (YAML)
    #[arg(short, long, global = true, default_value = "provider.yaml")]
    pub config: PathBuf,

    /// Template variable for the config, as KEY=VALUE (repeatable)
    #[arg(long = "var", global = true, value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Fetch one page of a resource
    List {
        /// Resource name (plural, e.g. "posts")
        resource: String,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Records per page
        #[arg(long, default_value = "10")]
        per_page: u32,

        /// Sort field
        #[arg(long)]
        sort: Option<String>,

        /// Sort order (ASC or DESC)
        #[arg(long, default_value = "ASC")]
        order: crate::types::SortOrder,

        /// Filter as a JSON object
        #[arg(long)]
        filter: Option<String>,
    },

    /// Fetch one record
    Get {
        /// Resource name (plural, e.g. "posts")
        resource: String,

        /// Record id
        id: String,
    },

    /// List the operations in the catalog
    Operations,

    /// Validate the configuration and catalog
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}

/// Parse a `KEY=VALUE` pair
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from([
            "graphql-admin-provider",
            "-c",
            "admin.yaml",
            "--var",
            "stage=dev",
            "list",
            "posts",
            "--page",
            "3",
            "--per-page",
            "25",
            "--order",
            "desc",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("admin.yaml"));
        assert_eq!(cli.vars, vec![("stage".to_string(), "dev".to_string())]);
        match cli.command {
            Commands::List {
                resource,
                page,
                per_page,
                order,
                sort,
                filter,
            } => {
                assert_eq!(resource, "posts");
                assert_eq!(page, 3);
                assert_eq!(per_page, 25);
                assert_eq!(order, crate::types::SortOrder::Desc);
                assert!(sort.is_none());
                assert!(filter.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["graphql-admin-provider", "serve"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("provider.yaml"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Serve { port: 8080 }));
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }
}
