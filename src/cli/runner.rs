//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::provider::{DataProvider, GetListParams, Pagination};
use crate::template::TemplateContext;
use crate::types::{Identifier, JsonObject, JsonValue, Sort, SortOrder};
use serde_json::{json, Value};
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Serve { port } => {
                let provider = self.build_provider()?;
                crate::cli::serve(Arc::new(provider), *port).await
            }
            Commands::List {
                resource,
                page,
                per_page,
                sort,
                order,
                filter,
            } => {
                let params = list_params(*page, *per_page, sort.as_deref(), *order, filter.as_deref())?;
                self.list(resource, &params).await
            }
            Commands::Get { resource, id } => self.get(resource, &Identifier::parse(id)).await,
            Commands::Operations => self.operations(),
            Commands::Validate => self.validate(),
        }
    }

    /// Template context from the environment and `--var` flags
    fn template_context(&self) -> TemplateContext {
        let vars: JsonObject = self
            .cli
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        TemplateContext::from_env().with_vars(Value::Object(vars))
    }

    /// Load and validate the provider configuration
    fn load_config(&self) -> Result<ProviderConfig> {
        ProviderConfig::from_path(&self.cli.config, &self.template_context())
    }

    fn build_provider(&self) -> Result<DataProvider> {
        DataProvider::from_config(&self.load_config()?)
    }

    /// Fetch and print one page
    async fn list(&self, resource: &str, params: &GetListParams) -> Result<()> {
        let provider = self.build_provider()?;
        let result = provider.get_list(resource, params).await?;
        self.output_message(&serde_json::to_value(result)?);
        Ok(())
    }

    /// Fetch and print one record
    async fn get(&self, resource: &str, id: &Identifier) -> Result<()> {
        let provider = self.build_provider()?;
        let record = provider.get_one(resource, id).await?;
        self.output_message(&record);
        Ok(())
    }

    /// Print catalog operation names
    fn operations(&self) -> Result<()> {
        let catalog = self.load_config()?.load_catalog()?;
        self.output_message(&json!({
            "queries": catalog.query_names(),
            "mutations": catalog.mutation_names(),
        }));
        Ok(())
    }

    /// Validate the configuration and catalog
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        let catalog = config.load_catalog()?;

        self.output_message(&json!({
            "status": "OK",
            "endpoint": config.endpoint,
            "queries": catalog.query_names().len(),
            "mutations": catalog.mutation_names().len(),
        }));
        Ok(())
    }

    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Build list params from command-line style arguments
pub(crate) fn list_params(
    page: u32,
    per_page: u32,
    sort: Option<&str>,
    order: SortOrder,
    filter: Option<&str>,
) -> Result<GetListParams> {
    let filter = match filter {
        None => JsonObject::new(),
        Some(raw) => match serde_json::from_str::<JsonValue>(raw)? {
            JsonValue::Object(map) => map,
            other => {
                return Err(Error::invalid_request(format!(
                    "Filter must be a JSON object, got {other}"
                )))
            }
        },
    };

    Ok(GetListParams {
        pagination: Pagination { page, per_page },
        sort: sort.map(|field| Sort::new(field, order)),
        filter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_params() {
        let params = list_params(
            2,
            25,
            Some("listPostsByDate"),
            SortOrder::Desc,
            Some(r#"{"status": {"eq": "PUBLISHED"}}"#),
        )
        .unwrap();

        assert_eq!(params.pagination, Pagination { page: 2, per_page: 25 });
        assert_eq!(
            params.sort,
            Some(Sort::new("listPostsByDate", SortOrder::Desc))
        );
        assert_eq!(
            Value::Object(params.filter),
            json!({"status": {"eq": "PUBLISHED"}})
        );
    }

    #[test]
    fn test_list_params_rejects_non_object_filter() {
        let err = list_params(1, 10, None, SortOrder::Asc, Some("[1, 2]")).unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = list_params(1, 10, None, SortOrder::Asc, Some("{not json")).unwrap_err();
        assert!(matches!(err, Error::JsonParse(_)));
    }
}
