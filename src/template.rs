//! Placeholder rendering for provider configs
//!
//! String values in the YAML may contain `{{ env.NAME }}` (process
//! environment) or `{{ vars.a.b }}` (values passed with `--var`). The
//! parsed document is rendered once, before it is deserialized, and every
//! unresolved placeholder in the whole document is reported in one error.
//!
//! A string that consists of a single placeholder takes the referenced
//! value's JSON type, so `max_retries: "{{ vars.retries }}"` stays numeric.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(env|vars)\.([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}\}").unwrap()
});

/// Values placeholders resolve against
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// `env.*` lookups
    pub env: HashMap<String, String>,
    /// `vars.*` lookups, walked by dotted path
    pub vars: Value,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the process environment
    pub fn from_env() -> Self {
        Self {
            env: std::env::vars().collect(),
            vars: Value::Null,
        }
    }

    #[must_use]
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_vars(mut self, vars: Value) -> Self {
        self.vars = vars;
        self
    }

    /// Resolve `root.path`, where root is `env` or `vars`
    pub fn lookup(&self, root: &str, path: &str) -> Option<Value> {
        match root {
            "env" => self.env.get(path).cloned().map(Value::String),
            "vars" => path
                .split('.')
                .try_fold(&self.vars, |node, key| match node {
                    Value::Object(map) => map.get(key),
                    Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                    _ => None,
                })
                .cloned(),
            _ => None,
        }
    }
}

/// Render every string in `value`
pub fn render_value(value: &Value, ctx: &TemplateContext) -> Result<Value> {
    let mut missing = Vec::new();
    let rendered = Renderer {
        ctx,
        missing: &mut missing,
    }
    .value(value);

    if missing.is_empty() {
        Ok(rendered)
    } else {
        missing.sort();
        missing.dedup();
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Render one string, always producing a string
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    match render_value(&Value::String(template.to_string()), ctx)? {
        Value::String(s) => Ok(s),
        other => Ok(inline(&other)),
    }
}

/// Walks a document, recording unresolved placeholders
struct Renderer<'a> {
    ctx: &'a TemplateContext,
    missing: &'a mut Vec<String>,
}

impl Renderer<'_> {
    fn value(&mut self, value: &Value) -> Value {
        match value {
            Value::String(s) => self.string(s),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.value(v)).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, v)| (key.clone(), self.value(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn string(&mut self, s: &str) -> Value {
        if let Some(caps) = PLACEHOLDER.captures(s) {
            if caps[0].len() == s.len() {
                return self.resolve(&caps).unwrap_or(Value::Null);
            }
        } else {
            return Value::String(s.to_string());
        }

        let rendered = PLACEHOLDER.replace_all(s, |caps: &Captures<'_>| {
            self.resolve(caps).map(|v| inline(&v)).unwrap_or_default()
        });
        Value::String(rendered.into_owned())
    }

    fn resolve(&mut self, caps: &Captures<'_>) -> Option<Value> {
        let value = self.ctx.lookup(&caps[1], &caps[2]);
        if value.is_none() {
            self.missing.push(format!("{}.{}", &caps[1], &caps[2]));
        }
        value
    }
}

/// Text form of a value spliced into a longer string
fn inline(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ctx() -> TemplateContext {
        TemplateContext::new()
            .with_env("APPSYNC_API_KEY", "da2-123")
            .with_vars(json!({
                "api": {"id": "abc123", "regions": ["us-east-1", "eu-west-1"]},
                "retries": 2,
                "debug": true
            }))
    }

    #[test]
    fn test_env_and_nested_vars() {
        assert_eq!(render("{{ env.APPSYNC_API_KEY }}", &ctx()).unwrap(), "da2-123");
        assert_eq!(
            render(
                "https://{{ vars.api.id }}.appsync-api.{{vars.api.regions.1}}.amazonaws.com/graphql",
                &ctx()
            )
            .unwrap(),
            "https://abc123.appsync-api.eu-west-1.amazonaws.com/graphql"
        );
    }

    #[test]
    fn test_whole_placeholder_keeps_type() {
        let doc = json!({
            "http": {"max_retries": "{{ vars.retries }}", "label": "retries={{ vars.retries }}"},
            "verbose": "{{ vars.debug }}"
        });
        assert_eq!(
            render_value(&doc, &ctx()).unwrap(),
            json!({
                "http": {"max_retries": 2, "label": "retries=2"},
                "verbose": true
            })
        );
    }

    #[test]
    fn test_all_missing_reported_together() {
        let doc = json!({
            "endpoint": "{{ vars.endpoint }}",
            "auth": {"value": "{{ env.NOPE }}"},
            "again": "x {{ vars.endpoint }}"
        });
        let message = render_value(&doc, &ctx()).unwrap_err().to_string();
        assert!(message.contains("vars.endpoint"));
        assert!(message.contains("env.NOPE"));
    }

    #[test]
    fn test_unknown_root_left_alone() {
        let text = "{{ stage }} and {{ other.x }} and { braces }";
        assert_eq!(render(text, &ctx()).unwrap(), text);
    }

    #[test]
    fn test_non_strings_untouched() {
        let doc = json!({"limit": 10, "enabled": false, "tags": null});
        assert_eq!(render_value(&doc, &TemplateContext::new()).unwrap(), doc);
    }

    #[test]
    fn test_object_var_inlined_as_json() {
        let rendered = render("filter={{ vars.api }}", &ctx()).unwrap();
        assert!(rendered.starts_with("filter={"));
        assert!(rendered.contains("\"id\":\"abc123\""));
    }
}
