use crate::Cli;
use anyhow::{Context, bail};
use clo_provider::{Attributes, CloProvider, ProviderConfig, Schema};
use colored::Colorize;
use serde_json::Value;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Build the provider from flags and environment
pub fn provider(cli: &Cli, cancel: CancellationToken) -> anyhow::Result<CloProvider> {
    let config = ProviderConfig::new(
        cli.auth_url.clone().unwrap_or_default(),
        cli.token.clone().unwrap_or_default(),
    )
    .with_env_tuning()?;
    let provider = CloProvider::configure(config)?.with_cancel(cancel);
    Ok(provider)
}

/// Load a JSON object from a file
pub fn read_attributes(path: &Path) -> anyhow::Result<Attributes> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!(
            "{} must contain a JSON object, found {}",
            path.display(),
            type_name(&other)
        ),
    }
}

/// Data source arguments from an optional file plus `--set` overrides
pub fn read_arguments(file: Option<&Path>, set: &[String]) -> anyhow::Result<Attributes> {
    let mut args = match file {
        Some(path) => read_attributes(path)?,
        None => Attributes::new(),
    };
    for pair in set {
        let (key, value) = parse_set(pair)?;
        args.insert(key, value);
    }
    Ok(args)
}

/// Parse `key=value`; the value is JSON when it parses, else a string
pub fn parse_set(pair: &str) -> anyhow::Result<(String, Value)> {
    let Some((key, raw)) = pair.split_once('=') else {
        bail!("expected KEY=VALUE, got '{}'", pair);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{}'", pair);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Print attributes as pretty JSON, masking sensitive ones unless asked not to
pub fn print_attributes(schema: &Schema, attributes: &Attributes, show_sensitive: bool) {
    let shown = if show_sensitive {
        attributes.clone()
    } else {
        schema.redact(attributes)
    };
    match serde_json::to_string_pretty(&Value::Object(shown)) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("{} {}", "⚠".yellow(), e),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
