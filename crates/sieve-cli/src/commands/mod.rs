pub mod compile;
pub mod discover;
pub mod inputs;
pub mod operators;

use anyhow::{Context, Result};
use serde_json::Value;

use sieve_config::SieveConfig;
use sieve_discovery::{discover, Discovery, TypeGraph};

/// Read a JSON argument given inline or as `@path`.
pub fn read_json_arg(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON from {}", path)),
        None => Ok(arg.to_string()),
    }
}

/// Parse a JSON argument into a value (used for order expressions; filters
/// go through the size-checked string parser).
pub fn parse_json_arg(arg: &str) -> Result<Value> {
    let text = read_json_arg(arg)?;
    serde_json::from_str(&text).context("Invalid JSON argument")
}

/// Build the type graph and walk it from `roots`, or from the configured
/// roots when none are given.
pub fn walk(config: &SieveConfig, roots: &[String]) -> Result<(TypeGraph, Discovery)> {
    let roots = if roots.is_empty() {
        config.schema.roots.as_slice()
    } else {
        roots
    };
    if roots.is_empty() {
        anyhow::bail!("No root types given and schema.roots is empty");
    }

    let graph = TypeGraph::from_config(&config.schema)?;
    let discovery = discover(roots, &graph)?;
    Ok((graph, discovery))
}
