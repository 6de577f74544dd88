use anyhow::Result;
use serde_json::Value;

use sieve_config::SieveConfig;
use sieve_query::FilterEngine;

use super::walk;

pub fn execute(config: SieveConfig, roots: Vec<String>) -> Result<()> {
    let output = render(&config, &roots)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Discovery followed by input generation for the discovered entities.
pub fn render(config: &SieveConfig, roots: &[String]) -> Result<Value> {
    let engine = FilterEngine::from_config(config)?;
    let (graph, discovery) = walk(config, roots)?;
    let inputs = engine.inputs_for(&discovery.entities(&graph));
    Ok(serde_json::to_value(inputs)?)
}
