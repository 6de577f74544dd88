use anyhow::Result;

use sieve_config::SieveConfig;
use sieve_discovery::{Discovery, TypeGraph};

use super::walk;

pub fn execute(config: SieveConfig, roots: Vec<String>) -> Result<()> {
    let (graph, discovery) = walk(&config, &roots)?;
    print!("{}", render(&graph, &discovery));
    Ok(())
}

/// One line per discovered type in walk order; entities are starred.
pub fn render(graph: &TypeGraph, discovery: &Discovery) -> String {
    let mut out = String::new();
    for id in discovery.iter() {
        let kind = graph.kind(id);
        let marker = if kind.is_some_and(|k| k.is_entity()) { "*" } else { " " };
        let kind = kind
            .and_then(|k| serde_json::to_value(k).ok())
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        out.push_str(&format!("{} {} ({})\n", marker, id, kind));
    }
    out
}
