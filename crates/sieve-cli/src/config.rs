//! Configuration loading with CLI overrides.

use anyhow::{Context, Result};
use std::path::Path;

use sieve_config::{ConfigLoader, SieveConfig};

/// Load the config file if given, otherwise defaults plus environment
/// overrides. `--adapter` is applied last.
pub fn load(path: Option<&Path>, adapter: Option<String>) -> Result<SieveConfig> {
    let mut config = match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let mut config = SieveConfig::default();
            ConfigLoader::apply_overrides(&mut config, |key| std::env::var(key).ok());
            config
        }
    };

    if let Some(adapter) = adapter {
        config.adapter.name = Some(adapter);
    }
    Ok(config)
}
