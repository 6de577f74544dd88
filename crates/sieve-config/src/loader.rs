//! Configuration loading.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::SieveConfig;

/// Environment variable overriding `adapter.name`.
pub const ENV_ADAPTER: &str = "SIEVE_ADAPTER";

/// Environment variable overriding `adapter.backend`.
pub const ENV_BACKEND: &str = "SIEVE_BACKEND";

/// Environment variable overriding `logging.level`.
pub const ENV_LOG_LEVEL: &str = "SIEVE_LOG_LEVEL";

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// TOML syntax or shape error.
    #[error("TOML parse error: {0}")]
    Toml(String),

    /// YAML syntax or shape error.
    #[error("YAML parse error: {0}")]
    Yaml(String),

    /// JSON syntax or shape error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension not recognised or format feature disabled.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A value failed validation.
    #[error("Invalid configuration value for {field}: {message}")]
    Invalid {
        /// Dotted path of the offending field
        field: String,
        /// What is wrong with it
        message: String,
    },
}

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML document
    Toml,
    /// YAML document
    Yaml,
    /// JSON document
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Loads [`SieveConfig`] from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, apply environment overrides and validate.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<SieveConfig, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), ?format, "loading configuration");

        let mut config = Self::parse(&contents, format)?;
        Self::apply_overrides(&mut config, |key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a document without consulting the environment.
    pub fn load_from_str(contents: &str, format: ConfigFormat) -> Result<SieveConfig, ConfigError> {
        let config = Self::parse(contents, format)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides using an arbitrary variable lookup.
    ///
    /// `load_from_file` passes the process environment; tests pass a map.
    pub fn apply_overrides<F>(config: &mut SieveConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(adapter) = lookup(ENV_ADAPTER).filter(|v| !v.is_empty()) {
            debug!(%adapter, "adapter overridden from environment");
            config.adapter.name = Some(adapter);
        }
        if let Some(backend) = lookup(ENV_BACKEND).filter(|v| !v.is_empty()) {
            config.adapter.backend = Some(backend);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            config.logging.level = level;
        }
    }

    fn parse(contents: &str, format: ConfigFormat) -> Result<SieveConfig, ConfigError> {
        match format {
            #[cfg(feature = "toml")]
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Toml(e.to_string())),
            #[cfg(not(feature = "toml"))]
            ConfigFormat::Toml => Err(ConfigError::UnsupportedFormat("toml".to_string())),

            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => {
                serde_yaml::from_str(contents).map_err(|e| ConfigError::Yaml(e.to_string()))
            }
            #[cfg(not(feature = "yaml"))]
            ConfigFormat::Yaml => Err(ConfigError::UnsupportedFormat("yaml".to_string())),

            ConfigFormat::Json => Ok(serde_json::from_str(contents)?),
        }
    }
}
