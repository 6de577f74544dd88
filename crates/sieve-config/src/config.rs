//! Top-level configuration structures.

use serde::{Deserialize, Serialize};

use crate::schema::SchemaConfig;

/// Default recursion cap for nested filter expressions.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default maximum size of a raw filter document in bytes (64KB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024;

/// Default maximum number of leaf predicates in one expression.
pub const DEFAULT_MAX_PREDICATES: usize = 256;

/// Default maximum number of elements in a list operand.
pub const DEFAULT_MAX_LIST_LEN: usize = 1000;

/// Default maximum number of order clauses.
pub const DEFAULT_MAX_ORDER_CLAUSES: usize = 16;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SieveConfig {
    /// Adapter binding.
    #[serde(default)]
    pub adapter: AdapterConfig,

    /// Limits applied to client expressions.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging settings (consumed by the binary).
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Declared entities, fields and enums.
    #[serde(default)]
    pub schema: SchemaConfig,
}

impl SieveConfig {
    /// Create a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        self.limits.validate()?;
        self.schema.validate()?;
        Ok(())
    }
}

/// Adapter binding configuration.
///
/// `name` is an explicit override; when absent the adapter is inferred from
/// `backend`, and when both are absent the Postgres dialect is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Explicit adapter name (`postgres`, `mysql`, `sqlite`, `mssql`, `search`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Storage backend identifier the adapter is inferred from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

/// Limits applied while parsing client expressions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum nesting depth of combinators.
    pub max_depth: usize,
    /// Maximum raw input size in bytes.
    pub max_input_bytes: usize,
    /// Maximum number of leaf predicates.
    pub max_predicates: usize,
    /// Maximum number of elements in a list operand.
    pub max_list_len: usize,
    /// Maximum number of order clauses.
    pub max_order_clauses: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_predicates: DEFAULT_MAX_PREDICATES,
            max_list_len: DEFAULT_MAX_LIST_LEN,
            max_order_clauses: DEFAULT_MAX_ORDER_CLAUSES,
        }
    }
}

impl LimitsConfig {
    fn validate(&self) -> Result<(), crate::ConfigError> {
        let checks = [
            ("limits.max_depth", self.max_depth),
            ("limits.max_input_bytes", self.max_input_bytes),
            ("limits.max_predicates", self.max_predicates),
            ("limits.max_list_len", self.max_list_len),
            ("limits.max_order_clauses", self.max_order_clauses),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(crate::ConfigError::Invalid {
                    field: field.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (off, error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}
