//! Test utilities for configuration testing.

use crate::{
    ArgConfig, EnumConfig, FieldConfig, SieveConfig, TypeConfig, TypeKindConfig,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Test configuration builder for creating test configurations easily.
pub struct TestConfigBuilder {
    config: SieveConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    /// Create a new test configuration builder.
    pub fn new() -> Self {
        Self {
            config: SieveConfig::new(),
        }
    }

    /// Set the explicit adapter name.
    pub fn adapter<S: Into<String>>(mut self, name: S) -> Self {
        self.config.adapter.name = Some(name.into());
        self
    }

    /// Set the storage backend identifier.
    pub fn backend<S: Into<String>>(mut self, backend: S) -> Self {
        self.config.adapter.backend = Some(backend.into());
        self
    }

    /// Add a discovery root.
    pub fn root<S: Into<String>>(mut self, root: S) -> Self {
        self.config.schema.roots.push(root.into());
        self
    }

    /// Add a type declaration.
    pub fn type_config(mut self, ty: TypeConfig) -> Self {
        self.config.schema.types.push(ty);
        self
    }

    /// Add an enum declaration.
    pub fn enum_config<S: Into<String>>(mut self, name: S, values: &[&str]) -> Self {
        self.config.schema.enums.push(EnumConfig {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
            operators: Vec::new(),
        });
        self
    }

    /// Add a small `Query -> User -> Post` schema used across tests.
    pub fn sample_schema(self) -> Self {
        self.root("Query")
            .enum_config("Status", &["active", "inactive", "banned"])
            .type_config(TypeConfig {
                name: "Query".to_string(),
                kind: TypeKindConfig::Object,
                interfaces: Vec::new(),
                members: Vec::new(),
                fields: vec![FieldConfig {
                    name: "users".to_string(),
                    type_ref: Some("User".to_string()),
                    kind: None,
                    column: None,
                    filterable: None,
                    sortable: None,
                    args: vec![ArgConfig {
                        name: "filter".to_string(),
                        type_ref: "UserFilter".to_string(),
                    }],
                }],
            })
            .type_config(TypeConfig {
                name: "UserFilter".to_string(),
                kind: TypeKindConfig::Input,
                interfaces: Vec::new(),
                members: Vec::new(),
                fields: Vec::new(),
            })
            .type_config(TypeConfig {
                name: "User".to_string(),
                kind: TypeKindConfig::Object,
                interfaces: Vec::new(),
                members: Vec::new(),
                fields: vec![
                    scalar_field("id", "ID", "id"),
                    scalar_field("name", "String", "string"),
                    scalar_field("age", "Int", "integer"),
                    scalar_field("status", "Status", "enum:Status"),
                    FieldConfig {
                        name: "posts".to_string(),
                        type_ref: Some("Post".to_string()),
                        kind: None,
                        column: None,
                        filterable: None,
                        sortable: None,
                        args: Vec::new(),
                    },
                ],
            })
            .type_config(TypeConfig {
                name: "Post".to_string(),
                kind: TypeKindConfig::Object,
                interfaces: Vec::new(),
                members: Vec::new(),
                fields: vec![
                    scalar_field("id", "ID", "id"),
                    scalar_field("title", "String", "string"),
                ],
            })
            .type_config(TypeConfig {
                name: "Status".to_string(),
                kind: TypeKindConfig::Enum,
                interfaces: Vec::new(),
                members: Vec::new(),
                fields: Vec::new(),
            })
    }

    /// Build the configuration.
    pub fn build(self) -> SieveConfig {
        self.config
    }

    /// Serialize the configuration to a temporary TOML file.
    #[cfg(feature = "toml")]
    pub fn build_toml_file(self) -> std::io::Result<NamedTempFile> {
        let contents = toml::to_string_pretty(&self.config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        write_temp_config(&contents, "toml")
    }
}

/// A filterable scalar field declaration.
pub fn scalar_field(name: &str, type_ref: &str, kind: &str) -> FieldConfig {
    FieldConfig {
        name: name.to_string(),
        type_ref: Some(type_ref.to_string()),
        kind: Some(kind.to_string()),
        column: None,
        filterable: None,
        sortable: None,
        args: Vec::new(),
    }
}

/// Write `contents` to a temporary file with the given extension.
pub fn write_temp_config(contents: &str, extension: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}
