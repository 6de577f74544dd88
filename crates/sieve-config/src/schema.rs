//! Declarative schema configuration.
//!
//! Entities, their fields and the enums they use are declared as data and
//! read once at startup. `sieve-query` turns them into field metadata and
//! enum operator sets; `sieve-discovery` turns them into a type graph.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ConfigError;

/// Schema declaration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaConfig {
    /// Root types discovery starts from (e.g. `Query`, `Mutation`).
    #[serde(default)]
    pub roots: Vec<String>,

    /// Declared types.
    #[serde(default)]
    pub types: Vec<TypeConfig>,

    /// Declared enums with their legal values.
    #[serde(default)]
    pub enums: Vec<EnumConfig>,
}

impl SchemaConfig {
    /// Look up a declared type by name.
    pub fn type_config(&self, name: &str) -> Option<&TypeConfig> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Reject duplicate type, field and enum names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut type_names = HashSet::new();
        for ty in &self.types {
            if ty.name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "schema.types.name".to_string(),
                    message: "type name must not be empty".to_string(),
                });
            }
            if !type_names.insert(ty.name.as_str()) {
                return Err(ConfigError::Invalid {
                    field: format!("schema.types.{}", ty.name),
                    message: "duplicate type name".to_string(),
                });
            }

            let mut field_names = HashSet::new();
            for field in &ty.fields {
                if !field_names.insert(field.name.as_str()) {
                    return Err(ConfigError::Invalid {
                        field: format!("schema.types.{}.fields.{}", ty.name, field.name),
                        message: "duplicate field name".to_string(),
                    });
                }
            }
        }

        let mut enum_names = HashSet::new();
        for en in &self.enums {
            if !enum_names.insert(en.name.as_str()) {
                return Err(ConfigError::Invalid {
                    field: format!("schema.enums.{}", en.name),
                    message: "duplicate enum name".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TypeKindConfig {
    /// Entity type with fields.
    #[default]
    Object,
    /// Contract implemented by objects.
    Interface,
    /// Tagged union of concrete object types.
    Union,
    /// Input object (argument type).
    Input,
    /// Enum type.
    Enum,
    /// Custom scalar.
    Scalar,
}

/// A declared type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeConfig {
    /// Type identifier.
    pub name: String,

    /// Type kind.
    #[serde(default)]
    pub kind: TypeKindConfig,

    /// Implemented interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,

    /// Union members (only for `kind = "union"`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,

    /// Fields.
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// A declared field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldConfig {
    /// Field name as seen by clients.
    pub name: String,

    /// Return type identifier (edge for discovery).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<String>,

    /// Semantic scalar kind (`string`, `integer`, `enum:Status`, ...).
    /// Fields without a kind are not filterable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Native column reference; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Whether clients may filter on this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,

    /// Whether clients may order by this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,

    /// Field arguments (edges for discovery).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgConfig>,
}

impl FieldConfig {
    /// Native reference, falling back to the field name.
    pub fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

/// A field argument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArgConfig {
    /// Argument name.
    pub name: String,

    /// Argument input type identifier.
    #[serde(rename = "type")]
    pub type_ref: String,
}

/// A declared enum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnumConfig {
    /// Enum identifier.
    pub name: String,

    /// Legal values.
    #[serde(default)]
    pub values: Vec<String>,

    /// Optional restricted operator keys (e.g. `["_eq", "_in"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> FieldConfig {
        FieldConfig {
            name: name.to_string(),
            type_ref: None,
            kind: Some("string".to_string()),
            column: None,
            filterable: None,
            sortable: None,
            args: Vec::new(),
        }
    }

    #[test]
    fn test_column_defaults_to_name() {
        let mut f = field("name");
        assert_eq!(f.column(), "name");

        f.column = Some("full_name".to_string());
        assert_eq!(f.column(), "full_name");
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let schema = SchemaConfig {
            types: vec![TypeConfig {
                name: "User".to_string(),
                kind: TypeKindConfig::Object,
                interfaces: Vec::new(),
                members: Vec::new(),
                fields: vec![field("name"), field("name")],
            }],
            ..Default::default()
        };

        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate field name"));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let ty = TypeConfig {
            name: "User".to_string(),
            kind: TypeKindConfig::Object,
            interfaces: Vec::new(),
            members: Vec::new(),
            fields: Vec::new(),
        };
        let schema = SchemaConfig {
            types: vec![ty.clone(), ty],
            ..Default::default()
        };

        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_type_kind_deserializes_snake_case() {
        let ty: TypeConfig =
            serde_json::from_str(r#"{"name": "Entity", "kind": "union", "members": ["A", "B"]}"#)
                .unwrap();

        assert_eq!(ty.kind, TypeKindConfig::Union);
        assert_eq!(ty.members, vec!["A", "B"]);
        assert!(ty.fields.is_empty());
    }
}
