//! Minimal TOML/YAML loading tests
//!
//! Progressively tests config parsing from an empty document up to a full
//! schema declaration, reading real files from a temp directory.

use sieve_config::{ConfigError, ConfigFormat, ConfigLoader, SieveConfig, TypeKindConfig};
use std::io::Write;

const FULL_TOML: &str = r#"
[adapter]
name = "mysql"
backend = "ecto_mysql"

[limits]
max_depth = 16

[logging]
level = "debug"

[schema]
roots = ["Query"]

[[schema.enums]]
name = "Status"
values = ["active", "inactive"]
operators = ["_eq", "_in"]

[[schema.types]]
name = "Query"

[[schema.types.fields]]
name = "users"
type = "User"

[[schema.types.fields.args]]
name = "filter"
type = "UserFilter"

[[schema.types]]
name = "User"
interfaces = ["Node"]

[[schema.types.fields]]
name = "age"
type = "Int"
kind = "integer"
column = "age_years"

[[schema.types.fields]]
name = "status"
type = "Status"
kind = "enum:Status"
sortable = false
"#;

fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_empty_toml_is_default() {
    let config = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
    assert_eq!(config, SieveConfig::default());
}

#[test]
fn test_full_toml_from_str() {
    let config = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();

    assert_eq!(config.adapter.name.as_deref(), Some("mysql"));
    assert_eq!(config.limits.max_depth, 16);
    assert_eq!(config.limits.max_input_bytes, 64 * 1024);
    assert_eq!(config.schema.roots, vec!["Query"]);
    assert_eq!(config.schema.enums[0].operators, vec!["_eq", "_in"]);

    let user = config.schema.type_config("User").unwrap();
    assert_eq!(user.kind, TypeKindConfig::Object);
    assert_eq!(user.interfaces, vec!["Node"]);
    assert_eq!(user.fields[0].column(), "age_years");
    assert_eq!(user.fields[1].sortable, Some(false));

    let query = config.schema.type_config("Query").unwrap();
    assert_eq!(query.fields[0].args[0].type_ref, "UserFilter");
}

#[test]
fn test_load_toml_file() {
    let file = write_temp(FULL_TOML, ".toml");
    let config = ConfigLoader::load_from_file(file.path()).unwrap();

    assert_eq!(config.schema.types.len(), 2);
}

#[test]
fn test_load_yaml_file() {
    let yaml = r#"
adapter:
  backend: sqlite3
schema:
  roots: [Query]
  types:
    - name: Query
      fields:
        - name: posts
          type: Post
"#;
    let file = write_temp(yaml, ".yaml");
    let config = ConfigLoader::load_from_file(file.path()).unwrap();

    assert_eq!(config.adapter.backend.as_deref(), Some("sqlite3"));
    assert_eq!(
        config.schema.types[0].fields[0].type_ref.as_deref(),
        Some("Post")
    );
}

#[test]
fn test_toml_round_trip() {
    let config = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
    let serialized = toml::to_string_pretty(&config).expect("Failed to serialize SieveConfig");
    let reparsed = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();

    assert_eq!(config, reparsed);
}

#[test]
fn test_missing_file_reports_path() {
    let err = ConfigLoader::load_from_file("/definitely/not/here/sieve.toml").unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("sieve.toml"));
}

#[test]
fn test_malformed_toml() {
    let result = ConfigLoader::load_from_str("[limits\nmax_depth = ", ConfigFormat::Toml);
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}
