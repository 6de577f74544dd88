//! Discovery over configured schemas
//!
//! Builds type graphs from schema configuration and checks the reachable
//! set, laziness and error reporting.

use sieve_config::{scalar_field, FieldConfig, TestConfigBuilder, TypeConfig, TypeKindConfig};
use sieve_discovery::{discover, DiscoveryError, TypeGraph};
use test_case::test_case;

fn object(name: &str, fields: Vec<FieldConfig>) -> TypeConfig {
    TypeConfig {
        name: name.to_string(),
        kind: TypeKindConfig::Object,
        interfaces: Vec::new(),
        members: Vec::new(),
        fields,
    }
}

fn edge(name: &str, type_ref: &str) -> FieldConfig {
    FieldConfig {
        name: name.to_string(),
        type_ref: Some(type_ref.to_string()),
        kind: None,
        column: None,
        filterable: None,
        sortable: None,
        args: Vec::new(),
    }
}

#[test]
fn test_sample_schema_discovery() {
    let config = TestConfigBuilder::new().sample_schema().build();
    let graph = TypeGraph::from_config(&config.schema).unwrap();
    let found = discover(&config.schema.roots, &graph).unwrap();

    assert_eq!(
        found.types(),
        ["Query", "User", "UserFilter", "ID", "String", "Int", "Status", "Post"]
    );
    assert_eq!(found.entities(&graph), ["Query", "User", "Post"]);
}

#[test]
fn test_unreachable_type_gets_no_inputs() {
    let config = TestConfigBuilder::new()
        .sample_schema()
        .type_config(object("AuditLog", vec![scalar_field("id", "ID", "id")]))
        .build();
    let graph = TypeGraph::from_config(&config.schema).unwrap();
    let found = discover(&config.schema.roots, &graph).unwrap();

    assert!(graph.contains("AuditLog"));
    assert!(!found.contains("AuditLog"));
}

#[test]
fn test_interfaces_and_union_members_are_edges() {
    let config = TestConfigBuilder::new()
        .root("Query")
        .type_config(object("Query", vec![edge("search", "[SearchResult!]!")]))
        .type_config(TypeConfig {
            name: "SearchResult".to_string(),
            kind: TypeKindConfig::Union,
            interfaces: Vec::new(),
            members: vec!["Article".to_string()],
            fields: Vec::new(),
        })
        .type_config(TypeConfig {
            name: "Article".to_string(),
            kind: TypeKindConfig::Object,
            interfaces: vec!["Node".to_string()],
            members: Vec::new(),
            fields: vec![scalar_field("title", "String", "string")],
        })
        .type_config(TypeConfig {
            name: "Node".to_string(),
            kind: TypeKindConfig::Interface,
            interfaces: Vec::new(),
            members: Vec::new(),
            fields: vec![scalar_field("id", "ID", "id")],
        })
        .build();
    let graph = TypeGraph::from_config(&config.schema).unwrap();
    let found = discover(&config.schema.roots, &graph).unwrap();

    assert_eq!(found.entities(&graph), ["Query", "Article", "Node"]);
}

#[test]
fn test_mutual_references_terminate() {
    let config = TestConfigBuilder::new()
        .root("Query")
        .type_config(object("Query", vec![edge("a", "A")]))
        .type_config(object("A", vec![edge("b", "B")]))
        .type_config(object("B", vec![edge("a", "A")]))
        .build();
    let graph = TypeGraph::from_config(&config.schema).unwrap();

    let found = discover(&["Query"], &graph).unwrap();
    assert_eq!(found.types(), ["Query", "A", "B"]);
}

#[test]
fn test_dangling_reference_from_config() {
    let config = TestConfigBuilder::new()
        .root("Query")
        .type_config(object("Query", vec![edge("users", "User")]))
        .build();
    let graph = TypeGraph::from_config(&config.schema).unwrap();

    assert_eq!(
        discover(&["Query"], &graph).unwrap_err(),
        DiscoveryError::DanglingTypeReference {
            from: "Query".to_string(),
            to: "User".to_string(),
        }
    );
}

#[test_case("Mutation" ; "undeclared root")]
#[test_case("" ; "empty root")]
fn test_unknown_root(root: &str) {
    let config = TestConfigBuilder::new().sample_schema().build();
    let graph = TypeGraph::from_config(&config.schema).unwrap();

    assert_eq!(
        discover(&[root], &graph).unwrap_err(),
        DiscoveryError::UnknownRoot(root.to_string())
    );
}

#[test]
fn test_duplicate_declaration() {
    let config = TestConfigBuilder::new()
        .type_config(object("User", Vec::new()))
        .type_config(object("User", Vec::new()))
        .build();
    assert_eq!(
        TypeGraph::from_config(&config.schema).unwrap_err(),
        DiscoveryError::DuplicateType("User".to_string())
    );
}
