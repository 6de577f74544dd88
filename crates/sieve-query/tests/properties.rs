//! Property-based tests for the filter compiler
//!
//! Tests invariants that must hold for any well-formed input: operator sets
//! stay inside the vocabulary, compilation is deterministic, values never
//! leak into SQL text, and order clauses keep their input order.

use proptest::prelude::*;
use serde_json::{json, Value};
use sieve_query::{
    AdapterId, EnumSpec, FilterEngine, Operator, OperatorRegistry, ScalarKind, Schema,
};

fn adapter_strategy() -> impl Strategy<Value = AdapterId> {
    prop::sample::select(AdapterId::ALL.to_vec())
}

fn sql_adapter_strategy() -> impl Strategy<Value = AdapterId> {
    prop::sample::select(vec![
        AdapterId::Postgres,
        AdapterId::MySql,
        AdapterId::Sqlite,
        AdapterId::MsSql,
    ])
}

fn kind_strategy() -> impl Strategy<Value = ScalarKind> {
    prop_oneof![
        Just(ScalarKind::Id),
        Just(ScalarKind::String),
        Just(ScalarKind::Integer),
        Just(ScalarKind::Float),
        Just(ScalarKind::Boolean),
        Just(ScalarKind::DateTime),
        Just(ScalarKind::Date),
        Just(ScalarKind::Time),
        Just(ScalarKind::Array),
        Just(ScalarKind::GeoPoint),
        Just(ScalarKind::Generic),
        Just(ScalarKind::Enum("Status".to_string())),
    ]
}

fn engine(adapter: AdapterId) -> FilterEngine {
    let schema = Schema::builder()
        .entity("User", |e| {
            e.field("name", ScalarKind::String)
                .field("age", ScalarKind::Integer)
                .field("score", ScalarKind::Float)
                .field("status", ScalarKind::Enum("Status".to_string()))
        })
        .build()
        .unwrap();
    let registry = OperatorRegistry::builder()
        .with_enum(EnumSpec::new("Status").values(["active", "inactive"]))
        .build()
        .unwrap();
    FilterEngine::builder()
        .schema(schema)
        .registry(registry)
        .adapter(adapter)
        .build()
}

/// Leaf predicates legal on every adapter.
fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z]{1,12}".prop_map(|s| json!({"name": {"_eq": s}})),
        "[a-z]{1,12}".prop_map(|s| json!({"name": {"_neq": s}})),
        (0i64..200).prop_map(|n| json!({"age": {"_gte": n}})),
        (0i64..200).prop_map(|n| json!({"age": {"_lt": n}})),
        (0i64..100, 100i64..200).prop_map(|(lo, hi)| json!({"age": {"_between": [lo, hi]}})),
        prop::collection::vec(0i64..50, 0..5).prop_map(|v| json!({"age": {"_in": v}})),
        any::<bool>().prop_map(|b| json!({"score": {"_is_null": b}})),
        prop::sample::select(vec!["active", "inactive"])
            .prop_map(|s| json!({"status": {"_eq": s}})),
    ]
}

/// Nested filter documents built from legal leaves.
fn filter_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy().prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(|v| json!({"_and": v})),
            prop::collection::vec(inner.clone(), 1..4).prop_map(|v| json!({"_or": v})),
            inner.prop_map(|v| json!({"_not": v})),
        ]
    })
}

proptest! {
    /// Property: every operator set is a canonical subset of the vocabulary
    #[test]
    fn operator_sets_within_vocabulary(kind in kind_strategy(), adapter in adapter_strategy()) {
        let registry = OperatorRegistry::builder()
            .with_enum(EnumSpec::new("Status").operators([Operator::Eq, Operator::In]))
            .build()
            .unwrap();

        let ops = registry.operators_for(&kind, adapter);
        for op in ops {
            prop_assert!(registry.vocabulary().contains(op));
            prop_assert!(registry.is_legal(&kind, adapter, *op));
        }
        prop_assert!(ops.windows(2).all(|w| w[0] < w[1]));
    }

    /// Property: lookups are deterministic across independently built registries
    #[test]
    fn operator_sets_deterministic(kind in kind_strategy(), adapter in adapter_strategy()) {
        let a = OperatorRegistry::new();
        let b = OperatorRegistry::new();
        prop_assert_eq!(a.operators_for(&kind, adapter), b.operators_for(&kind, adapter));
    }

    /// Property: kinds with no set fall back to a non-empty effective set
    #[test]
    fn effective_set_never_empty(kind in kind_strategy(), adapter in adapter_strategy()) {
        let registry = OperatorRegistry::new();
        let effective = registry.effective_kind(&kind, adapter);
        prop_assert!(!registry.operators_for(effective, adapter).is_empty());
    }

    /// Property: compiling the same document twice yields identical output
    #[test]
    fn compile_is_deterministic(doc in filter_strategy(), adapter in adapter_strategy()) {
        let engine = engine(adapter);
        let a = engine.filter("User", &doc).unwrap();
        let b = engine.filter("User", &doc).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Property: bound values appear only as parameters, never in SQL text
    #[test]
    fn values_never_inlined_in_sql(
        name in "zq[a-z]{6,10}",
        adapter in sql_adapter_strategy()
    ) {
        let engine = engine(adapter);
        let predicate = engine
            .filter("User", &json!({"_or": [{"name": {"_eq": &name}}, {"name": {"_like": &name}}]}))
            .unwrap();

        let sql = predicate.sql().unwrap();
        prop_assert!(!sql.contains(&name));
        prop_assert_eq!(predicate.params.len(), 2);
    }

    /// Property: double negation wraps the inner fragment and keeps its params
    #[test]
    fn double_negation_wraps_inner(doc in leaf_strategy(), adapter in sql_adapter_strategy()) {
        let engine = engine(adapter);
        let plain = engine.filter("User", &doc).unwrap();
        let double = engine
            .filter("User", &json!({"_not": {"_not": doc}}))
            .unwrap();

        prop_assert_eq!(
            double.sql().unwrap(),
            format!("NOT (NOT ({}))", plain.sql().unwrap())
        );
        prop_assert_eq!(double.params, plain.params);
    }

    /// Property: order clauses come out in input order
    #[test]
    fn order_preserved(
        fields in Just(vec!["name", "age", "score", "status"]).prop_shuffle(),
        descending in prop::collection::vec(any::<bool>(), 4),
        adapter in adapter_strategy()
    ) {
        let engine = engine(adapter);
        let clauses: Vec<Value> = fields
            .iter()
            .zip(&descending)
            .map(|(f, d)| {
                let direction = if *d { "desc" } else { "asc" };
                let mut clause = serde_json::Map::new();
                clause.insert(f.to_string(), Value::from(direction));
                Value::Object(clause)
            })
            .collect();

        let sort = engine.order("User", &Value::Array(clauses)).unwrap();
        let columns: Vec<_> = sort.clauses.iter().map(|c| c.column.clone()).collect();
        let expected: Vec<_> = fields
            .iter()
            .map(|f| engine.compile_context("User").renderer.quote_ident(f))
            .collect();
        prop_assert_eq!(columns, expected);
    }
}
