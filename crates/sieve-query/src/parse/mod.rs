//! Filter and order parsing.
//!
//! Validates a raw client document against the schema and the operator set
//! of the bound adapter and produces a [`FilterNode`] tree. Keys are handled
//! in input order, so the tree (and everything compiled from it) follows the
//! order the client wrote.
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "_or": [{"status": {"_eq": "active"}}, {"age": {"_gte": 18}}],
//!   "name": {"_starts_with": "A", "_neq": "Alice"}
//! }
//! ```

mod operand;
mod order;

pub use order::parse_order;

use serde_json::{Map, Value};
use tracing::trace;

use crate::adapter::AdapterId;
use crate::ast::FilterNode;
use crate::custom::{normalize_operator, CustomFilters};
use crate::error::ParseError;
use crate::kind::Operator;
use crate::registry::OperatorRegistry;
use crate::schema::FieldMetadata;
use crate::Limits;

/// Everything the parser validates against.
#[derive(Clone, Copy)]
pub struct ParseContext<'a> {
    pub entity: &'a str,
    pub fields: &'a dyn FieldMetadata,
    pub registry: &'a OperatorRegistry,
    pub adapter: AdapterId,
    pub custom: Option<&'a CustomFilters>,
    pub limits: Limits,
}

impl<'a> ParseContext<'a> {
    pub fn new(
        entity: &'a str,
        fields: &'a dyn FieldMetadata,
        registry: &'a OperatorRegistry,
        adapter: AdapterId,
    ) -> Self {
        Self {
            entity,
            fields,
            registry,
            adapter,
            custom: None,
            limits: Limits::default(),
        }
    }

    pub fn with_custom(mut self, custom: &'a CustomFilters) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    fn custom_has(&self, field: &str, operator: &str) -> bool {
        self.custom
            .is_some_and(|c| c.contains(self.entity, field, operator))
    }

    fn custom_has_field(&self, field: &str) -> bool {
        self.custom.is_some_and(|c| c.has_field(self.entity, field))
    }
}

/// Parse a filter document. `null` is the same as `{}`: no constraint.
pub fn parse_filter(raw: &Value, ctx: &ParseContext<'_>) -> Result<FilterNode, ParseError> {
    if raw.is_null() {
        return Ok(FilterNode::identity());
    }
    let mut parser = Parser {
        ctx,
        predicates: 0,
    };
    parser.parse_object(raw, 0, "$")
}

/// Parse a filter from JSON text, rejecting oversized input before
/// deserializing it.
pub fn parse_filter_str(json: &str, ctx: &ParseContext<'_>) -> Result<FilterNode, ParseError> {
    if json.len() > ctx.limits.max_input_bytes {
        return Err(ParseError::InputTooLarge {
            size: json.len(),
            max: ctx.limits.max_input_bytes,
        });
    }
    let raw: Value = serde_json::from_str(json).map_err(|e| ParseError::Json(e.to_string()))?;
    parse_filter(&raw, ctx)
}

struct Parser<'c, 'a> {
    ctx: &'c ParseContext<'a>,
    predicates: usize,
}

impl Parser<'_, '_> {
    fn parse_object(
        &mut self,
        value: &Value,
        depth: usize,
        path: &str,
    ) -> Result<FilterNode, ParseError> {
        if depth > self.ctx.limits.max_depth {
            return Err(ParseError::ExpressionTooDeep {
                max: self.ctx.limits.max_depth,
            });
        }
        let map = value.as_object().ok_or_else(|| ParseError::InvalidExpression {
            path: path.to_string(),
            message: "expected an object".to_string(),
        })?;

        let mut nodes = Vec::with_capacity(map.len());
        for (key, val) in map {
            let key_path = format!("{}.{}", path, key);
            match key.as_str() {
                "_and" => {
                    let children = self.parse_list(val, depth, &key_path)?;
                    let children: Vec<_> =
                        children.into_iter().filter(|c| !c.is_identity()).collect();
                    push_collapsed(&mut nodes, children, FilterNode::And);
                }
                "_or" => {
                    let children = self.parse_list(val, depth, &key_path)?;
                    // One unconstrained branch makes the whole disjunction
                    // unconstrained.
                    if children.iter().any(FilterNode::is_identity) {
                        continue;
                    }
                    push_collapsed(&mut nodes, children, FilterNode::Or);
                }
                "_not" => {
                    let child = self.parse_object(val, depth + 1, &key_path)?;
                    nodes.push(FilterNode::negate(child));
                }
                field => self.parse_field(field, val, &key_path, &mut nodes)?,
            }
        }

        Ok(match nodes.len() {
            0 => FilterNode::identity(),
            1 => nodes.remove(0),
            _ => FilterNode::And(nodes),
        })
    }

    fn parse_list(
        &mut self,
        value: &Value,
        depth: usize,
        path: &str,
    ) -> Result<Vec<FilterNode>, ParseError> {
        let items = value.as_array().ok_or_else(|| ParseError::InvalidExpression {
            path: path.to_string(),
            message: "expected a list of objects".to_string(),
        })?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.parse_object(item, depth + 1, &format!("{}[{}]", path, i)))
            .collect()
    }

    fn parse_field(
        &mut self,
        field: &str,
        value: &Value,
        path: &str,
        out: &mut Vec<FilterNode>,
    ) -> Result<(), ParseError> {
        let ctx = self.ctx;
        let spec = ctx.fields.lookup(ctx.entity, field);
        if spec.is_none() && !ctx.custom_has_field(field) {
            return Err(ParseError::UnknownField {
                entity: ctx.entity.to_string(),
                field: field.to_string(),
            });
        }

        let ops: &Map<String, Value> =
            value.as_object().ok_or_else(|| ParseError::InvalidExpression {
                path: path.to_string(),
                message: "expected an object of operators".to_string(),
            })?;
        if ops.is_empty() {
            return Err(ParseError::InvalidOperand {
                field: field.to_string(),
                operator: String::new(),
                message: "expected at least one operator".to_string(),
            });
        }

        for (key, operand) in ops {
            self.count_predicate()?;

            if ctx.custom_has(field, key) {
                trace!(field, operator = %key, "Custom predicate");
                out.push(FilterNode::Custom {
                    field: field.to_string(),
                    operator: normalize_operator(key),
                    value: operand.clone(),
                });
                continue;
            }

            let spec = match spec {
                Some(spec) => spec,
                // Computed field without this operator.
                None => {
                    return Err(ParseError::UnsupportedOperator {
                        field: field.to_string(),
                        operator: key.clone(),
                        kind: "computed".to_string(),
                        adapter: ctx.adapter,
                    })
                }
            };
            if !spec.filterable {
                return Err(ParseError::FieldNotFilterable {
                    entity: ctx.entity.to_string(),
                    field: field.to_string(),
                });
            }

            let unsupported = || ParseError::UnsupportedOperator {
                field: field.to_string(),
                operator: key.clone(),
                kind: spec.kind.to_string(),
                adapter: ctx.adapter,
            };
            let op = Operator::from_key(key).ok_or_else(unsupported)?;
            if !ctx.registry.is_legal(&spec.kind, ctx.adapter, op) {
                return Err(unsupported());
            }

            operand::validate(spec, op, operand, ctx.registry, &ctx.limits)?;
            trace!(field, operator = %op, "Field predicate");
            out.push(FilterNode::field(field, op, operand.clone()));
        }
        Ok(())
    }

    fn count_predicate(&mut self) -> Result<(), ParseError> {
        self.predicates += 1;
        if self.predicates > self.ctx.limits.max_predicates {
            return Err(ParseError::TooManyPredicates {
                max: self.ctx.limits.max_predicates,
            });
        }
        Ok(())
    }
}

/// Drop empty combinators and unwrap single-child ones.
fn push_collapsed(
    nodes: &mut Vec<FilterNode>,
    mut children: Vec<FilterNode>,
    wrap: fn(Vec<FilterNode>) -> FilterNode,
) {
    match children.len() {
        0 => {}
        1 => nodes.push(children.remove(0)),
        _ => nodes.push(wrap(children)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::CustomFilters;
    use crate::error::ParseError;
    use crate::kind::ScalarKind;
    use crate::registry::EnumSpec;
    use crate::render::Fragment;
    use crate::schema::{FieldSpec, Schema};
    use serde_json::json;
    use test_case::test_case;

    struct Fixture {
        schema: Schema,
        registry: OperatorRegistry,
        custom: CustomFilters,
    }

    impl Fixture {
        fn new() -> Self {
            let schema = Schema::builder()
                .entity("User", |e| {
                    e.field("id", ScalarKind::Id)
                        .field("name", ScalarKind::String)
                        .column("age", "age_years", ScalarKind::Integer)
                        .field("status", ScalarKind::Enum("Status".to_string()))
                        .field("tags", ScalarKind::Array)
                        .spec(FieldSpec::new("password", ScalarKind::String).filterable(false))
                })
                .build()
                .unwrap();
            let registry = OperatorRegistry::builder()
                .with_enum(EnumSpec::new("Status").values(["active", "inactive"]))
                .build()
                .unwrap();
            let mut custom = CustomFilters::new();
            custom.register("User", "full_text", "_search", |_, _, _| {
                Ok(Fragment::Sql("1=1".to_string()))
            });
            Self {
                schema,
                registry,
                custom,
            }
        }

        fn ctx(&self, adapter: AdapterId) -> ParseContext<'_> {
            ParseContext::new("User", &self.schema, &self.registry, adapter)
                .with_custom(&self.custom)
        }

        fn parse(&self, raw: Value) -> Result<FilterNode, ParseError> {
            parse_filter(&raw, &self.ctx(AdapterId::Postgres))
        }
    }

    // ===== structure =====

    #[test]
    fn test_empty_and_null_are_identity() {
        let fx = Fixture::new();
        assert!(fx.parse(json!({})).unwrap().is_identity());
        assert!(fx.parse(Value::Null).unwrap().is_identity());
        assert!(fx.parse(json!({"_and": []})).unwrap().is_identity());
        assert!(fx.parse(json!({"_or": []})).unwrap().is_identity());
    }

    #[test]
    fn test_single_predicate_is_unwrapped() {
        let fx = Fixture::new();
        assert_eq!(
            fx.parse(json!({"age": {"_gte": 18}})).unwrap(),
            FilterNode::field("age", Operator::Gte, json!(18))
        );
    }

    #[test]
    fn test_keys_keep_input_order() {
        let fx = Fixture::new();
        let node = fx
            .parse(json!({"name": {"_eq": "a", "_neq": "b"}, "age": {"_lt": 3}}))
            .unwrap();

        assert_eq!(
            node,
            FilterNode::And(vec![
                FilterNode::field("name", Operator::Eq, json!("a")),
                FilterNode::field("name", Operator::Neq, json!("b")),
                FilterNode::field("age", Operator::Lt, json!(3)),
            ])
        );
    }

    #[test]
    fn test_or_and_not() {
        let fx = Fixture::new();
        let node = fx
            .parse(json!({
                "_or": [{"status": {"_eq": "active"}}, {"age": {"_gte": 18}}],
                "_not": {"name": {"_is_null": true}}
            }))
            .unwrap();

        assert_eq!(
            node,
            FilterNode::And(vec![
                FilterNode::Or(vec![
                    FilterNode::field("status", Operator::Eq, json!("active")),
                    FilterNode::field("age", Operator::Gte, json!(18)),
                ]),
                FilterNode::negate(FilterNode::field("name", Operator::IsNull, json!(true))),
            ])
        );
    }

    #[test]
    fn test_identity_children_collapse() {
        let fx = Fixture::new();
        let and = fx
            .parse(json!({"_and": [{}, {"age": {"_eq": 1}}, {"_and": []}]}))
            .unwrap();
        assert_eq!(and, FilterNode::field("age", Operator::Eq, json!(1)));

        let or = fx.parse(json!({"_or": [{}, {"age": {"_eq": 1}}]})).unwrap();
        assert!(or.is_identity());
    }

    #[test]
    fn test_custom_operator() {
        let fx = Fixture::new();
        let node = fx.parse(json!({"full_text": {"search": "rust"}})).unwrap();
        assert_eq!(
            node,
            FilterNode::Custom {
                field: "full_text".to_string(),
                operator: "_search".to_string(),
                value: json!("rust"),
            }
        );

        let err = fx.parse(json!({"full_text": {"_eq": "rust"}})).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedOperator { .. }));
    }

    // ===== errors =====

    #[test]
    fn test_unknown_and_unfilterable_fields() {
        let fx = Fixture::new();
        assert_eq!(
            fx.parse(json!({"email": {"_eq": "x"}})).unwrap_err(),
            ParseError::UnknownField {
                entity: "User".to_string(),
                field: "email".to_string(),
            }
        );
        assert_eq!(
            fx.parse(json!({"password": {"_eq": "x"}})).unwrap_err(),
            ParseError::FieldNotFilterable {
                entity: "User".to_string(),
                field: "password".to_string(),
            }
        );
    }

    #[test_case(AdapterId::Postgres, true)]
    #[test_case(AdapterId::MySql, false)]
    #[test_case(AdapterId::Sqlite, false)]
    #[test_case(AdapterId::MsSql, false)]
    #[test_case(AdapterId::Search, true)]
    fn test_ilike_depends_on_adapter(adapter: AdapterId, ok: bool) {
        let fx = Fixture::new();
        let result = parse_filter(&json!({"name": {"_ilike": "x"}}), &fx.ctx(adapter));
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(
                err,
                ParseError::UnsupportedOperator {
                    field: "name".to_string(),
                    operator: "_ilike".to_string(),
                    kind: "string".to_string(),
                    adapter,
                }
            );
        }
    }

    #[test]
    fn test_unknown_operator_key() {
        let fx = Fixture::new();
        let err = fx.parse(json!({"age": {"_regex": ".*"}})).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedOperator { operator, .. } if operator == "_regex"));
    }

    #[test_case(json!([]) ; "top level list")]
    #[test_case(json!({"_and": {"age": {"_eq": 1}}}) ; "and not a list")]
    #[test_case(json!({"_and": [1]}) ; "and element not an object")]
    #[test_case(json!({"_not": []}) ; "not not an object")]
    #[test_case(json!({"age": 5}) ; "field not an object")]
    fn test_invalid_expression(raw: Value) {
        let fx = Fixture::new();
        assert!(matches!(
            fx.parse(raw),
            Err(ParseError::InvalidExpression { .. })
        ));
    }

    #[test]
    fn test_invalid_expression_reports_path() {
        let fx = Fixture::new();
        let err = fx
            .parse(json!({"_or": [{"age": {"_eq": 1}}, "oops"]}))
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidExpression {
                path: "$._or[1]".to_string(),
                message: "expected an object".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_operator_object() {
        let fx = Fixture::new();
        assert!(matches!(
            fx.parse(json!({"age": {}})),
            Err(ParseError::InvalidOperand { .. })
        ));
    }

    // ===== limits =====

    fn nested_not(depth: usize) -> Value {
        let mut value = json!({"age": {"_eq": 1}});
        for _ in 0..depth {
            value = json!({"_not": value});
        }
        value
    }

    #[test]
    fn test_depth_limit() {
        let fx = Fixture::new();
        let limits = Limits {
            max_depth: 4,
            ..Limits::default()
        };
        let ctx = fx.ctx(AdapterId::Postgres).with_limits(limits);

        assert!(parse_filter(&nested_not(4), &ctx).is_ok());
        assert_eq!(
            parse_filter(&nested_not(5), &ctx).unwrap_err(),
            ParseError::ExpressionTooDeep { max: 4 }
        );
    }

    #[test]
    fn test_predicate_limit() {
        let fx = Fixture::new();
        let limits = Limits {
            max_predicates: 2,
            ..Limits::default()
        };
        let ctx = fx.ctx(AdapterId::Postgres).with_limits(limits);
        let raw = json!({"age": {"_gt": 1, "_lt": 9}, "name": {"_eq": "x"}});

        assert_eq!(
            parse_filter(&raw, &ctx).unwrap_err(),
            ParseError::TooManyPredicates { max: 2 }
        );
    }

    #[test]
    fn test_parse_filter_str_limits_and_json_errors() {
        let fx = Fixture::new();
        let limits = Limits {
            max_input_bytes: 16,
            ..Limits::default()
        };
        let ctx = fx.ctx(AdapterId::Postgres).with_limits(limits);

        assert!(matches!(
            parse_filter_str(r#"{"name": {"_eq": "a long name"}}"#, &ctx),
            Err(ParseError::InputTooLarge { max: 16, .. })
        ));
        assert!(matches!(
            parse_filter_str("{nope", &ctx),
            Err(ParseError::Json(_))
        ));
        assert!(parse_filter_str("{}", &ctx).unwrap().is_identity());
    }
}
