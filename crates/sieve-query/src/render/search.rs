//! Search-index dialect renderer.
//!
//! Emits an Elasticsearch/OpenSearch style query document. Field paths come
//! from the schema and client values only ever appear in value positions,
//! so nothing the client sends can introduce a query key.

use serde_json::{json, Map, Value};

use crate::adapter::AdapterId;
use crate::ast::{Direction, NullsPosition};
use crate::error::CompileError;
use crate::kind::{Operator, ScalarKind};
use crate::render::sql::{expect_list, expect_range, expect_str, invalid};
use crate::render::{mismatch, Binder, Fragment, Placeholder, PredicateRenderer, SortClause};
use crate::schema::FieldSpec;

/// Single-key object with a dynamic key.
pub(crate) fn obj(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn geo_distance(path: &str, point: Value, distance: &str) -> Value {
    let mut body = Map::new();
    body.insert("distance".to_string(), Value::from(distance));
    body.insert(path.to_string(), point);
    obj("geo_distance", Value::Object(body))
}

fn must_not(query: Value) -> Value {
    json!({"bool": {"must_not": [query]}})
}

/// Escape wildcard metacharacters so the text matches literally.
fn escape_wildcard(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Translate a SQL LIKE pattern (`%`, `_`) to wildcard syntax (`*`, `?`).
fn like_to_wildcard(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '%' => out.push('*'),
            '_' => out.push('?'),
            '*' | '?' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Renderer for the search adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchRenderer;

impl SearchRenderer {
    fn wildcard(&self, path: &str, pattern: String, case_insensitive: bool) -> Value {
        obj(
            "wildcard",
            obj(
                path,
                json!({"value": pattern, "case_insensitive": case_insensitive}),
            ),
        )
    }

    fn point(&self, field: &FieldSpec, op: Operator, value: &Value) -> Result<Value, CompileError> {
        let lat = value.get("lat").and_then(Value::as_f64);
        let lon = value.get("lon").and_then(Value::as_f64);
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok(json!({"lat": lat, "lon": lon})),
            _ => Err(invalid(field, op, "expected an object with numeric lat and lon")),
        }
    }

    fn distance<'v>(
        &self,
        field: &FieldSpec,
        op: Operator,
        value: &'v Value,
        key: &str,
    ) -> Result<&'v str, CompileError> {
        value
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(field, op, &format!("expected a '{}' distance string", key)))
    }

    fn bool_query(&self, clause: &str, parts: Vec<Fragment>) -> Result<Value, CompileError> {
        let docs = parts
            .into_iter()
            .map(|p| match p {
                Fragment::Document(doc) => Ok(doc),
                other => Err(mismatch(self, &other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(obj("bool", obj(clause, Value::Array(docs))))
    }
}

impl PredicateRenderer for SearchRenderer {
    fn id(&self) -> AdapterId {
        AdapterId::Search
    }

    fn placeholder(&self) -> Placeholder {
        Placeholder::Inline
    }

    fn supports_null_ordering(&self) -> bool {
        true
    }

    fn quote_ident(&self, ident: &str) -> String {
        ident.to_string()
    }

    fn render_leaf(
        &self,
        field: &FieldSpec,
        op: Operator,
        value: &Value,
        _binder: &mut Binder,
    ) -> Result<Fragment, CompileError> {
        let path = field.native_ref.as_str();

        let doc = match op {
            Operator::Eq => obj("term", obj(path, value.clone())),
            Operator::Neq => must_not(obj("term", obj(path, value.clone()))),
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                let bound = &op.key()[1..];
                obj("range", obj(path, obj(bound, value.clone())))
            }
            Operator::Between => {
                let (low, high) = expect_range(field, op, value)?;
                obj("range", obj(path, json!({"gte": low, "lte": high})))
            }
            Operator::In | Operator::Overlaps => {
                let items = expect_list(field, op, value)?;
                if items.is_empty() {
                    return Ok(self.never());
                }
                obj("terms", obj(path, Value::Array(items.to_vec())))
            }
            Operator::NotIn => {
                let items = expect_list(field, op, value)?;
                if items.is_empty() {
                    return Ok(self.always());
                }
                must_not(obj("terms", obj(path, Value::Array(items.to_vec()))))
            }
            Operator::Like | Operator::Ilike => {
                let pattern = like_to_wildcard(expect_str(field, op, value)?);
                self.wildcard(path, pattern, op == Operator::Ilike)
            }
            Operator::Contains if field.kind == ScalarKind::Array => {
                let items = expect_list(field, op, value)?;
                if items.is_empty() {
                    return Ok(self.always());
                }
                let terms: Vec<Value> = items
                    .iter()
                    .map(|v| obj("term", obj(path, v.clone())))
                    .collect();
                json!({"bool": {"filter": terms}})
            }
            Operator::Contains => {
                let text = escape_wildcard(expect_str(field, op, value)?);
                self.wildcard(path, format!("*{}*", text), false)
            }
            Operator::EndsWith => {
                let text = escape_wildcard(expect_str(field, op, value)?);
                self.wildcard(path, format!("*{}", text), false)
            }
            Operator::StartsWith => {
                let text = expect_str(field, op, value)?;
                obj("prefix", obj(path, json!({"value": text})))
            }
            Operator::IsNull => {
                let exists = json!({"exists": {"field": path}});
                match value.as_bool() {
                    Some(true) => must_not(exists),
                    Some(false) => exists,
                    None => return Err(invalid(field, op, "expected a boolean")),
                }
            }
            Operator::Match => obj("match", obj(path, json!({"query": value}))),
            Operator::MatchPhrase => obj("match_phrase", obj(path, json!({"query": value}))),
            // Matches points within `pivot` of the origin; the distance
            // feature only ranks them and is inert in filter context.
            Operator::Near => {
                let origin = self.point(field, op, value)?;
                let pivot = self.distance(field, op, value, "pivot")?;
                json!({"bool": {
                    "filter": [geo_distance(path, origin.clone(), pivot)],
                    "should": [{"distance_feature": {"field": path, "origin": origin, "pivot": pivot}}]
                }})
            }
            Operator::WithinDistance => {
                let point = self.point(field, op, value)?;
                let distance = self.distance(field, op, value, "distance")?;
                geo_distance(path, point, distance)
            }
            Operator::WithinBounds => {
                let top_left = self.point(field, op, value.get("top_left").unwrap_or(&Value::Null))?;
                let bottom_right =
                    self.point(field, op, value.get("bottom_right").unwrap_or(&Value::Null))?;
                obj(
                    "geo_bounding_box",
                    obj(
                        path,
                        json!({"top_left": top_left, "bottom_right": bottom_right}),
                    ),
                )
            }
        };
        Ok(Fragment::Document(doc))
    }

    fn always(&self) -> Fragment {
        Fragment::Document(json!({"match_all": {}}))
    }

    fn never(&self) -> Fragment {
        Fragment::Document(json!({"match_none": {}}))
    }

    fn all(&self, mut parts: Vec<Fragment>) -> Result<Fragment, CompileError> {
        match parts.len() {
            0 => Ok(self.always()),
            1 => {
                let part = parts.remove(0);
                if self.accepts(&part) {
                    Ok(part)
                } else {
                    Err(mismatch(self, &part))
                }
            }
            _ => Ok(Fragment::Document(self.bool_query("filter", parts)?)),
        }
    }

    fn any(&self, mut parts: Vec<Fragment>) -> Result<Fragment, CompileError> {
        match parts.len() {
            0 => Ok(self.never()),
            1 => {
                let part = parts.remove(0);
                if self.accepts(&part) {
                    Ok(part)
                } else {
                    Err(mismatch(self, &part))
                }
            }
            _ => {
                let mut doc = self.bool_query("should", parts)?;
                if let Some(body) = doc.get_mut("bool").and_then(Value::as_object_mut) {
                    body.insert("minimum_should_match".to_string(), json!(1));
                }
                Ok(Fragment::Document(doc))
            }
        }
    }

    fn negate(&self, part: Fragment) -> Result<Fragment, CompileError> {
        Ok(Fragment::Document(self.bool_query("must_not", vec![part])?))
    }

    fn sort_clause(
        &self,
        field: &FieldSpec,
        direction: Direction,
        nulls: NullsPosition,
    ) -> SortClause {
        SortClause {
            column: field.native_ref.clone(),
            direction,
            nulls: match nulls {
                NullsPosition::Default => None,
                other => Some(other),
            },
        }
    }

    fn accepts(&self, fragment: &Fragment) -> bool {
        matches!(fragment, Fragment::Document(_))
    }
}
