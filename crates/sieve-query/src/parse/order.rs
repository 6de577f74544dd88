//! Order expression parsing.
//!
//! Accepted shapes, all preserving input order. Each list entry names
//! exactly one field:
//!
//! ```json
//! [{"age": "desc"}, {"name": {"direction": "asc", "nulls": "last"}}]
//! [{"age": "desc_nulls_last"}]
//! {"age": "desc", "name": "asc"}
//! ```

use serde_json::Value;

use crate::ast::{Direction, NullsPosition, OrderSpec};
use crate::error::ParseError;
use crate::parse::ParseContext;

/// Parse an order expression. `null` yields no clauses.
pub fn parse_order(raw: &Value, ctx: &ParseContext<'_>) -> Result<Vec<OrderSpec>, ParseError> {
    let entries: Vec<(String, &str, &Value)> = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => {
            let mut entries = Vec::new();
            for (i, item) in items.iter().enumerate() {
                let path = format!("$[{}]", i);
                let map = item.as_object().ok_or_else(|| ParseError::InvalidExpression {
                    path: path.clone(),
                    message: "expected an object".to_string(),
                })?;
                let mut fields = map.iter();
                let (Some((field, spec)), None) = (fields.next(), fields.next()) else {
                    return Err(ParseError::InvalidExpression {
                        path,
                        message: format!("expected exactly one field, found {}", map.len()),
                    });
                };
                entries.push((path, field.as_str(), spec));
            }
            entries
        }
        Value::Object(map) => map
            .iter()
            .map(|(field, spec)| ("$".to_string(), field.as_str(), spec))
            .collect(),
        _ => {
            return Err(ParseError::InvalidExpression {
                path: "$".to_string(),
                message: "expected a list of order clauses".to_string(),
            })
        }
    };

    let max = ctx.limits.max_order_clauses;
    if entries.len() > max {
        return Err(ParseError::TooManyOrderClauses {
            count: entries.len(),
            max,
        });
    }

    entries
        .into_iter()
        .map(|(path, field, spec)| {
            let Some(field_spec) = ctx.fields.lookup(ctx.entity, field) else {
                return Err(ParseError::UnknownField {
                    entity: ctx.entity.to_string(),
                    field: field.to_string(),
                });
            };
            if !field_spec.sortable {
                return Err(ParseError::FieldNotSortable {
                    entity: ctx.entity.to_string(),
                    field: field.to_string(),
                });
            }
            let (direction, nulls) = parse_direction(spec).map_err(|message| {
                ParseError::InvalidExpression {
                    path: format!("{}.{}", path, field),
                    message,
                }
            })?;
            Ok(OrderSpec {
                field: field.to_string(),
                direction,
                nulls,
            })
        })
        .collect()
}

fn parse_direction(spec: &Value) -> Result<(Direction, NullsPosition), String> {
    match spec {
        Value::String(s) => parse_shorthand(s),
        Value::Object(map) => {
            let direction = match map.get("direction") {
                None | Some(Value::Null) => Direction::Asc,
                Some(Value::String(s)) => match parse_shorthand(s)? {
                    (direction, NullsPosition::Default) => direction,
                    _ => return Err(format!("invalid direction '{}'", s)),
                },
                Some(_) => return Err("direction must be a string".to_string()),
            };
            let nulls = match map.get("nulls") {
                None | Some(Value::Null) => NullsPosition::Default,
                Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                    "first" => NullsPosition::First,
                    "last" => NullsPosition::Last,
                    "default" => NullsPosition::Default,
                    _ => return Err(format!("invalid nulls position '{}'", s)),
                },
                Some(_) => return Err("nulls must be a string".to_string()),
            };
            Ok((direction, nulls))
        }
        _ => Err("expected a direction string or object".to_string()),
    }
}

fn parse_shorthand(s: &str) -> Result<(Direction, NullsPosition), String> {
    match s.to_ascii_lowercase().as_str() {
        "asc" => Ok((Direction::Asc, NullsPosition::Default)),
        "desc" => Ok((Direction::Desc, NullsPosition::Default)),
        "asc_nulls_first" => Ok((Direction::Asc, NullsPosition::First)),
        "asc_nulls_last" => Ok((Direction::Asc, NullsPosition::Last)),
        "desc_nulls_first" => Ok((Direction::Desc, NullsPosition::First)),
        "desc_nulls_last" => Ok((Direction::Desc, NullsPosition::Last)),
        _ => Err(format!("invalid direction '{}'", s)),
    }
}
