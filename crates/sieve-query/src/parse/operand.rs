//! Operand validation per kind and operand shape.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::ParseError;
use crate::kind::{OperandShape, Operator, OperatorCategory, ScalarKind};
use crate::registry::OperatorRegistry;
use crate::schema::FieldSpec;
use crate::Limits;

/// Distance strings such as `10km`, `1.5mi`, `300m`.
static DISTANCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)?(mm|cm|m|km|in|ft|yd|mi|nmi|NM)?$")
        .expect("valid distance regex")
});

/// Check that `value` is a well-formed operand for `op` on `field`.
pub(crate) fn validate(
    field: &FieldSpec,
    op: Operator,
    value: &Value,
    registry: &OperatorRegistry,
    limits: &Limits,
) -> Result<(), ParseError> {
    let fail = |message: String| ParseError::InvalidOperand {
        field: field.name.clone(),
        operator: op.key().to_string(),
        message,
    };

    match op.shape(&field.kind) {
        OperandShape::Flag => match value {
            Value::Bool(_) => Ok(()),
            _ => Err(fail("expected true or false".to_string())),
        },
        OperandShape::Scalar => {
            if op.category() == OperatorCategory::Pattern
                || op.category() == OperatorCategory::FullText
            {
                return match value {
                    Value::String(_) => Ok(()),
                    _ => Err(fail("expected a string".to_string())),
                };
            }
            scalar(&field.kind, value, registry).map_err(fail)
        }
        OperandShape::List => {
            let items = value
                .as_array()
                .ok_or_else(|| fail("expected a list".to_string()))?;
            if items.len() > limits.max_list_len {
                return Err(fail(format!(
                    "list has {} elements (max {})",
                    items.len(),
                    limits.max_list_len
                )));
            }
            for (i, item) in items.iter().enumerate() {
                let element = if field.kind == ScalarKind::Array {
                    any_non_null(item)
                } else {
                    scalar(&field.kind, item, registry)
                };
                element.map_err(|m| fail(format!("element {}: {}", i, m)))?;
            }
            Ok(())
        }
        OperandShape::Range => match value.as_array().map(Vec::as_slice) {
            Some([low, high]) => {
                scalar(&field.kind, low, registry).map_err(|m| fail(format!("low: {}", m)))?;
                scalar(&field.kind, high, registry).map_err(|m| fail(format!("high: {}", m)))
            }
            _ => Err(fail("expected [low, high]".to_string())),
        },
        OperandShape::Structured => geo(op, value).map_err(fail),
    }
}

fn any_non_null(value: &Value) -> Result<(), String> {
    if value.is_null() {
        Err("null is only allowed with _is_null".to_string())
    } else {
        Ok(())
    }
}

fn scalar(kind: &ScalarKind, value: &Value, registry: &OperatorRegistry) -> Result<(), String> {
    any_non_null(value)?;

    let ok = match kind {
        ScalarKind::Id => value.is_string() || value.is_i64() || value.is_u64(),
        ScalarKind::String => value.is_string(),
        ScalarKind::Integer => value.is_i64() || value.is_u64(),
        ScalarKind::Float => value.is_number(),
        ScalarKind::Boolean => value.is_boolean(),
        ScalarKind::DateTime => value.as_str().is_some_and(is_datetime),
        ScalarKind::Date => value
            .as_str()
            .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
        ScalarKind::Time => value
            .as_str()
            .is_some_and(|s| NaiveTime::parse_from_str(s, "%H:%M:%S%.f").is_ok()),
        ScalarKind::Enum(name) => {
            let Some(s) = value.as_str() else {
                return Err(format!("expected a {} value", name));
            };
            if let Some(values) = registry.enum_values(name) {
                if !values.iter().any(|v| v == s) {
                    return Err(format!(
                        "'{}' is not a {} value (expected one of: {})",
                        s,
                        name,
                        values.join(", ")
                    ));
                }
            }
            true
        }
        ScalarKind::Array | ScalarKind::GeoPoint | ScalarKind::Generic => true,
    };

    if ok {
        Ok(())
    } else {
        Err(format!("expected {}", describe(kind)))
    }
}

fn is_datetime(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

fn describe(kind: &ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Id => "a string or integer id",
        ScalarKind::String => "a string",
        ScalarKind::Integer => "an integer",
        ScalarKind::Float => "a number",
        ScalarKind::Boolean => "a boolean",
        ScalarKind::DateTime => "an RFC 3339 datetime",
        ScalarKind::Date => "a YYYY-MM-DD date",
        ScalarKind::Time => "an HH:MM:SS time",
        ScalarKind::Enum(_) => "an enum value",
        ScalarKind::Array | ScalarKind::GeoPoint | ScalarKind::Generic => "a value",
    }
}

fn point(value: &Value, what: &str) -> Result<(), String> {
    let lat = value.get("lat").and_then(Value::as_f64);
    let lon = value.get("lon").and_then(Value::as_f64);
    match (lat, lon) {
        (Some(lat), Some(lon)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) => {
            Ok(())
        }
        (Some(_), Some(_)) => Err(format!("{} is out of range", what)),
        _ => Err(format!("{} must have numeric lat and lon", what)),
    }
}

fn distance(value: &Value, key: &str) -> Result<(), String> {
    match value.get(key).and_then(Value::as_str) {
        Some(d) if DISTANCE.is_match(d) => Ok(()),
        Some(d) => Err(format!("'{}' is not a distance", d)),
        None => Err(format!("expected a '{}' distance such as \"10km\"", key)),
    }
}

fn geo(op: Operator, value: &Value) -> Result<(), String> {
    if !value.is_object() {
        return Err("expected an object".to_string());
    }
    match op {
        Operator::Near => {
            point(value, "origin")?;
            distance(value, "pivot")
        }
        Operator::WithinDistance => {
            point(value, "center")?;
            distance(value, "distance")
        }
        Operator::WithinBounds => {
            point(value.get("top_left").unwrap_or(&Value::Null), "top_left")?;
            point(value.get("bottom_right").unwrap_or(&Value::Null), "bottom_right")
        }
        _ => Err("not a geo operator".to_string()),
    }
}
