//! Semantic scalar kinds and the operator vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// Semantic kind of a filterable field.
///
/// Decides which operators are legal and how operands are validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Id,
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Date,
    Time,
    /// Enum keyed by its identifier; legal values live in the registry.
    Enum(String),
    Array,
    GeoPoint,
    Generic,
}

/// Operator input names taken by the built-in kinds.
const BUILTIN_INPUT_NAMES: [&str; 11] = [
    "ID", "String", "Int", "Float", "Boolean", "DateTime", "Date", "Time", "Array", "GeoPoint",
    "Generic",
];

impl ScalarKind {
    /// Whether an enum called `name` would share its operator input with a
    /// built-in kind.
    pub fn is_reserved_enum_name(name: &str) -> bool {
        BUILTIN_INPUT_NAMES.contains(&name)
    }

    /// Name used for generated operator inputs (`StringOperators`,
    /// `StatusOperators`, ...).
    pub fn input_name(&self) -> &str {
        match self {
            ScalarKind::Id => "ID",
            ScalarKind::String => "String",
            ScalarKind::Integer => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::DateTime => "DateTime",
            ScalarKind::Date => "Date",
            ScalarKind::Time => "Time",
            ScalarKind::Enum(name) => name,
            ScalarKind::Array => "Array",
            ScalarKind::GeoPoint => "GeoPoint",
            ScalarKind::Generic => "Generic",
        }
    }

    /// Whether fields of this kind are sortable unless declared otherwise.
    pub fn sortable_by_default(&self) -> bool {
        !matches!(
            self,
            ScalarKind::Array | ScalarKind::GeoPoint | ScalarKind::Generic
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Id => f.write_str("id"),
            ScalarKind::String => f.write_str("string"),
            ScalarKind::Integer => f.write_str("integer"),
            ScalarKind::Float => f.write_str("float"),
            ScalarKind::Boolean => f.write_str("boolean"),
            ScalarKind::DateTime => f.write_str("datetime"),
            ScalarKind::Date => f.write_str("date"),
            ScalarKind::Time => f.write_str("time"),
            ScalarKind::Enum(name) => write!(f, "enum:{}", name),
            ScalarKind::Array => f.write_str("array"),
            ScalarKind::GeoPoint => f.write_str("geo_point"),
            ScalarKind::Generic => f.write_str("generic"),
        }
    }
}

impl FromStr for ScalarKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(name) = trimmed.strip_prefix("enum:") {
            let name = name.trim();
            if name.is_empty() {
                return Err(SchemaError::UnknownKind(s.to_string()));
            }
            if ScalarKind::is_reserved_enum_name(name) {
                return Err(SchemaError::ReservedEnumName(name.to_string()));
            }
            return Ok(ScalarKind::Enum(name.to_string()));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "id" => Ok(ScalarKind::Id),
            "string" | "text" => Ok(ScalarKind::String),
            "integer" | "int" => Ok(ScalarKind::Integer),
            "float" | "decimal" => Ok(ScalarKind::Float),
            "boolean" | "bool" => Ok(ScalarKind::Boolean),
            "datetime" | "naive_datetime" | "utc_datetime" => Ok(ScalarKind::DateTime),
            "date" => Ok(ScalarKind::Date),
            "time" => Ok(ScalarKind::Time),
            "array" => Ok(ScalarKind::Array),
            "geo_point" | "geopoint" => Ok(ScalarKind::GeoPoint),
            "generic" | "json" | "map" => Ok(ScalarKind::Generic),
            _ => Err(SchemaError::UnknownKind(s.to_string())),
        }
    }
}

/// Category an operator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorCategory {
    Comparison,
    Pattern,
    Membership,
    NullCheck,
    FullText,
    Geo,
}

/// Shape an operand must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandShape {
    /// A single value of the field's kind.
    Scalar,
    /// A list of values of the field's kind.
    List,
    /// `[low, high]`
    Range,
    /// A boolean flag (`_is_null`).
    Flag,
    /// An object with operator-specific keys (geo operators).
    Structured,
}

/// Built-in filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Like,
    Ilike,
    Contains,
    StartsWith,
    EndsWith,
    Between,
    IsNull,
    Match,
    MatchPhrase,
    Near,
    WithinDistance,
    WithinBounds,
    Overlaps,
}

impl Operator {
    /// The complete vocabulary, in canonical order.
    pub const ALL: [Operator; 21] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::NotIn,
        Operator::Like,
        Operator::Ilike,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Between,
        Operator::IsNull,
        Operator::Match,
        Operator::MatchPhrase,
        Operator::Near,
        Operator::WithinDistance,
        Operator::WithinBounds,
        Operator::Overlaps,
    ];

    /// Wire key, e.g. `_eq`.
    pub fn key(self) -> &'static str {
        match self {
            Operator::Eq => "_eq",
            Operator::Neq => "_neq",
            Operator::Gt => "_gt",
            Operator::Gte => "_gte",
            Operator::Lt => "_lt",
            Operator::Lte => "_lte",
            Operator::In => "_in",
            Operator::NotIn => "_not_in",
            Operator::Like => "_like",
            Operator::Ilike => "_ilike",
            Operator::Contains => "_contains",
            Operator::StartsWith => "_starts_with",
            Operator::EndsWith => "_ends_with",
            Operator::Between => "_between",
            Operator::IsNull => "_is_null",
            Operator::Match => "_match",
            Operator::MatchPhrase => "_match_phrase",
            Operator::Near => "_near",
            Operator::WithinDistance => "_within_distance",
            Operator::WithinBounds => "_within_bounds",
            Operator::Overlaps => "_overlaps",
        }
    }

    /// Resolve a wire key. The leading underscore is optional, so both
    /// `_is_null` and `is_null` resolve.
    pub fn from_key(key: &str) -> Option<Self> {
        let bare = key.strip_prefix('_').unwrap_or(key);
        Self::ALL.into_iter().find(|op| &op.key()[1..] == bare)
    }

    pub fn category(self) -> OperatorCategory {
        match self {
            Operator::Eq
            | Operator::Neq
            | Operator::Gt
            | Operator::Gte
            | Operator::Lt
            | Operator::Lte
            | Operator::Between => OperatorCategory::Comparison,
            Operator::Like
            | Operator::Ilike
            | Operator::Contains
            | Operator::StartsWith
            | Operator::EndsWith => OperatorCategory::Pattern,
            Operator::In | Operator::NotIn | Operator::Overlaps => OperatorCategory::Membership,
            Operator::IsNull => OperatorCategory::NullCheck,
            Operator::Match | Operator::MatchPhrase => OperatorCategory::FullText,
            Operator::Near | Operator::WithinDistance | Operator::WithinBounds => {
                OperatorCategory::Geo
            }
        }
    }

    /// Operand shape for this operator on a field of `kind`.
    ///
    /// `_contains` is the one operator whose shape depends on the kind: a
    /// substring on scalars, a list of required elements on arrays.
    pub fn shape(self, kind: &ScalarKind) -> OperandShape {
        match self {
            Operator::In | Operator::NotIn | Operator::Overlaps => OperandShape::List,
            Operator::Contains if *kind == ScalarKind::Array => OperandShape::List,
            Operator::Between => OperandShape::Range,
            Operator::IsNull => OperandShape::Flag,
            Operator::Near | Operator::WithinDistance | Operator::WithinBounds => {
                OperandShape::Structured
            }
            _ => OperandShape::Scalar,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Operator {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s.trim()).ok_or_else(|| SchemaError::UnknownOperator(s.to_string()))
    }
}
