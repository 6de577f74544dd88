//! Error types for parsing, compiling and schema assembly.
//!
//! Every variant carries enough field/operator/adapter context to build a
//! client-facing message. None of them are fatal to the process.

use thiserror::Error;

use crate::adapter::AdapterId;

/// Errors raised while parsing a client filter or order expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    #[error("Unknown field '{field}' on {entity}")]
    UnknownField { entity: String, field: String },

    #[error("Field '{field}' on {entity} is not filterable")]
    FieldNotFilterable { entity: String, field: String },

    #[error("Field '{field}' on {entity} is not sortable")]
    FieldNotSortable { entity: String, field: String },

    /// The same payload may be valid under a different adapter, so the
    /// adapter is always reported.
    #[error("Operator '{operator}' is not supported on {kind} field '{field}' by the {adapter} adapter")]
    UnsupportedOperator {
        field: String,
        operator: String,
        kind: String,
        adapter: AdapterId,
    },

    #[error("Invalid operand for '{operator}' on field '{field}': {message}")]
    InvalidOperand {
        field: String,
        operator: String,
        message: String,
    },

    #[error("Invalid expression at {path}: {message}")]
    InvalidExpression { path: String, message: String },

    #[error("Expression nesting exceeds maximum depth of {max}")]
    ExpressionTooDeep { max: usize },

    #[error("Filter input is {size} bytes (max {max} bytes)")]
    InputTooLarge { size: usize, max: usize },

    #[error("Expression contains more than {max} predicates")]
    TooManyPredicates { max: usize },

    #[error("Order expression has {count} clauses (max {max})")]
    TooManyOrderClauses { count: usize, max: usize },

    #[error("Invalid JSON: {0}")]
    Json(String),
}

/// Errors raised while lowering a parsed tree into a native predicate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("Unknown field '{field}' on {entity}")]
    UnknownField { entity: String, field: String },

    #[error("Operator '{operator}' is not supported on {kind} field '{field}' by the {adapter} adapter")]
    UnsupportedOperator {
        field: String,
        operator: String,
        kind: String,
        adapter: AdapterId,
    },

    #[error("Invalid operand for '{operator}' on field '{field}': {message}")]
    InvalidOperand {
        field: String,
        operator: String,
        message: String,
    },

    #[error("Field '{field}' on {entity} is not sortable")]
    FieldNotSortable { entity: String, field: String },

    #[error("Adapter mismatch: bound to {expected}, got {found}")]
    AdapterMismatch { expected: String, found: String },

    #[error("No custom filter registered for '{operator}' on {entity}.{field}")]
    UnresolvedCustomFilter {
        entity: String,
        field: String,
        operator: String,
    },
}

/// Errors raised while building the schema, registry or engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Unknown scalar kind '{0}'")]
    UnknownKind(String),

    #[error("Unknown adapter '{0}'")]
    UnknownAdapter(String),

    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Invalid native reference '{native_ref}' for field '{field}'")]
    InvalidNativeRef { field: String, native_ref: String },

    #[error("Entity '{0}' declared more than once")]
    DuplicateEntity(String),

    #[error("Field '{field}' declared more than once on {entity}")]
    DuplicateField { entity: String, field: String },

    #[error("Unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("Operator '{operator}' cannot be used with enum {name}")]
    EnumOperatorNotAllowed { name: String, operator: String },

    #[error("Enum name '{0}' is reserved for a built-in kind")]
    ReservedEnumName(String),
}

/// Umbrella error for the one-shot engine helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
