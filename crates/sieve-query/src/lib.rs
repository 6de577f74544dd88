//! Structured filter/order compiler.
//!
//! Turns a client-supplied nested filter document such as
//!
//! ```json
//! {"_or": [{"status": {"_eq": "active"}}, {"age": {"_gte": 18}}]}
//! ```
//!
//! into a validated [`FilterNode`] tree and then into a backend-native
//! predicate for exactly one bound dialect (Postgres, MySQL, SQLite, MSSQL or
//! a search index). Values never reach the native text: SQL dialects bind
//! them as parameters and the search dialect only places them in value
//! positions of the query document.
//!
//! ```text
//! raw JSON ──parse──▶ FilterNode ──compile──▶ NativePredicate
//!              ▲                      ▲
//!   Schema + OperatorRegistry   PredicateRenderer
//! ```
//!
//! Most callers go through [`FilterEngine`], which bundles the schema,
//! registry, renderer, custom filters and limits built once at startup.

pub mod adapter;
pub mod ast;
pub mod compile;
pub mod custom;
pub mod engine;
pub mod error;
pub mod inputs;
pub mod kind;
pub mod parse;
pub mod registry;
pub mod render;
pub mod schema;

pub use adapter::AdapterId;
pub use ast::{BoundFilter, Direction, FilterNode, NullsPosition, OrderSpec};
pub use compile::{compile_filter, compile_order, CompileContext};
pub use custom::{CustomFilterContext, CustomFilters};
pub use engine::{FilterEngine, FilterEngineBuilder};
pub use error::{CompileError, ParseError, QueryError, SchemaError};
pub use inputs::{generate_inputs, GeneratedInputs};
pub use kind::{OperandShape, Operator, OperatorCategory, ScalarKind};
pub use parse::{parse_filter, parse_filter_str, parse_order, ParseContext};
pub use registry::{EnumSpec, OperatorRegistry, OperatorRegistryBuilder};
pub use render::{
    renderer_for, Fragment, NativePredicate, NativeSort, PredicateRenderer, SortClause,
};
pub use schema::{EntitySpec, FieldMetadata, FieldSpec, Schema, SchemaBuilder};

pub use sieve_config::LimitsConfig as Limits;
