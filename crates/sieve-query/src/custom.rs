//! Custom filter registry.
//!
//! Applications register predicates the built-in vocabulary cannot express
//! (computed fields, full-text helpers, domain shortcuts) keyed by
//! `(entity, field, operator)`. The parser emits [`FilterNode::Custom`] for
//! registered keys and the compiler hands the operand back to the registered
//! function, which renders a fragment through a [`CustomFilterContext`].
//!
//! [`FilterNode::Custom`]: crate::ast::FilterNode::Custom

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::adapter::AdapterId;
use crate::error::CompileError;
use crate::render::{Binder, Fragment, PredicateRenderer};

/// A registered custom predicate.
///
/// Receives the context, the quoted native column (or the field name quoted
/// when the field is computed) and the raw operand.
pub type CustomFilterFn = Arc<
    dyn Fn(&mut CustomFilterContext<'_>, &str, &Value) -> Result<Fragment, CompileError>
        + Send
        + Sync,
>;

/// What a custom filter may do while rendering: bind values and quote
/// identifiers in the bound dialect.
pub struct CustomFilterContext<'a> {
    renderer: &'a dyn PredicateRenderer,
    binder: &'a mut Binder,
}

impl<'a> CustomFilterContext<'a> {
    pub(crate) fn new(renderer: &'a dyn PredicateRenderer, binder: &'a mut Binder) -> Self {
        Self { renderer, binder }
    }

    pub fn adapter(&self) -> AdapterId {
        self.renderer.id()
    }

    /// Bind a value and return its placeholder (`$3`, `?`, `@p2`). Search
    /// fragments embed values directly and get an empty placeholder.
    pub fn bind(&mut self, value: Value) -> String {
        self.binder.bind(value)
    }

    /// Quote a (possibly dotted) identifier.
    pub fn quote(&self, ident: &str) -> String {
        self.renderer.quote_ident(ident)
    }
}

pub(crate) fn normalize_operator(operator: &str) -> String {
    if operator.starts_with('_') {
        operator.to_string()
    } else {
        format!("_{}", operator)
    }
}

/// Registry of custom predicates.
#[derive(Clone, Default)]
pub struct CustomFilters {
    filters: BTreeMap<(String, String, String), CustomFilterFn>,
}

impl CustomFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` for `operator` on `entity.field`, replacing any previous
    /// registration for the same key. The operator's leading underscore is
    /// optional.
    pub fn register<F>(&mut self, entity: &str, field: &str, operator: &str, f: F) -> &mut Self
    where
        F: Fn(&mut CustomFilterContext<'_>, &str, &Value) -> Result<Fragment, CompileError>
            + Send
            + Sync
            + 'static,
    {
        self.filters.insert(
            (
                entity.to_string(),
                field.to_string(),
                normalize_operator(operator),
            ),
            Arc::new(f),
        );
        self
    }

    pub fn get(&self, entity: &str, field: &str, operator: &str) -> Option<&CustomFilterFn> {
        self.filters.get(&(
            entity.to_string(),
            field.to_string(),
            normalize_operator(operator),
        ))
    }

    pub fn contains(&self, entity: &str, field: &str, operator: &str) -> bool {
        self.get(entity, field, operator).is_some()
    }

    pub fn has_field(&self, entity: &str, field: &str) -> bool {
        self.filters
            .keys()
            .any(|(e, f, _)| e == entity && f == field)
    }

    /// Operator keys registered for `entity.field`, sorted.
    pub fn operators_for_field(&self, entity: &str, field: &str) -> Vec<&str> {
        self.filters
            .keys()
            .filter(|(e, f, _)| e == entity && f == field)
            .map(|(_, _, op)| op.as_str())
            .collect()
    }

    /// Fields of `entity` that only exist in this registry or carry extra
    /// operators, sorted and deduplicated.
    pub fn fields_for_entity(&self, entity: &str) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .filters
            .keys()
            .filter(|(e, _, _)| e == entity)
            .map(|(_, f, _)| f.as_str())
            .collect();
        fields.dedup();
        fields
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for CustomFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFilters")
            .field("keys", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}
