//! Lowering of parsed trees into native predicates and sort clauses.
//!
//! Compilation is a structural recursion over the [`FilterNode`] tree.
//! Combinators lower their children in input order; leaves are re-checked
//! against the registry (the tree may have been built by hand) and handed to
//! the bound renderer. Any failure fails the whole compilation; no clause is
//! ever dropped.

use serde_json::Value;
use tracing::{debug, trace};

use crate::ast::{FilterNode, NullsPosition, OrderSpec};
use crate::custom::{CustomFilterContext, CustomFilters};
use crate::error::CompileError;
use crate::kind::Operator;
use crate::registry::OperatorRegistry;
use crate::render::{Binder, Fragment, NativePredicate, NativeSort, PredicateRenderer};
use crate::schema::{FieldMetadata, FieldSpec};

/// Everything the compiler needs.
#[derive(Clone, Copy)]
pub struct CompileContext<'a> {
    pub entity: &'a str,
    pub fields: &'a dyn FieldMetadata,
    pub registry: &'a OperatorRegistry,
    pub renderer: &'a dyn PredicateRenderer,
    pub custom: Option<&'a CustomFilters>,
}

impl<'a> CompileContext<'a> {
    pub fn new(
        entity: &'a str,
        fields: &'a dyn FieldMetadata,
        registry: &'a OperatorRegistry,
        renderer: &'a dyn PredicateRenderer,
    ) -> Self {
        Self {
            entity,
            fields,
            registry,
            renderer,
            custom: None,
        }
    }

    pub fn with_custom(mut self, custom: &'a CustomFilters) -> Self {
        self.custom = Some(custom);
        self
    }

    fn field(&self, field: &str) -> Result<&'a FieldSpec, CompileError> {
        self.fields
            .lookup(self.entity, field)
            .ok_or_else(|| CompileError::UnknownField {
                entity: self.entity.to_string(),
                field: field.to_string(),
            })
    }
}

/// Compile a filter tree for the context's renderer.
pub fn compile_filter(
    node: &FilterNode,
    ctx: &CompileContext<'_>,
) -> Result<NativePredicate, CompileError> {
    let mut binder = ctx.renderer.new_binder();
    let fragment = lower(node, ctx, &mut binder)?;
    let params = binder.into_params();

    debug!(
        adapter = %ctx.renderer.id(),
        entity = ctx.entity,
        params = params.len(),
        "Compiled filter"
    );
    Ok(NativePredicate {
        adapter: ctx.renderer.id(),
        fragment,
        params,
    })
}

fn lower(
    node: &FilterNode,
    ctx: &CompileContext<'_>,
    binder: &mut Binder,
) -> Result<Fragment, CompileError> {
    let renderer = ctx.renderer;
    match node {
        FilterNode::And(children) => {
            let parts = lower_all(children, ctx, binder)?;
            renderer.all(parts)
        }
        FilterNode::Or(children) => {
            let parts = lower_all(children, ctx, binder)?;
            renderer.any(parts)
        }
        FilterNode::Not(child) => {
            let part = lower(child, ctx, binder)?;
            renderer.negate(part)
        }
        FilterNode::Field {
            field,
            operator,
            value,
        } => lower_field(field, *operator, value, ctx, binder),
        FilterNode::Custom {
            field,
            operator,
            value,
        } => lower_custom(field, operator, value, ctx, binder),
    }
}

fn lower_all(
    children: &[FilterNode],
    ctx: &CompileContext<'_>,
    binder: &mut Binder,
) -> Result<Vec<Fragment>, CompileError> {
    children
        .iter()
        .map(|child| lower(child, ctx, binder))
        .collect()
}

fn lower_field(
    field: &str,
    op: Operator,
    value: &Value,
    ctx: &CompileContext<'_>,
    binder: &mut Binder,
) -> Result<Fragment, CompileError> {
    let spec = ctx.field(field)?;
    let adapter = ctx.renderer.id();
    if !ctx.registry.is_legal(&spec.kind, adapter, op) {
        return Err(CompileError::UnsupportedOperator {
            field: field.to_string(),
            operator: op.key().to_string(),
            kind: spec.kind.to_string(),
            adapter,
        });
    }
    trace!(field, operator = %op, "Lowering predicate");
    ctx.renderer.render_leaf(spec, op, value, binder)
}

fn lower_custom(
    field: &str,
    operator: &str,
    value: &Value,
    ctx: &CompileContext<'_>,
    binder: &mut Binder,
) -> Result<Fragment, CompileError> {
    let unresolved = || CompileError::UnresolvedCustomFilter {
        entity: ctx.entity.to_string(),
        field: field.to_string(),
        operator: operator.to_string(),
    };
    let filter = ctx
        .custom
        .and_then(|c| c.get(ctx.entity, field, operator))
        .ok_or_else(unresolved)?;

    // Computed fields have no metadata; their name doubles as the column.
    let native = ctx
        .fields
        .lookup(ctx.entity, field)
        .map_or(field, |spec| spec.native_ref.as_str());
    let column = ctx.renderer.quote_ident(native);

    trace!(field, operator, "Lowering custom predicate");
    let mut custom_ctx = CustomFilterContext::new(ctx.renderer, binder);
    let fragment = filter(&mut custom_ctx, &column, value)?;
    if !ctx.renderer.accepts(&fragment) {
        return Err(CompileError::AdapterMismatch {
            expected: ctx.renderer.id().to_string(),
            found: fragment.kind_name().to_string(),
        });
    }
    Ok(fragment)
}

/// Compile order clauses, preserving their order. Null positioning the
/// dialect cannot express is dropped. Fields must be sortable even when the
/// specs did not come through the parser.
pub fn compile_order(
    specs: &[OrderSpec],
    ctx: &CompileContext<'_>,
) -> Result<NativeSort, CompileError> {
    let mut clauses = Vec::with_capacity(specs.len());
    for spec in specs {
        let field = ctx.field(&spec.field)?;
        if !field.sortable {
            return Err(CompileError::FieldNotSortable {
                entity: ctx.entity.to_string(),
                field: spec.field.clone(),
            });
        }
        let clause = ctx.renderer.sort_clause(field, spec.direction, spec.nulls);
        if spec.nulls != NullsPosition::Default && clause.nulls.is_none() {
            debug!(
                adapter = %ctx.renderer.id(),
                field = %spec.field,
                "Dropped unsupported null ordering"
            );
        }
        clauses.push(clause);
    }
    Ok(NativeSort {
        adapter: ctx.renderer.id(),
        clauses,
    })
}
