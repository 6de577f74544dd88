//! Generated input definitions for the schema-assembly layer.
//!
//! For every discovered entity the schema knows about this produces a
//! `<Type>Filter` input, a `<Type>Order` input and the shared
//! `<Kind>Operators` inputs they reference, all for one bound adapter.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::adapter::AdapterId;
use crate::custom::CustomFilters;
use crate::kind::{OperandShape, Operator, OperatorCategory, ScalarKind};
use crate::registry::OperatorRegistry;
use crate::schema::Schema;

/// Combinator keys every filter input carries.
pub const COMBINATORS: [&str; 3] = ["_and", "_or", "_not"];

/// One operator entry of an operator input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorEntry {
    pub key: &'static str,
    pub category: OperatorCategory,
    pub shape: OperandShape,
}

/// `<Kind>Operators`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorInput {
    pub name: String,
    pub kind: String,
    pub operators: Vec<OperatorEntry>,
}

/// One field of a filter input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterField {
    pub name: String,
    /// Referenced `<Kind>Operators` input; `None` for computed fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operators: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_operators: Vec<String>,
}

/// `<Type>Filter`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterInput {
    pub name: String,
    pub entity: String,
    pub combinators: Vec<&'static str>,
    pub fields: Vec<FilterField>,
}

/// `<Type>Order`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderInput {
    pub name: String,
    pub entity: String,
    pub fields: Vec<String>,
}

/// All generated inputs for one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedInputs {
    pub adapter: AdapterId,
    pub operator_inputs: BTreeMap<String, OperatorInput>,
    pub filter_inputs: BTreeMap<String, FilterInput>,
    pub order_inputs: BTreeMap<String, OrderInput>,
}

impl GeneratedInputs {
    fn new(adapter: AdapterId) -> Self {
        Self {
            adapter,
            operator_inputs: BTreeMap::new(),
            filter_inputs: BTreeMap::new(),
            order_inputs: BTreeMap::new(),
        }
    }

    /// Register the operator input for `kind` and return its name.
    fn operator_input(&mut self, kind: &ScalarKind, registry: &OperatorRegistry) -> String {
        let name = format!("{}Operators", kind.input_name());
        let adapter = self.adapter;
        self.operator_inputs
            .entry(name.clone())
            .or_insert_with(|| OperatorInput {
                name: name.clone(),
                kind: kind.to_string(),
                operators: registry
                    .operators_for(kind, adapter)
                    .iter()
                    .map(|op| entry(*op, kind))
                    .collect(),
            });
        name
    }
}

fn entry(op: Operator, kind: &ScalarKind) -> OperatorEntry {
    OperatorEntry {
        key: op.key(),
        category: op.category(),
        shape: op.shape(kind),
    }
}

/// Generate inputs for `types` (usually the discovery result, in discovery
/// order). Types without schema metadata are skipped.
pub fn generate_inputs<S: AsRef<str>>(
    types: &[S],
    schema: &Schema,
    registry: &OperatorRegistry,
    adapter: AdapterId,
    custom: Option<&CustomFilters>,
) -> GeneratedInputs {
    let mut out = GeneratedInputs::new(adapter);

    for ty in types {
        let Some(entity) = schema.entity(ty.as_ref()) else {
            continue;
        };

        let custom_ops = |field: &str| -> Vec<String> {
            custom
                .map(|c| {
                    c.operators_for_field(&entity.name, field)
                        .into_iter()
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut fields = Vec::new();
        for field in &entity.fields {
            let extra = custom_ops(&field.name);
            if !field.filterable && extra.is_empty() {
                continue;
            }
            let operators = if field.filterable {
                let kind = registry.effective_kind(&field.kind, adapter);
                Some(out.operator_input(kind, registry))
            } else {
                None
            };
            fields.push(FilterField {
                name: field.name.clone(),
                operators,
                custom_operators: extra,
            });
        }

        // Computed fields known only to the custom registry.
        if let Some(custom) = custom {
            for name in custom.fields_for_entity(&entity.name) {
                if entity.field(name).is_none() {
                    fields.push(FilterField {
                        name: name.to_string(),
                        operators: None,
                        custom_operators: custom_ops(name),
                    });
                }
            }
        }

        let filter_name = format!("{}Filter", entity.name);
        out.filter_inputs.insert(
            filter_name.clone(),
            FilterInput {
                name: filter_name,
                entity: entity.name.clone(),
                combinators: COMBINATORS.to_vec(),
                fields,
            },
        );

        let order_name = format!("{}Order", entity.name);
        out.order_inputs.insert(
            order_name.clone(),
            OrderInput {
                name: order_name,
                entity: entity.name.clone(),
                fields: entity.sortable_fields().map(|f| f.name.clone()).collect(),
            },
        );
    }

    out
}
