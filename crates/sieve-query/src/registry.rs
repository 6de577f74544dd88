//! Operator registry.
//!
//! Maps `(ScalarKind, AdapterId)` to the ordered list of legal operators.
//! Base tables are static per adapter. Enums may carry a restricted operator
//! list and a set of legal values; adapter descriptors may narrow a kind's
//! set with [`OperatorRegistry::override_kind`].
//!
//! The registry is assembled with `&mut self` (or the builder) during
//! startup and is read-only once shared.

use std::collections::BTreeMap;

use sieve_config::SchemaConfig;
use tracing::debug;

use crate::adapter::AdapterId;
use crate::error::SchemaError;
use crate::kind::{Operator, ScalarKind};

use Operator::*;

const ID_OPS: &[Operator] = &[Eq, Neq, In, NotIn, IsNull];

const PG_STRING_OPS: &[Operator] = &[
    Eq, Neq, Gt, Gte, Lt, Lte, In, NotIn, Like, Ilike, Contains, StartsWith, EndsWith, IsNull,
];

const SQL_STRING_OPS: &[Operator] = &[
    Eq, Neq, Gt, Gte, Lt, Lte, In, NotIn, Like, Contains, StartsWith, EndsWith, IsNull,
];

const SEARCH_STRING_OPS: &[Operator] = &[
    Eq, Neq, Gt, Gte, Lt, Lte, In, NotIn, Like, Ilike, Contains, StartsWith, EndsWith, IsNull,
    Match, MatchPhrase,
];

const NUMERIC_OPS: &[Operator] = &[Eq, Neq, Gt, Gte, Lt, Lte, In, NotIn, Between, IsNull];

const BOOLEAN_OPS: &[Operator] = &[Eq, Neq, IsNull];

const TEMPORAL_OPS: &[Operator] = &[Eq, Neq, Gt, Gte, Lt, Lte, Between, IsNull];

const ENUM_OPS: &[Operator] = &[Eq, Neq, In, NotIn, IsNull];

const ARRAY_OPS: &[Operator] = &[Contains, IsNull, Overlaps];

const GEO_OPS: &[Operator] = &[IsNull, Near, WithinDistance, WithinBounds];

const GENERIC_OPS: &[Operator] = &[Eq, Neq, IsNull];

static GENERIC_KIND: ScalarKind = ScalarKind::Generic;

/// Kinds every registry knows about, in display order.
pub const BUILTIN_KINDS: [ScalarKind; 11] = [
    ScalarKind::Id,
    ScalarKind::String,
    ScalarKind::Integer,
    ScalarKind::Float,
    ScalarKind::Boolean,
    ScalarKind::DateTime,
    ScalarKind::Date,
    ScalarKind::Time,
    ScalarKind::Array,
    ScalarKind::GeoPoint,
    ScalarKind::Generic,
];

/// Static base table lookup. Empty means "no specific set".
fn base_operators(kind: &ScalarKind, adapter: AdapterId) -> &'static [Operator] {
    match (kind, adapter) {
        (ScalarKind::Id, _) => ID_OPS,
        (ScalarKind::String, AdapterId::Postgres) => PG_STRING_OPS,
        (ScalarKind::String, AdapterId::Search) => SEARCH_STRING_OPS,
        (ScalarKind::String, _) => SQL_STRING_OPS,
        (ScalarKind::Integer | ScalarKind::Float, _) => NUMERIC_OPS,
        (ScalarKind::Boolean, _) => BOOLEAN_OPS,
        (ScalarKind::DateTime | ScalarKind::Date | ScalarKind::Time, _) => TEMPORAL_OPS,
        (ScalarKind::Enum(_), _) => ENUM_OPS,
        (ScalarKind::Array, AdapterId::Postgres | AdapterId::Search) => ARRAY_OPS,
        (ScalarKind::Array, _) => &[],
        (ScalarKind::GeoPoint, AdapterId::Search) => GEO_OPS,
        (ScalarKind::GeoPoint, _) => &[],
        (ScalarKind::Generic, _) => GENERIC_OPS,
    }
}

/// Sort into canonical vocabulary order and drop duplicates.
fn canonicalize(mut ops: Vec<Operator>) -> Vec<Operator> {
    ops.sort();
    ops.dedup();
    ops
}

/// Enum registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    pub name: String,
    pub values: Vec<String>,
    /// Restricted operator list; `None` keeps the base enum set.
    pub operators: Option<Vec<Operator>>,
}

impl EnumSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            operators: None,
        }
    }

    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn operators(mut self, operators: impl IntoIterator<Item = Operator>) -> Self {
        self.operators = Some(operators.into_iter().collect());
        self
    }
}

#[derive(Debug, Clone, Default)]
struct EnumEntry {
    values: Vec<String>,
    operators: Option<Vec<Operator>>,
}

/// Registry of legal operators per kind and adapter.
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    enums: BTreeMap<String, EnumEntry>,
    overrides: BTreeMap<(AdapterId, ScalarKind), Vec<Operator>>,
}

impl OperatorRegistry {
    /// Registry with only the static base tables.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> OperatorRegistryBuilder {
        OperatorRegistryBuilder::new()
    }

    /// Build from declared enums.
    pub fn from_config(config: &SchemaConfig) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for en in &config.enums {
            let operators = if en.operators.is_empty() {
                None
            } else {
                Some(
                    en.operators
                        .iter()
                        .map(|key| key.parse::<Operator>())
                        .collect::<Result<Vec<_>, _>>()?,
                )
            };
            registry.register_enum(EnumSpec {
                name: en.name.clone(),
                values: en.values.clone(),
                operators,
            })?;
        }
        Ok(registry)
    }

    /// Register (or replace) an enum's values and restricted operators.
    ///
    /// Restricted operators must all belong to the base enum set, and the
    /// name must not clash with a built-in kind's operator input.
    pub fn register_enum(&mut self, spec: EnumSpec) -> Result<(), SchemaError> {
        if ScalarKind::is_reserved_enum_name(&spec.name) {
            return Err(SchemaError::ReservedEnumName(spec.name));
        }
        let operators = match spec.operators {
            Some(ops) => {
                if let Some(bad) = ops.iter().find(|op| !ENUM_OPS.contains(op)) {
                    return Err(SchemaError::EnumOperatorNotAllowed {
                        name: spec.name,
                        operator: bad.key().to_string(),
                    });
                }
                Some(canonicalize(ops))
            }
            None => None,
        };

        debug!(
            name = %spec.name,
            values = spec.values.len(),
            restricted = operators.is_some(),
            "Registered enum"
        );
        self.enums.insert(
            spec.name,
            EnumEntry {
                values: spec.values,
                operators,
            },
        );
        Ok(())
    }

    /// Replace the operator set of one (kind, adapter) pair.
    pub fn override_kind(
        &mut self,
        adapter: AdapterId,
        kind: ScalarKind,
        operators: impl IntoIterator<Item = Operator>,
    ) {
        let ops = canonicalize(operators.into_iter().collect());
        debug!(%adapter, %kind, count = ops.len(), "Overrode operator set");
        self.overrides.insert((adapter, kind), ops);
    }

    /// Legal operators for `kind` under `adapter`, in canonical order.
    ///
    /// Total over all pairs: an empty slice means the kind has no specific
    /// set under this adapter (see [`Self::effective_kind`]).
    pub fn operators_for(&self, kind: &ScalarKind, adapter: AdapterId) -> &[Operator] {
        if let Some(ops) = self.overrides.get(&(adapter, kind.clone())) {
            return ops;
        }
        if let ScalarKind::Enum(name) = kind {
            if let Some(ops) = self.enums.get(name).and_then(|e| e.operators.as_deref()) {
                return ops;
            }
        }
        base_operators(kind, adapter)
    }

    /// The kind whose operator set applies: `kind` itself, or `Generic` when
    /// `kind` has no set under `adapter`.
    pub fn effective_kind<'a>(&self, kind: &'a ScalarKind, adapter: AdapterId) -> &'a ScalarKind {
        if self.operators_for(kind, adapter).is_empty() {
            &GENERIC_KIND
        } else {
            kind
        }
    }

    pub fn is_legal(&self, kind: &ScalarKind, adapter: AdapterId, op: Operator) -> bool {
        self.operators_for(self.effective_kind(kind, adapter), adapter)
            .contains(&op)
    }

    /// Registered values of an enum. `None` when the enum is unregistered or
    /// declared without values, in which case any string is accepted.
    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.enums
            .get(name)
            .map(|e| e.values.as_slice())
            .filter(|v| !v.is_empty())
    }

    pub fn enum_names(&self) -> impl Iterator<Item = &str> {
        self.enums.keys().map(String::as_str)
    }

    /// Built-in kinds followed by every registered enum.
    pub fn kinds(&self) -> Vec<ScalarKind> {
        BUILTIN_KINDS
            .iter()
            .cloned()
            .chain(self.enums.keys().map(|n| ScalarKind::Enum(n.clone())))
            .collect()
    }

    /// The global operator vocabulary.
    pub fn vocabulary(&self) -> &'static [Operator] {
        &Operator::ALL
    }
}

/// Builder for ergonomic registry construction.
#[derive(Debug, Default)]
pub struct OperatorRegistryBuilder {
    enums: Vec<EnumSpec>,
    overrides: Vec<(AdapterId, ScalarKind, Vec<Operator>)>,
}

impl OperatorRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enum(mut self, spec: EnumSpec) -> Self {
        self.enums.push(spec);
        self
    }

    pub fn with_override(
        mut self,
        adapter: AdapterId,
        kind: ScalarKind,
        operators: impl IntoIterator<Item = Operator>,
    ) -> Self {
        self.overrides
            .push((adapter, kind, operators.into_iter().collect()));
        self
    }

    pub fn build(self) -> Result<OperatorRegistry, SchemaError> {
        let mut registry = OperatorRegistry::new();
        for spec in self.enums {
            registry.register_enum(spec)?;
        }
        for (adapter, kind, ops) in self.overrides {
            registry.override_kind(adapter, kind, ops);
        }
        Ok(registry)
    }
}
