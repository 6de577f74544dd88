//! Field metadata: which entities exist, which fields they expose, and how
//! each field maps to a native reference and a semantic kind.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

use sieve_config::{SchemaConfig, TypeKindConfig};
use tracing::debug;

use crate::error::SchemaError;
use crate::kind::ScalarKind;

/// Client-facing entity and field names.
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// One segment of a dotted native reference (`table.column`).
static NATIVE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("valid native ref regex"));

/// Lookup of field metadata by entity and field name.
pub trait FieldMetadata: Send + Sync {
    fn lookup(&self, entity: &str, field: &str) -> Option<&FieldSpec>;

    fn contains_entity(&self, entity: &str) -> bool;
}

/// A filterable/sortable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    /// Native reference, possibly qualified (`users.age_years`).
    pub native_ref: String,
    pub kind: ScalarKind,
    pub filterable: bool,
    pub sortable: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        let name = name.into();
        let sortable = kind.sortable_by_default();
        Self {
            native_ref: name.clone(),
            name,
            kind,
            filterable: true,
            sortable,
        }
    }

    pub fn column(mut self, native_ref: impl Into<String>) -> Self {
        self.native_ref = native_ref.into();
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Segments of the native reference, split on `.`.
    pub fn native_segments(&self) -> impl Iterator<Item = &str> {
        self.native_ref.split('.')
    }
}

/// An entity and its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl EntitySpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn filterable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.filterable)
    }

    pub fn sortable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.sortable)
    }
}

/// Immutable field metadata for all entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entities: BTreeMap<String, EntitySpec>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn entity(&self, name: &str) -> Option<&EntitySpec> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntitySpec> {
        self.entities.values()
    }

    /// Build from declared object and interface types.
    ///
    /// A field without a `kind` is kept (so clients get `FieldNotFilterable`
    /// rather than `UnknownField`) but is neither filterable nor sortable
    /// unless explicitly declared so.
    pub fn from_config(config: &SchemaConfig) -> Result<Self, SchemaError> {
        let mut builder = Self::builder();
        for ty in &config.types {
            if !matches!(ty.kind, TypeKindConfig::Object | TypeKindConfig::Interface) {
                continue;
            }

            let mut fields = Vec::with_capacity(ty.fields.len());
            for field in &ty.fields {
                let spec = match &field.kind {
                    Some(kind) => {
                        let kind: ScalarKind = kind.parse()?;
                        FieldSpec::new(&field.name, kind)
                    }
                    None => FieldSpec::new(&field.name, ScalarKind::Generic)
                        .filterable(false)
                        .sortable(false),
                };
                let mut spec = spec.column(field.column());
                if let Some(filterable) = field.filterable {
                    spec.filterable = filterable;
                }
                if let Some(sortable) = field.sortable {
                    spec.sortable = sortable;
                }
                fields.push(spec);
            }

            builder = builder.entity(&ty.name, |mut e| {
                for spec in fields {
                    e = e.spec(spec);
                }
                e
            });
        }
        builder.build()
    }
}

impl FieldMetadata for Schema {
    fn lookup(&self, entity: &str, field: &str) -> Option<&FieldSpec> {
        self.entities.get(entity)?.field(field)
    }

    fn contains_entity(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }
}

/// Builder for one entity's fields.
#[derive(Debug, Default)]
pub struct EntityBuilder {
    fields: Vec<FieldSpec>,
}

impl EntityBuilder {
    /// Field whose native reference equals its name.
    pub fn field(self, name: &str, kind: ScalarKind) -> Self {
        self.spec(FieldSpec::new(name, kind))
    }

    /// Field mapped to a different native reference.
    pub fn column(self, name: &str, native_ref: &str, kind: ScalarKind) -> Self {
        self.spec(FieldSpec::new(name, kind).column(native_ref))
    }

    pub fn spec(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }
}

/// Builder for [`Schema`]; validation happens in [`SchemaBuilder::build`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entities: Vec<EntitySpec>,
}

impl SchemaBuilder {
    pub fn entity(mut self, name: &str, f: impl FnOnce(EntityBuilder) -> EntityBuilder) -> Self {
        let built = f(EntityBuilder::default());
        self.entities.push(EntitySpec {
            name: name.to_string(),
            fields: built.fields,
        });
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut entities = BTreeMap::new();
        for entity in self.entities {
            validate_identifier(&entity.name)?;

            let mut seen = HashSet::new();
            for field in &entity.fields {
                validate_identifier(&field.name)?;
                validate_native_ref(field)?;
                if let ScalarKind::Enum(name) = &field.kind {
                    if ScalarKind::is_reserved_enum_name(name) {
                        return Err(SchemaError::ReservedEnumName(name.clone()));
                    }
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        entity: entity.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }

            if entities.contains_key(&entity.name) {
                return Err(SchemaError::DuplicateEntity(entity.name));
            }
            entities.insert(entity.name.clone(), entity);
        }

        debug!(entities = entities.len(), "Built schema");
        Ok(Schema { entities })
    }
}

fn validate_identifier(name: &str) -> Result<(), SchemaError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_string()))
    }
}

fn validate_native_ref(field: &FieldSpec) -> Result<(), SchemaError> {
    if field.native_segments().all(|s| NATIVE_SEGMENT.is_match(s)) {
        Ok(())
    } else {
        Err(SchemaError::InvalidNativeRef {
            field: field.name.clone(),
            native_ref: field.native_ref.clone(),
        })
    }
}
