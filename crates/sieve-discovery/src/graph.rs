//! Type reference graph.
//!
//! Each declared type is a node whose outgoing edges are the types it
//! mentions: field return types, argument input types, implemented
//! interfaces and union members. The graph is built once per schema assembly
//! and only read afterwards.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use sieve_config::{SchemaConfig, TypeKindConfig};
use tracing::debug;

use crate::error::DiscoveryError;

/// Scalars every graph resolves without a declaration.
pub const BUILTIN_SCALARS: [&str; 9] = [
    "ID", "String", "Int", "Float", "Boolean", "DateTime", "Date", "Time", "JSON",
];

/// Source of outgoing type references for the walker.
pub trait EdgeProvider {
    /// Whether `id` names a known type.
    fn resolves(&self, id: &str) -> bool;

    /// Types referenced by `id`. An edge to a type that does not resolve is
    /// a [`DiscoveryError::DanglingTypeReference`].
    fn edges(&self, id: &str) -> Result<Vec<String>, DiscoveryError>;
}

/// Plain adjacency map. Keys are the known types; every edge target must be
/// a key too.
impl EdgeProvider for HashMap<String, Vec<String>> {
    fn resolves(&self, id: &str) -> bool {
        self.contains_key(id)
    }

    fn edges(&self, id: &str) -> Result<Vec<String>, DiscoveryError> {
        let targets = self.get(id).cloned().unwrap_or_default();
        check_targets(id, &targets, |t| self.contains_key(t))?;
        Ok(targets)
    }
}

fn check_targets(
    from: &str,
    targets: &[String],
    resolves: impl Fn(&str) -> bool,
) -> Result<(), DiscoveryError> {
    match targets.iter().find(|t| !resolves(t)) {
        Some(to) => Err(DiscoveryError::DanglingTypeReference {
            from: from.to_string(),
            to: to.clone(),
        }),
        None => Ok(()),
    }
}

/// Kind of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Object,
    Interface,
    Union,
    Input,
    Enum,
    Scalar,
}

impl TypeKind {
    /// Kinds that get generated filter/order inputs.
    pub fn is_entity(self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::Interface)
    }
}

impl From<TypeKindConfig> for TypeKind {
    fn from(kind: TypeKindConfig) -> Self {
        match kind {
            TypeKindConfig::Object => TypeKind::Object,
            TypeKindConfig::Interface => TypeKind::Interface,
            TypeKindConfig::Union => TypeKind::Union,
            TypeKindConfig::Input => TypeKind::Input,
            TypeKindConfig::Enum => TypeKind::Enum,
            TypeKindConfig::Scalar => TypeKind::Scalar,
        }
    }
}

/// A graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    /// Referenced types in declaration order, without duplicates.
    pub references: Vec<String>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            references: Vec::new(),
        }
    }

    /// Add a reference. Wrapped forms like `[User!]!` are reduced to the
    /// named type; repeats are ignored.
    pub fn reference(mut self, type_ref: &str) -> Self {
        self.add_reference(type_ref);
        self
    }

    pub fn references<I, S>(mut self, type_refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for r in type_refs {
            self.add_reference(r.as_ref());
        }
        self
    }

    fn add_reference(&mut self, type_ref: &str) {
        let name = named_type(type_ref);
        if !name.is_empty() && !self.references.iter().any(|r| r == name) {
            self.references.push(name.to_string());
        }
    }
}

/// Strip list and non-null wrappers: `[User!]!` -> `User`.
pub fn named_type(type_ref: &str) -> &str {
    type_ref.trim().trim_matches(|c| matches!(c, '[' | ']' | '!' | ' '))
}

/// Declared types and their references.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    types: BTreeMap<String, TypeDef>,
}

impl TypeGraph {
    pub fn builder() -> TypeGraphBuilder {
        TypeGraphBuilder::default()
    }

    /// Build from the declarative schema section.
    pub fn from_config(config: &SchemaConfig) -> Result<Self, DiscoveryError> {
        let mut builder = Self::builder();
        for ty in &config.types {
            let mut def = TypeDef::new(&ty.name, ty.kind.into());
            for field in &ty.fields {
                if let Some(type_ref) = &field.type_ref {
                    def = def.reference(type_ref);
                }
                def = def.references(field.args.iter().map(|a| a.type_ref.as_str()));
            }
            def = def
                .references(&ty.interfaces)
                .references(&ty.members);
            builder = builder.type_def(def);
        }
        // Enums declared only under `schema.enums` are leaves too.
        for en in &config.enums {
            if config.type_config(&en.name).is_none() {
                builder = builder.type_def(TypeDef::new(&en.name, TypeKind::Enum));
            }
        }
        builder.build()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn kind(&self, name: &str) -> Option<TypeKind> {
        self.types.get(name).map(|t| t.kind)
    }

    /// All nodes, ordered by name.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl EdgeProvider for TypeGraph {
    fn resolves(&self, id: &str) -> bool {
        self.contains(id)
    }

    fn edges(&self, id: &str) -> Result<Vec<String>, DiscoveryError> {
        let Some(def) = self.types.get(id) else {
            return Ok(Vec::new());
        };
        check_targets(id, &def.references, |t| self.contains(t))?;
        Ok(def.references.clone())
    }
}

/// Builder for [`TypeGraph`]. Built-in scalars are added on `build` unless
/// redeclared.
#[derive(Debug, Default)]
pub struct TypeGraphBuilder {
    defs: Vec<TypeDef>,
}

impl TypeGraphBuilder {
    pub fn type_def(mut self, def: TypeDef) -> Self {
        self.defs.push(def);
        self
    }

    pub fn object<I, S>(self, name: &str, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.type_def(TypeDef::new(name, TypeKind::Object).references(references))
    }

    pub fn interface<I, S>(self, name: &str, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.type_def(TypeDef::new(name, TypeKind::Interface).references(references))
    }

    pub fn union<I, S>(self, name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.type_def(TypeDef::new(name, TypeKind::Union).references(members))
    }

    pub fn input<I, S>(self, name: &str, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.type_def(TypeDef::new(name, TypeKind::Input).references(references))
    }

    pub fn enum_type(self, name: &str) -> Self {
        self.type_def(TypeDef::new(name, TypeKind::Enum))
    }

    pub fn scalar(self, name: &str) -> Self {
        self.type_def(TypeDef::new(name, TypeKind::Scalar))
    }

    pub fn build(self) -> Result<TypeGraph, DiscoveryError> {
        let mut types = BTreeMap::new();
        for def in self.defs {
            if types.contains_key(&def.name) {
                return Err(DiscoveryError::DuplicateType(def.name));
            }
            types.insert(def.name.clone(), def);
        }
        for scalar in BUILTIN_SCALARS {
            types
                .entry(scalar.to_string())
                .or_insert_with(|| TypeDef::new(scalar, TypeKind::Scalar));
        }

        debug!(types = types.len(), "Built type graph");
        Ok(TypeGraph { types })
    }
}
