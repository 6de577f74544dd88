//! Filter engine facade.
//!
//! Bundles the schema, operator registry, bound renderer, custom filters and
//! limits that are assembled once at startup, and exposes the parse/compile
//! pipeline per request. The engine holds no interior mutability and is
//! shared across threads behind an `Arc`.

use serde_json::Value;
use std::sync::Arc;

use sieve_config::SieveConfig;
use tracing::debug;

use crate::adapter::AdapterId;
use crate::ast::{BoundFilter, OrderSpec};
use crate::compile::{self, CompileContext};
use crate::custom::CustomFilters;
use crate::error::{CompileError, ParseError, QueryError, SchemaError};
use crate::inputs::{generate_inputs, GeneratedInputs};
use crate::parse::{self, ParseContext};
use crate::registry::OperatorRegistry;
use crate::render::{renderer_for, NativePredicate, NativeSort, PredicateRenderer};
use crate::schema::{FieldMetadata, Schema};
use crate::Limits;

/// Filter/order compiler bound to one adapter.
#[derive(Clone)]
pub struct FilterEngine {
    schema: Arc<Schema>,
    registry: Arc<OperatorRegistry>,
    renderer: Arc<dyn PredicateRenderer>,
    custom: Arc<CustomFilters>,
    limits: Limits,
}

impl FilterEngine {
    pub fn builder() -> FilterEngineBuilder {
        FilterEngineBuilder::default()
    }

    /// Assemble an engine from configuration: resolve the adapter, build the
    /// schema and register enums.
    pub fn from_config(config: &SieveConfig) -> Result<Self, SchemaError> {
        let adapter = AdapterId::resolve(
            config.adapter.name.as_deref(),
            config.adapter.backend.as_deref(),
        )?;
        let schema = Schema::from_config(&config.schema)?;
        let registry = OperatorRegistry::from_config(&config.schema)?;

        Ok(Self::builder()
            .schema(schema)
            .registry(registry)
            .adapter(adapter)
            .limits(config.limits)
            .build())
    }

    pub fn adapter(&self) -> AdapterId {
        self.renderer.id()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn custom(&self) -> &CustomFilters {
        &self.custom
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn parse_context<'a>(&'a self, entity: &'a str) -> ParseContext<'a> {
        ParseContext::new(entity, self.schema.as_ref(), &self.registry, self.adapter())
            .with_custom(&self.custom)
            .with_limits(self.limits)
    }

    pub fn compile_context<'a>(&'a self, entity: &'a str) -> CompileContext<'a> {
        CompileContext::new(
            entity,
            self.schema.as_ref(),
            &self.registry,
            self.renderer.as_ref(),
        )
        .with_custom(&self.custom)
    }

    fn check_entity(&self, entity: &str) -> Result<(), ParseError> {
        if self.schema.contains_entity(entity) {
            Ok(())
        } else {
            Err(ParseError::UnknownEntity {
                entity: entity.to_string(),
            })
        }
    }

    /// Parse a filter document for `entity` under the bound adapter.
    pub fn parse_filter(&self, entity: &str, raw: &Value) -> Result<BoundFilter, ParseError> {
        self.check_entity(entity)?;
        let root = parse::parse_filter(raw, &self.parse_context(entity))?;
        Ok(BoundFilter {
            adapter: self.adapter(),
            entity: entity.to_string(),
            root,
        })
    }

    /// Parse a filter from JSON text, enforcing the input size limit.
    pub fn parse_filter_str(&self, entity: &str, json: &str) -> Result<BoundFilter, ParseError> {
        self.check_entity(entity)?;
        let root = parse::parse_filter_str(json, &self.parse_context(entity))?;
        Ok(BoundFilter {
            adapter: self.adapter(),
            entity: entity.to_string(),
            root,
        })
    }

    /// Compile a bound filter. Filters bound to another adapter are rejected.
    pub fn compile_filter(&self, filter: &BoundFilter) -> Result<NativePredicate, CompileError> {
        if filter.adapter != self.adapter() {
            return Err(CompileError::AdapterMismatch {
                expected: self.adapter().to_string(),
                found: filter.adapter.to_string(),
            });
        }
        compile::compile_filter(&filter.root, &self.compile_context(&filter.entity))
    }

    /// Parse and compile in one step.
    pub fn filter(&self, entity: &str, raw: &Value) -> Result<NativePredicate, QueryError> {
        let bound = self.parse_filter(entity, raw)?;
        Ok(self.compile_filter(&bound)?)
    }

    pub fn parse_order(&self, entity: &str, raw: &Value) -> Result<Vec<OrderSpec>, ParseError> {
        self.check_entity(entity)?;
        parse::parse_order(raw, &self.parse_context(entity))
    }

    pub fn compile_order(
        &self,
        entity: &str,
        specs: &[OrderSpec],
    ) -> Result<NativeSort, CompileError> {
        compile::compile_order(specs, &self.compile_context(entity))
    }

    /// Parse and compile an order expression in one step.
    pub fn order(&self, entity: &str, raw: &Value) -> Result<NativeSort, QueryError> {
        let specs = self.parse_order(entity, raw)?;
        Ok(self.compile_order(entity, &specs)?)
    }

    /// Generated inputs for `types` under the bound adapter.
    pub fn inputs_for<S: AsRef<str>>(&self, types: &[S]) -> GeneratedInputs {
        generate_inputs(
            types,
            &self.schema,
            &self.registry,
            self.adapter(),
            Some(self.custom.as_ref()),
        )
    }
}

impl std::fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterEngine")
            .field("adapter", &self.adapter())
            .field("limits", &self.limits)
            .field("custom", &self.custom)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FilterEngine`].
#[derive(Default)]
pub struct FilterEngineBuilder {
    schema: Option<Arc<Schema>>,
    registry: Option<Arc<OperatorRegistry>>,
    adapter: AdapterId,
    renderer: Option<Arc<dyn PredicateRenderer>>,
    custom: Option<Arc<CustomFilters>>,
    limits: Limits,
}

impl FilterEngineBuilder {
    pub fn schema(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn registry(mut self, registry: impl Into<Arc<OperatorRegistry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn adapter(mut self, adapter: AdapterId) -> Self {
        self.adapter = adapter;
        self
    }

    /// Use a custom renderer instead of the built-in one for the adapter.
    /// The engine's adapter becomes the renderer's id.
    pub fn renderer(mut self, renderer: Arc<dyn PredicateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn custom(mut self, custom: impl Into<Arc<CustomFilters>>) -> Self {
        self.custom = Some(custom.into());
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> FilterEngine {
        let renderer = self
            .renderer
            .unwrap_or_else(|| renderer_for(self.adapter));
        let engine = FilterEngine {
            schema: self.schema.unwrap_or_default(),
            registry: self.registry.unwrap_or_default(),
            renderer,
            custom: self.custom.unwrap_or_default(),
            limits: self.limits,
        };
        debug!(
            adapter = %engine.adapter(),
            entities = engine.schema.entities().count(),
            custom_filters = engine.custom.len(),
            "Filter engine ready"
        );
        engine
    }
}
