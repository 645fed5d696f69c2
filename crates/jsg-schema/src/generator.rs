//! Entry points: [`SchemaGenerator`] for one schema per type and
//! [`MultiTypeSchemaBuilder`] for a shared set of definitions.

use std::sync::Arc;

use jsg_core::{GeneratorOption, TypeDescriptor, TypeRef};
use serde_json::{Map, Value};

use crate::assembler::DefinitionAssembler;
use crate::cleanup;
use crate::config::SchemaGeneratorConfig;
use crate::context::SchemaGenerationContext;
use crate::error::GeneratorError;
use crate::keyword::SchemaKeyword;

// ---------------------------------------------------------------------------
// SchemaGenerator
// ---------------------------------------------------------------------------

/// Generates JSON Schema documents with a frozen configuration.
///
/// A generator may serve any number of sequential runs. Each run gets a
/// fresh [`SchemaGenerationContext`]; stateful providers are reset before
/// and after every run.
#[derive(Debug, Clone)]
pub struct SchemaGenerator {
    config: Arc<SchemaGeneratorConfig>,
}

impl SchemaGenerator {
    #[must_use]
    pub fn new(config: SchemaGeneratorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SchemaGeneratorConfig {
        &self.config
    }

    /// Generate the schema for a type reference such as
    /// `"com.acme.Page<com.acme.Item>"`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Type`] if the reference does not resolve to
    /// a closed type, and any error raised while generating.
    pub fn generate_schema(&self, reference: &TypeRef) -> Result<Value, GeneratorError> {
        let ty = self.config.type_context().resolve_closed(reference)?;
        self.generate_schema_for(&ty)
    }

    /// Generate the schema for an already resolved type.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by type resolution, a custom provider,
    /// a subtype resolver or definition naming. No partial document is
    /// returned.
    pub fn generate_schema_for(&self, ty: &TypeDescriptor) -> Result<Value, GeneratorError> {
        tracing::debug!(r#type = %ty, version = %self.config.version(), "generating schema");
        self.config.reset_providers();
        let result = self.run(ty);
        self.config.reset_providers();
        tracing::debug!(r#type = %ty, "providers reset after run");
        result.map(Value::Object)
    }

    fn run(&self, ty: &TypeDescriptor) -> Result<Map<String, Value>, GeneratorError> {
        let config = &*self.config;
        let mut context = SchemaGenerationContext::new(Arc::clone(&self.config));
        let main_key = context.parse_main_type(ty)?;

        let mut root = Map::new();
        if config.is_enabled(GeneratorOption::SchemaVersionIndicator) {
            root.insert(
                config.keyword(SchemaKeyword::Schema).to_string(),
                Value::from(config.version().identifier()),
            );
        }
        let definition_for_main = config.is_enabled(GeneratorOption::DefinitionForMainSchema);
        let main_reference = if definition_for_main {
            context.reference_definition(&main_key)
        } else {
            None
        };

        let definitions_keyword = config.keyword(SchemaKeyword::Definitions);
        let mut assembler = DefinitionAssembler::new(&context, Some(&main_key), definitions_keyword)?;
        let definitions = assembler.take_definitions()?;

        if let Some(mut reference) = main_reference {
            assembler.resolve(&mut reference)?;
            root.extend(reference);
        }
        if !definitions.is_empty() {
            root.insert(definitions_keyword.to_string(), Value::Object(definitions));
        }
        if !definition_for_main {
            root.extend(assembler.resolved_definition(&main_key)?);
        }

        cleanup::clean_up(&mut root, config);
        Ok(root)
    }

    /// Start collecting definitions for several types into one container.
    #[must_use]
    pub fn multi_type_builder(&self) -> MultiTypeSchemaBuilder {
        MultiTypeSchemaBuilder::new(Arc::clone(&self.config))
    }
}

// ---------------------------------------------------------------------------
// MultiTypeSchemaBuilder
// ---------------------------------------------------------------------------

/// Handle to a reference created by
/// [`MultiTypeSchemaBuilder::create_schema_reference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaReference(usize);

/// Definitions shared by several types, e.g. for an API description that
/// keeps its schemas under `components/schemas`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedDefinitions {
    definitions: Map<String, Value>,
    references: Vec<Value>,
}

impl CollectedDefinitions {
    /// Named definitions; their `$ref`s point into the designated path.
    #[must_use]
    pub const fn definitions(&self) -> &Map<String, Value> {
        &self.definitions
    }

    /// The resolved schema for a reference handed out by the builder.
    #[must_use]
    pub fn reference(&self, reference: SchemaReference) -> Option<&Value> {
        self.references.get(reference.0)
    }

    #[must_use]
    pub fn into_parts(self) -> (Map<String, Value>, Vec<Value>) {
        (self.definitions, self.references)
    }
}

/// Collects definitions for several types in one run.
///
/// Call [`create_schema_reference`](Self::create_schema_reference) for every
/// type, then [`collect_definitions`](Self::collect_definitions) once.
#[derive(Debug)]
pub struct MultiTypeSchemaBuilder {
    context: SchemaGenerationContext,
    references: Vec<Map<String, Value>>,
}

impl MultiTypeSchemaBuilder {
    fn new(config: Arc<SchemaGeneratorConfig>) -> Self {
        config.reset_providers();
        Self {
            context: SchemaGenerationContext::new(config),
            references: Vec::new(),
        }
    }

    /// Register `ty` and return a handle to the schema that refers to it.
    ///
    /// # Errors
    ///
    /// Returns any error raised while traversing `ty`.
    pub fn create_schema_reference(
        &mut self,
        ty: &TypeDescriptor,
    ) -> Result<SchemaReference, GeneratorError> {
        let node = self.context.create_definition_reference(ty)?;
        self.references.push(node);
        tracing::debug!(r#type = %ty, "schema reference created");
        Ok(SchemaReference(self.references.len() - 1))
    }

    /// Name and place all definitions under `#/<path>/`, resolving the
    /// references created so far.
    ///
    /// # Errors
    ///
    /// Fails when definition names cannot be made unique or an inlined
    /// definition contains itself.
    pub fn collect_definitions(self, path: &str) -> Result<CollectedDefinitions, GeneratorError> {
        let config = self.context.shared_config();
        let result = Self::assemble(&self.context, self.references, path, &config);
        config.reset_providers();
        result
    }

    fn assemble(
        context: &SchemaGenerationContext,
        references: Vec<Map<String, Value>>,
        path: &str,
        config: &SchemaGeneratorConfig,
    ) -> Result<CollectedDefinitions, GeneratorError> {
        let mut assembler = DefinitionAssembler::new(context, None, path)?;
        let mut definitions = assembler.take_definitions()?;
        for definition in definitions.values_mut() {
            if let Value::Object(definition) = definition {
                cleanup::clean_up(definition, config);
            }
        }
        let mut resolved = Vec::with_capacity(references.len());
        for mut reference in references {
            assembler.resolve(&mut reference)?;
            cleanup::clean_up(&mut reference, config);
            resolved.push(Value::Object(reference));
        }
        Ok(CollectedDefinitions {
            definitions,
            references: resolved,
        })
    }
}
