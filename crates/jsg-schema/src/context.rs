//! Per-run generation state and the depth-first type traversal.
//!
//! A [`SchemaGenerationContext`] owns the [`DefinitionRegistry`] of one run.
//! Traversing a type either records a reference to an already known
//! definition or builds a new one: a custom definition, an array definition,
//! a subtype composition, or an object definition with its properties. Use
//! sites only ever receive placeholders; the assembler decides afterwards
//! what becomes a named definition.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use jsg_core::{GeneratorOption, MemberKind, MemberScope, SubtypeComposition, TypeContext, TypeDescriptor, builtins};
use serde_json::{Map, Value};

use crate::attributes::{self, AllowedTypes};
use crate::config::SchemaGeneratorConfig;
use crate::custom::{CustomDefinition, CustomPropertyDefinition, ProviderId};
use crate::error::GeneratorError;
use crate::keyword::{SchemaKeyword, SchemaType};
use crate::registry::{self, DefinitionKey, DefinitionRegistry};

/// Mutable state of a single generation run, handed to custom definition
/// providers so they can create nested definitions or references.
pub struct SchemaGenerationContext {
    config: Arc<SchemaGeneratorConfig>,
    registry: DefinitionRegistry,
    main_type: Option<TypeDescriptor>,
    current_provider: Option<ProviderId>,
}

impl SchemaGenerationContext {
    pub(crate) fn new(config: Arc<SchemaGeneratorConfig>) -> Self {
        Self {
            config,
            registry: DefinitionRegistry::new(),
            main_type: None,
            current_provider: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SchemaGeneratorConfig {
        &self.config
    }

    pub(crate) fn shared_config(&self) -> Arc<SchemaGeneratorConfig> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn type_context(&self) -> &TypeContext {
        self.config.type_context()
    }

    /// Spelling of `keyword` in the configured dialect.
    #[must_use]
    pub fn keyword(&self, keyword: SchemaKeyword) -> &'static str {
        self.config.keyword(keyword)
    }

    /// Type the current run generates the schema for; `None` while
    /// collecting definitions for several types.
    #[must_use]
    pub const fn main_type(&self) -> Option<&TypeDescriptor> {
        self.main_type.as_ref()
    }

    /// Identity of the custom definition provider being consulted right now.
    /// Pass it to [`create_standard_definition`] to skip that provider.
    ///
    /// [`create_standard_definition`]: Self::create_standard_definition
    #[must_use]
    pub const fn current_provider(&self) -> Option<ProviderId> {
        self.current_provider
    }

    #[must_use]
    pub const fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Count a use of the definition stored under `key`, returning the
    /// placeholder for it.
    pub(crate) fn reference_definition(&mut self, key: &DefinitionKey) -> Option<Map<String, Value>> {
        let index = self.registry.index_of(key)?;
        Some(self.registry.record_reference(index, false))
    }

    // -----------------------------------------------------------------------
    // Entry points for providers
    // -----------------------------------------------------------------------

    /// Inline definition of `ty`, regardless of whether it is known already.
    ///
    /// # Errors
    ///
    /// Propagates type resolution and provider errors.
    pub fn create_definition(
        &mut self,
        ty: &TypeDescriptor,
    ) -> Result<Map<String, Value>, GeneratorError> {
        self.create_standard_definition(ty, None)
    }

    /// Inline definition of `ty`, consulting only the custom definition
    /// providers registered before `ignored`.
    ///
    /// # Errors
    ///
    /// Propagates type resolution and provider errors.
    pub fn create_standard_definition(
        &mut self,
        ty: &TypeDescriptor,
        ignored: Option<ProviderId>,
    ) -> Result<Map<String, Value>, GeneratorError> {
        let mut definition = Map::new();
        self.traverse(ty, None, Some(&mut definition), false, true, ignored)?;
        Ok(definition)
    }

    /// Reference to the shared definition of `ty`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Propagates type resolution and provider errors.
    pub fn create_definition_reference(
        &mut self,
        ty: &TypeDescriptor,
    ) -> Result<Map<String, Value>, GeneratorError> {
        self.create_standard_definition_reference(ty, None)
    }

    /// # Errors
    ///
    /// Propagates type resolution and provider errors.
    pub fn create_standard_definition_reference(
        &mut self,
        ty: &TypeDescriptor,
        ignored: Option<ProviderId>,
    ) -> Result<Map<String, Value>, GeneratorError> {
        let mut reference = Map::new();
        self.traverse(ty, None, Some(&mut reference), false, false, ignored)?;
        Ok(reference)
    }

    /// Allow `null` in addition to whatever `node` accepts.
    ///
    /// Nodes whose meaning depends on other keywords (`$ref`, compositions,
    /// `const`, `enum`) are wrapped in `anyOf: [{"type": "null"}, node]`;
    /// simple nodes get `"null"` added to their `type`.
    pub fn make_nullable(&self, node: &mut Map<String, Value>) {
        let null = SchemaType::Null.as_str();
        let wraps = [
            SchemaKeyword::Ref,
            SchemaKeyword::AllOf,
            SchemaKeyword::AnyOf,
            SchemaKeyword::OneOf,
            SchemaKeyword::Const,
            SchemaKeyword::Enum,
        ];
        if registry::is_placeholder(node)
            || wraps.iter().any(|keyword| node.contains_key(self.keyword(*keyword)))
        {
            let mut null_schema = Map::new();
            null_schema.insert(self.keyword(SchemaKeyword::Type).to_string(), Value::from(null));
            let original = std::mem::take(node);
            node.insert(
                self.keyword(SchemaKeyword::AnyOf).to_string(),
                Value::Array(vec![Value::Object(null_schema), Value::Object(original)]),
            );
            return;
        }
        let type_keyword = self.keyword(SchemaKeyword::Type);
        match node.get_mut(type_keyword) {
            Some(Value::Array(types)) => {
                if !types.iter().any(|ty| ty.as_str() == Some(null)) {
                    types.push(Value::from(null));
                }
            }
            Some(Value::String(single)) if single.as_str() != null => {
                let single = std::mem::take(single);
                let types = vec![Value::String(single), Value::from(null)];
                node.insert(type_keyword.to_string(), Value::Array(types));
            }
            // without a "type", null is allowed already
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Run entry points
    // -----------------------------------------------------------------------

    /// Traverse the main type of a run; its definition is always stored in
    /// the registry.
    pub(crate) fn parse_main_type(
        &mut self,
        ty: &TypeDescriptor,
    ) -> Result<DefinitionKey, GeneratorError> {
        self.main_type = Some(ty.clone());
        self.traverse(ty, None, None, false, false, None)?;
        Ok(DefinitionKey::new(ty.clone(), None))
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    /// Produce the schema for `ty`.
    ///
    /// With a `target`, the target either receives a placeholder for the
    /// shared definition or, for inlined containers and forced inline
    /// definitions, the definition itself. Without one, the definition is only
    /// stored in the registry. `member` is the member site `ty` is used at,
    /// if any; its item annotations flow into container items.
    pub(crate) fn traverse(
        &mut self,
        ty: &TypeDescriptor,
        member: Option<&MemberScope>,
        mut target: Option<&mut Map<String, Value>>,
        nullable: bool,
        force_inline: bool,
        ignored: Option<ProviderId>,
    ) -> Result<(), GeneratorError> {
        let key = DefinitionKey::new(ty.clone(), ignored);
        if !force_inline {
            if let Some(index) = self.registry.index_of(&key) {
                tracing::trace!(r#type = %ty, nullable, "referencing known definition");
                if let Some(target) = target {
                    target.extend(self.registry.record_reference(index, nullable));
                }
                return Ok(());
            }
        }

        let custom = self.custom_definition(ty, ignored)?;
        let mut include_type_attributes = true;
        let mut registered = None;
        let mut definition;

        match custom {
            Some(custom) if custom.is_inline() || force_inline => {
                tracing::debug!(r#type = %ty, "applying inline custom definition");
                include_type_attributes = custom.should_include_attributes();
                match target.as_deref_mut() {
                    Some(target) => {
                        definition = std::mem::take(target);
                        definition.extend(custom.into_value());
                    }
                    None => {
                        definition = custom.into_value();
                        registered = Some(self.registry.insert_in_progress(key));
                    }
                }
                if nullable {
                    self.make_nullable(&mut definition);
                }
            }
            custom => {
                let is_container = self.type_context().is_container_type(ty)?;
                let into_target =
                    force_inline || (is_container && target.is_some() && custom.is_none());
                match target.as_deref_mut() {
                    Some(target) if into_target => {
                        definition = std::mem::take(target);
                    }
                    target => {
                        let index = self.registry.insert_in_progress(key);
                        tracing::debug!(r#type = %ty, index, "registering definition");
                        if custom
                            .as_ref()
                            .is_some_and(CustomDefinition::should_always_produce_definition)
                        {
                            self.registry.mark_always_ref(index);
                        }
                        if let Some(target) = target {
                            target.extend(self.registry.record_reference(index, nullable));
                        }
                        registered = Some(index);
                        definition = Map::new();
                    }
                }

                if let Some(custom) = custom {
                    include_type_attributes = custom.should_include_attributes();
                    definition.extend(custom.into_value());
                } else if is_container {
                    self.generate_array_definition(ty, member, &mut definition, nullable)?;
                } else if self.add_subtype_references(ty, &mut definition)? {
                    include_type_attributes = false;
                } else {
                    self.generate_object_definition(ty, &mut definition)?;
                }
            }
        }

        let scope = self.type_context().type_scope(ty);
        if include_type_attributes {
            let allowed = AllowedTypes::of(&definition, self.config.version());
            let type_attributes = attributes::collect_type_attributes(&scope, self, &allowed)?;
            attributes::merge_missing(&mut definition, type_attributes);
        }
        let config = self.shared_config();
        for attribute_override in &config.general().type_attribute_overrides {
            attribute_override(&mut definition, &scope, &*self);
        }

        match (registered, target) {
            (Some(index), _) => self.registry.complete(index, definition),
            (None, Some(target)) => *target = definition,
            (None, None) => {}
        }
        Ok(())
    }

    fn generate_array_definition(
        &mut self,
        ty: &TypeDescriptor,
        member: Option<&MemberScope>,
        definition: &mut Map<String, Value>,
        nullable: bool,
    ) -> Result<(), GeneratorError> {
        let array = Value::from(SchemaType::Array.as_str());
        let schema_type = if nullable {
            Value::Array(vec![array, Value::from(SchemaType::Null.as_str())])
        } else {
            array
        };
        definition.insert(self.keyword(SchemaKeyword::Type).to_string(), schema_type);

        let item_scope = match member.filter(|member| !member.is_fake_container_item_scope()) {
            Some(member) => member.as_fake_container_item_scope()?,
            None => None,
        };
        let items = match item_scope {
            Some(item) => self.populate_member_schema(&item)?,
            None => {
                let item_type = self
                    .type_context()
                    .container_item_type(ty)?
                    .unwrap_or_else(|| TypeDescriptor::simple(builtins::OBJECT));
                let mut items = Map::new();
                self.traverse(&item_type, None, Some(&mut items), false, false, None)?;
                items
            }
        };
        definition.insert(
            self.keyword(SchemaKeyword::Items).to_string(),
            Value::Object(items),
        );
        Ok(())
    }

    /// Returns whether subtypes were found and referenced.
    fn add_subtype_references(
        &mut self,
        ty: &TypeDescriptor,
        definition: &mut Map<String, Value>,
    ) -> Result<bool, GeneratorError> {
        let Some(subtypes) = self.resolve_subtypes(ty)? else {
            return Ok(false);
        };
        let keyword = if subtypes.len() == 1 {
            SchemaKeyword::AllOf
        } else {
            match self.config.subtype_composition() {
                SubtypeComposition::AnyOf => SchemaKeyword::AnyOf,
                SubtypeComposition::OneOf => SchemaKeyword::OneOf,
            }
        };
        let mut branches = Vec::with_capacity(subtypes.len());
        for subtype in &subtypes {
            let mut branch = Map::new();
            self.traverse(subtype, None, Some(&mut branch), false, false, None)?;
            branches.push(Value::Object(branch));
        }
        definition.insert(self.keyword(keyword).to_string(), Value::Array(branches));
        Ok(true)
    }

    fn generate_object_definition(
        &mut self,
        ty: &TypeDescriptor,
        definition: &mut Map<String, Value>,
    ) -> Result<(), GeneratorError> {
        definition.insert(
            self.keyword(SchemaKeyword::Type).to_string(),
            Value::from(SchemaType::Object.as_str()),
        );

        let (properties, required) = self.collect_object_properties(ty)?;
        if properties.is_empty() {
            return Ok(());
        }
        let mut sorted: Vec<MemberScope> = properties.into_values().collect();
        sorted.sort_by(|a, b| {
            a.is_method()
                .cmp(&b.is_method())
                .then_with(|| a.schema_property_name().cmp(&b.schema_property_name()))
        });

        let mut property_nodes = Map::new();
        for property in &sorted {
            let schema = self.populate_member_schema(property)?;
            property_nodes.insert(property.schema_property_name(), Value::Object(schema));
        }
        definition.insert(
            self.keyword(SchemaKeyword::Properties).to_string(),
            Value::Object(property_nodes),
        );

        let required_nodes: Vec<Value> = sorted
            .iter()
            .map(MemberScope::schema_property_name)
            .filter(|name| required.contains(name))
            .map(Value::String)
            .collect();
        if !required_nodes.is_empty() {
            definition.insert(
                self.keyword(SchemaKeyword::Required).to_string(),
                Value::Array(required_nodes),
            );
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Members
    // -----------------------------------------------------------------------

    fn collect_object_properties(
        &self,
        ty: &TypeDescriptor,
    ) -> Result<(IndexMap<String, MemberScope>, HashSet<String>), GeneratorError> {
        tracing::debug!(r#type = %ty, "collecting fields and methods");
        let mut collected = IndexMap::new();
        let mut required = HashSet::new();

        let include_static_fields = self.config.is_enabled(GeneratorOption::StaticFields);
        for field in self.type_context().fields_of(ty)? {
            if field.is_static() && !include_static_fields {
                continue;
            }
            self.collect_member(field, &mut collected, &mut required);
        }
        if self.config.is_enabled(GeneratorOption::NonStaticNonVoidMethods) {
            for method in self.type_context().methods_of(ty)? {
                if method.is_static() || method.is_void() {
                    continue;
                }
                self.collect_member(method, &mut collected, &mut required);
            }
        }
        Ok((collected, required))
    }

    /// First member per property name wins; required checks still apply to
    /// the members it hides.
    fn collect_member(
        &self,
        member: MemberScope,
        collected: &mut IndexMap<String, MemberScope>,
        required: &mut HashSet<String>,
    ) {
        let part = self.config.member_part(&member);
        if part.ignore.matches(&member) {
            return;
        }
        let is_required = part.required.matches(&member);
        let member = match part.property_name_override.resolve(&member) {
            Some(name) => member.with_overridden_name(name),
            None => member,
        };
        let name = member.schema_property_name();
        if is_required {
            required.insert(name.clone());
        }
        if collected.contains_key(&name) {
            tracing::debug!(
                declaring = %member.declaring_type(),
                member = member.declared_name(),
                "ignoring hidden member"
            );
            return;
        }
        collected.insert(name, member);
    }

    /// Schema of one property, fanned out into `anyOf` when target type
    /// overrides or subtypes apply.
    pub(crate) fn populate_member_schema(
        &mut self,
        member: &MemberScope,
    ) -> Result<Map<String, Value>, GeneratorError> {
        let config = self.shared_config();
        let overrides = match config.member_part(member).target_type_overrides.resolve(member) {
            Some(types) => Some(types),
            None => self.resolve_subtypes(member.member_type())?,
        };
        let options: Vec<MemberScope> = match overrides {
            Some(types) if !types.is_empty() => types
                .into_iter()
                .map(|ty| member.with_overridden_type(ty))
                .collect(),
            _ => vec![member.clone()],
        };

        // nullability follows the declared type, not the overrides
        let nullable = self.is_nullable(member);
        if let [single] = options.as_slice() {
            return self.create_member_schema(single, nullable);
        }

        let mut branches = Vec::with_capacity(options.len() + 1);
        if nullable {
            branches.push(Value::Object(self.null_schema()));
        }
        for option in &options {
            branches.push(Value::Object(self.create_member_schema(option, false)?));
        }
        let mut node = Map::new();
        node.insert(
            self.keyword(SchemaKeyword::AnyOf).to_string(),
            Value::Array(branches),
        );
        Ok(node)
    }

    fn is_nullable(&self, member: &MemberScope) -> bool {
        if member.is_fake_container_item_scope()
            && !self.config.is_enabled(GeneratorOption::NullableArrayItemsAllowed)
        {
            return false;
        }
        let by_default = match member.kind() {
            MemberKind::Field => GeneratorOption::NullableFieldsByDefault,
            MemberKind::Method => GeneratorOption::NullableMethodReturnValuesByDefault,
        };
        self.config
            .member_part(member)
            .nullable
            .resolve(member)
            .unwrap_or_else(|| {
                !member.is_fake_container_item_scope() && self.config.is_enabled(by_default)
            })
    }

    fn create_member_schema(
        &mut self,
        member: &MemberScope,
        nullable: bool,
    ) -> Result<Map<String, Value>, GeneratorError> {
        let member_attributes = attributes::collect_member_attributes(member, self)?;
        let mut node = Map::new();

        if let Some(custom) = self.custom_property_definition(member)? {
            tracing::debug!(member = %member.name(), "applying custom property definition");
            let include_attributes = custom.should_include_attributes();
            node.extend(custom.into_value());
            if include_attributes {
                attributes::merge_missing(&mut node, member_attributes);
                let allowed = AllowedTypes::of(&node, self.config.version());
                let type_attributes =
                    attributes::collect_type_attributes(&member.type_scope(), self, &allowed)?;
                attributes::merge_missing(&mut node, type_attributes);
            }
            if nullable {
                self.make_nullable(&mut node);
            }
            return Ok(node);
        }

        let ty = member.member_type().clone();
        if member_attributes.is_empty() {
            self.traverse(&ty, Some(member), Some(&mut node), nullable, false, None)?;
        } else if self.type_context().is_container_type(&ty)? {
            node = member_attributes;
            self.traverse(&ty, Some(member), Some(&mut node), nullable, false, None)?;
        } else {
            // keep member attributes apart from a potential reference
            let mut reference = Map::new();
            self.traverse(&ty, Some(member), Some(&mut reference), nullable, false, None)?;
            node.insert(
                self.keyword(SchemaKeyword::AllOf).to_string(),
                Value::Array(vec![Value::Object(reference), Value::Object(member_attributes)]),
            );
        }
        Ok(node)
    }

    fn null_schema(&self) -> Map<String, Value> {
        let mut node = Map::new();
        node.insert(
            self.keyword(SchemaKeyword::Type).to_string(),
            Value::from(SchemaType::Null.as_str()),
        );
        node
    }

    // -----------------------------------------------------------------------
    // Providers and resolvers
    // -----------------------------------------------------------------------

    fn custom_definition(
        &mut self,
        ty: &TypeDescriptor,
        ignored: Option<ProviderId>,
    ) -> Result<Option<CustomDefinition>, GeneratorError> {
        let config = self.shared_config();
        let skip = ignored.map_or(0, |ProviderId(index)| index + 1);
        let providers = &config.general().custom_definition_providers;
        for (index, provider) in providers.iter().enumerate().skip(skip) {
            let previous = self.current_provider.replace(ProviderId(index));
            let outcome = provider.provide_custom_schema_definition(ty, self);
            self.current_provider = previous;
            if let Some(definition) = outcome.map_err(provider_error)? {
                return Ok(Some(definition));
            }
        }
        Ok(None)
    }

    fn custom_property_definition(
        &mut self,
        member: &MemberScope,
    ) -> Result<Option<CustomPropertyDefinition>, GeneratorError> {
        let config = self.shared_config();
        for provider in &config.member_part(member).custom_definition_providers {
            let outcome = provider.provide_custom_property_definition(member, self);
            if let Some(definition) = outcome.map_err(provider_error)? {
                return Ok(Some(definition));
            }
        }
        Ok(None)
    }

    /// First non-empty answer of the subtype resolvers.
    pub(crate) fn resolve_subtypes(
        &self,
        ty: &TypeDescriptor,
    ) -> Result<Option<Vec<TypeDescriptor>>, GeneratorError> {
        for resolver in &self.config.general().subtype_resolvers {
            match resolver.find_subtypes(ty, self).map_err(provider_error)? {
                Some(subtypes) if !subtypes.is_empty() => return Ok(Some(subtypes)),
                _ => {}
            }
        }
        Ok(None)
    }
}

/// Errors raised by the engine inside a provider come back unchanged.
fn provider_error(error: anyhow::Error) -> GeneratorError {
    match error.downcast::<GeneratorError>() {
        Ok(error) => error,
        Err(error) => GeneratorError::Provider(error),
    }
}

impl std::fmt::Debug for SchemaGenerationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaGenerationContext")
            .field("main_type", &self.main_type)
            .field("definitions", &self.registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsg_core::{
        FieldDeclaration, OptionPreset, SchemaVersion, TypeDeclaration, TypeRef, TypeUniverse,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::config::SchemaGeneratorConfigBuilder;

    fn context() -> SchemaGenerationContext {
        let types = TypeContext::new(TypeUniverse::new());
        let config =
            SchemaGeneratorConfigBuilder::new(types, SchemaVersion::Draft2020_12, OptionPreset::Plain)
                .build();
        SchemaGenerationContext::new(Arc::new(config))
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn nullable_simple_type_gains_null() {
        let ctx = context();
        let mut node = object(json!({"type": "string", "minLength": 1}));
        ctx.make_nullable(&mut node);
        assert_eq!(Value::Object(node), json!({"type": ["string", "null"], "minLength": 1}));

        let mut node = object(json!({"type": ["integer", "null"]}));
        ctx.make_nullable(&mut node);
        assert_eq!(Value::Object(node), json!({"type": ["integer", "null"]}));

        let mut node = object(json!({"title": "untyped"}));
        ctx.make_nullable(&mut node);
        assert_eq!(Value::Object(node), json!({"title": "untyped"}));
    }

    #[test]
    fn nullable_composite_is_wrapped() {
        let ctx = context();
        let mut node = object(json!({"enum": ["A", "B"], "type": "string"}));
        ctx.make_nullable(&mut node);
        assert_eq!(
            Value::Object(node),
            json!({"anyOf": [{"type": "null"}, {"enum": ["A", "B"], "type": "string"}]})
        );
    }

    #[test]
    fn repeated_references_share_one_entry() {
        let mut universe = TypeUniverse::new();
        universe
            .declare(
                TypeDeclaration::class("acme.Node")
                    .field(FieldDeclaration::new("next", TypeRef::named("acme.Node"))),
            )
            .unwrap();
        let types = TypeContext::new(universe);
        let config =
            SchemaGeneratorConfigBuilder::new(types, SchemaVersion::Draft2020_12, OptionPreset::Plain)
                .build();
        let mut ctx = SchemaGenerationContext::new(Arc::new(config));

        let node = ctx.type_context().parse("acme.Node").unwrap();
        let first = ctx.create_definition_reference(&node).unwrap();
        let second = ctx.create_definition_reference(&node).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.registry().len(), 1);

        let (_, entry) = ctx.registry().entry(0).unwrap();
        // the self-reference through "next" plus both explicit references
        assert_eq!(entry.references, 3);
        assert_eq!(entry.schema["type"], json!("object"));
    }

    #[test]
    fn simple_types_are_inlined_without_registration() {
        let mut ctx = context();
        let string = ctx.type_context().parse("String").unwrap();
        let inline = ctx.create_definition_reference(&string).unwrap();
        assert_eq!(Value::Object(inline), json!({"type": "string"}));
        assert!(ctx.registry().is_empty());
    }
}
