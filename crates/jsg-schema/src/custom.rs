//! Custom definitions supplied by providers instead of the default traversal.

use std::fmt;

use jsg_core::{MemberScope, TypeDescriptor};
use serde_json::{Map, Value};

use crate::context::SchemaGenerationContext;

/// How a custom definition is placed in the generated document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DefinitionType {
    /// Treated like any generated definition: named when referenced often
    /// enough, inlined otherwise.
    #[default]
    Standard,
    /// Always embedded at the use site, never named.
    Inline,
    /// Always emitted as a named definition, even when referenced once.
    AlwaysRef,
}

/// Whether configured attributes are merged over a custom definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AttributeInclusion {
    #[default]
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomDefinition {
    value: Map<String, Value>,
    definition_type: DefinitionType,
    attribute_inclusion: AttributeInclusion,
}

impl CustomDefinition {
    #[must_use]
    pub fn new(value: Map<String, Value>) -> Self {
        Self {
            value,
            definition_type: DefinitionType::Standard,
            attribute_inclusion: AttributeInclusion::Yes,
        }
    }

    #[must_use]
    pub fn inline(value: Map<String, Value>) -> Self {
        Self::new(value).with_definition_type(DefinitionType::Inline)
    }

    #[must_use]
    pub fn always_ref(value: Map<String, Value>) -> Self {
        Self::new(value).with_definition_type(DefinitionType::AlwaysRef)
    }

    #[must_use]
    pub fn with_definition_type(mut self, definition_type: DefinitionType) -> Self {
        self.definition_type = definition_type;
        self
    }

    #[must_use]
    pub fn with_attribute_inclusion(mut self, attribute_inclusion: AttributeInclusion) -> Self {
        self.attribute_inclusion = attribute_inclusion;
        self
    }

    #[must_use]
    pub const fn value(&self) -> &Map<String, Value> {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> Map<String, Value> {
        self.value
    }

    #[must_use]
    pub const fn definition_type(&self) -> DefinitionType {
        self.definition_type
    }

    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.definition_type == DefinitionType::Inline
    }

    #[must_use]
    pub fn should_always_produce_definition(&self) -> bool {
        self.definition_type == DefinitionType::AlwaysRef
    }

    #[must_use]
    pub fn should_include_attributes(&self) -> bool {
        self.attribute_inclusion == AttributeInclusion::Yes
    }
}

/// Member-level custom definition; always embedded in the property.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomPropertyDefinition {
    value: Map<String, Value>,
    attribute_inclusion: AttributeInclusion,
}

impl CustomPropertyDefinition {
    #[must_use]
    pub const fn new(value: Map<String, Value>) -> Self {
        Self {
            value,
            attribute_inclusion: AttributeInclusion::Yes,
        }
    }

    #[must_use]
    pub fn with_attribute_inclusion(mut self, attribute_inclusion: AttributeInclusion) -> Self {
        self.attribute_inclusion = attribute_inclusion;
        self
    }

    #[must_use]
    pub const fn value(&self) -> &Map<String, Value> {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> Map<String, Value> {
        self.value
    }

    #[must_use]
    pub fn should_include_attributes(&self) -> bool {
        self.attribute_inclusion == AttributeInclusion::Yes
    }
}

/// Position of a custom definition provider in the frozen configuration.
///
/// Used to request the "standard" definition of a type, bypassing the
/// provider with this id and every provider ranked above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(pub(crate) usize);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Provider traits
// ---------------------------------------------------------------------------

/// Supplies replacement definitions for types.
pub trait CustomDefinitionProvider: Send + Sync {
    /// `Ok(None)` lets the next provider, or the default traversal, handle `ty`.
    ///
    /// # Errors
    ///
    /// Any error aborts the generation run unchanged.
    fn provide_custom_schema_definition(
        &self,
        ty: &TypeDescriptor,
        context: &mut SchemaGenerationContext,
    ) -> anyhow::Result<Option<CustomDefinition>>;

    /// Invoked at the start of every run and again after assembly.
    fn reset_for_new_run(&self) {}
}

/// Supplies replacement definitions for individual fields or methods.
pub trait CustomPropertyDefinitionProvider: Send + Sync {
    /// # Errors
    ///
    /// Any error aborts the generation run unchanged.
    fn provide_custom_property_definition(
        &self,
        member: &MemberScope,
        context: &mut SchemaGenerationContext,
    ) -> anyhow::Result<Option<CustomPropertyDefinition>>;

    fn reset_for_new_run(&self) {}
}

pub(crate) struct FnDefinitionProvider<F>(pub(crate) F);

impl<F> CustomDefinitionProvider for FnDefinitionProvider<F>
where
    F: Fn(&TypeDescriptor, &mut SchemaGenerationContext) -> anyhow::Result<Option<CustomDefinition>>
        + Send
        + Sync,
{
    fn provide_custom_schema_definition(
        &self,
        ty: &TypeDescriptor,
        context: &mut SchemaGenerationContext,
    ) -> anyhow::Result<Option<CustomDefinition>> {
        (self.0)(ty, context)
    }
}

pub(crate) struct FnPropertyDefinitionProvider<F>(pub(crate) F);

impl<F> CustomPropertyDefinitionProvider for FnPropertyDefinitionProvider<F>
where
    F: Fn(&MemberScope, &mut SchemaGenerationContext) -> anyhow::Result<Option<CustomPropertyDefinition>>
        + Send
        + Sync,
{
    fn provide_custom_property_definition(
        &self,
        member: &MemberScope,
        context: &mut SchemaGenerationContext,
    ) -> anyhow::Result<Option<CustomPropertyDefinition>> {
        (self.0)(member, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn constructors_set_definition_type() {
        let schema = object(json!({"type": "string"}));
        assert_eq!(
            CustomDefinition::new(schema.clone()).definition_type(),
            DefinitionType::Standard
        );
        assert!(CustomDefinition::inline(schema.clone()).is_inline());
        assert!(CustomDefinition::always_ref(schema.clone()).should_always_produce_definition());

        let replaced =
            CustomDefinition::new(schema).with_attribute_inclusion(AttributeInclusion::No);
        assert!(!replaced.should_include_attributes());
        assert_eq!(replaced.value().get("type"), Some(&json!("string")));
    }
}
