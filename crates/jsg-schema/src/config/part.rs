//! Attribute resolvers grouped by the scope they apply to.
//!
//! [`ConfigPart`] holds the chains shared by types and members;
//! [`MemberConfigPart`] (fields, methods) and [`GeneralConfigPart`] (types in
//! general) add the chains only meaningful for their scope.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use indexmap::IndexMap;
use jsg_core::{MemberScope, TypeDescriptor, TypeScope};
use serde_json::{Map, Number, Value};

use crate::config::chain::ResolverChain;
use crate::context::SchemaGenerationContext;
use crate::custom::{
    CustomDefinition, CustomDefinitionProvider, CustomPropertyDefinition,
    CustomPropertyDefinitionProvider, FnDefinitionProvider, FnPropertyDefinitionProvider,
};
use crate::naming::DefinitionNamingStrategy;
use crate::subtypes::{FnSubtypeResolver, SubtypeResolver};

/// Resolved value of the `additionalProperties` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdditionalProperties {
    /// Anything is allowed; the keyword is omitted.
    Any,
    /// `additionalProperties: false`.
    Forbidden,
    /// Additional properties must match the schema of this type.
    Type(TypeDescriptor),
}

pub(crate) type InstanceAttributeOverride =
    Arc<dyn Fn(&mut Map<String, Value>, &MemberScope, &SchemaGenerationContext) + Send + Sync>;

pub(crate) type TypeAttributeOverride =
    Arc<dyn Fn(&mut Map<String, Value>, &TypeScope, &SchemaGenerationContext) + Send + Sync>;

macro_rules! resolver_setters {
    ($scope:ty; $( $(#[$doc:meta])* $method:ident => $field:ident : $value:ty ),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $method<F>(&mut self, resolver: F) -> &mut Self
            where
                F: Fn(&$scope) -> Option<$value> + Send + Sync + 'static,
            {
                self.$field.register(resolver);
                self
            }
        )*
    };
}

macro_rules! check_setters {
    ($scope:ty; $( $(#[$doc:meta])* $method:ident => $field:ident ),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $method<F>(&mut self, check: F) -> &mut Self
            where
                F: Fn(&$scope) -> bool + Send + Sync + 'static,
            {
                self.$field.register_check(check);
                self
            }
        )*
    };
}

// ---------------------------------------------------------------------------
// ConfigPart
// ---------------------------------------------------------------------------

/// Attribute chains shared by type and member scopes.
#[derive(Debug)]
pub struct ConfigPart<S> {
    pub(crate) title: ResolverChain<S, String>,
    pub(crate) description: ResolverChain<S, String>,
    pub(crate) default_value: ResolverChain<S, Value>,
    pub(crate) enum_values: ResolverChain<S, Vec<Value>>,
    pub(crate) additional_properties: ResolverChain<S, AdditionalProperties>,
    pub(crate) pattern_properties: ResolverChain<S, IndexMap<String, TypeDescriptor>>,
    pub(crate) string_min_length: ResolverChain<S, u64>,
    pub(crate) string_max_length: ResolverChain<S, u64>,
    pub(crate) string_format: ResolverChain<S, String>,
    pub(crate) string_pattern: ResolverChain<S, String>,
    pub(crate) number_inclusive_minimum: ResolverChain<S, Number>,
    pub(crate) number_exclusive_minimum: ResolverChain<S, Number>,
    pub(crate) number_inclusive_maximum: ResolverChain<S, Number>,
    pub(crate) number_exclusive_maximum: ResolverChain<S, Number>,
    pub(crate) number_multiple_of: ResolverChain<S, Number>,
    pub(crate) array_min_items: ResolverChain<S, u64>,
    pub(crate) array_max_items: ResolverChain<S, u64>,
    pub(crate) array_unique_items: ResolverChain<S, bool>,
}

impl<S> ConfigPart<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: ResolverChain::new(),
            description: ResolverChain::new(),
            default_value: ResolverChain::new(),
            enum_values: ResolverChain::new(),
            additional_properties: ResolverChain::new(),
            pattern_properties: ResolverChain::new(),
            string_min_length: ResolverChain::new(),
            string_max_length: ResolverChain::new(),
            string_format: ResolverChain::new(),
            string_pattern: ResolverChain::new(),
            number_inclusive_minimum: ResolverChain::new(),
            number_exclusive_minimum: ResolverChain::new(),
            number_inclusive_maximum: ResolverChain::new(),
            number_exclusive_maximum: ResolverChain::new(),
            number_multiple_of: ResolverChain::new(),
            array_min_items: ResolverChain::new(),
            array_max_items: ResolverChain::new(),
            array_unique_items: ResolverChain::new(),
        }
    }

    resolver_setters! { S;
        with_title_resolver => title: String,
        with_description_resolver => description: String,
        with_default_resolver => default_value: Value,
        /// A single value becomes `const` unless `EnumKeywordForSingleValues`
        /// is enabled.
        with_enum_resolver => enum_values: Vec<Value>,
        with_additional_properties_resolver => additional_properties: AdditionalProperties,
        /// Pattern → type of the properties whose names match it.
        with_pattern_properties_resolver => pattern_properties: IndexMap<String, TypeDescriptor>,
        with_string_min_length_resolver => string_min_length: u64,
        with_string_max_length_resolver => string_max_length: u64,
        with_string_format_resolver => string_format: String,
        with_string_pattern_resolver => string_pattern: String,
        with_number_inclusive_minimum_resolver => number_inclusive_minimum: Number,
        with_number_exclusive_minimum_resolver => number_exclusive_minimum: Number,
        with_number_inclusive_maximum_resolver => number_inclusive_maximum: Number,
        with_number_exclusive_maximum_resolver => number_exclusive_maximum: Number,
        with_number_multiple_of_resolver => number_multiple_of: Number,
        with_array_min_items_resolver => array_min_items: u64,
        with_array_max_items_resolver => array_max_items: u64,
        with_array_unique_items_resolver => array_unique_items: bool,
    }

    fn append(&mut self, lower: &Self) {
        self.title.append(&lower.title);
        self.description.append(&lower.description);
        self.default_value.append(&lower.default_value);
        self.enum_values.append(&lower.enum_values);
        self.additional_properties.append(&lower.additional_properties);
        self.pattern_properties.append(&lower.pattern_properties);
        self.string_min_length.append(&lower.string_min_length);
        self.string_max_length.append(&lower.string_max_length);
        self.string_format.append(&lower.string_format);
        self.string_pattern.append(&lower.string_pattern);
        self.number_inclusive_minimum.append(&lower.number_inclusive_minimum);
        self.number_exclusive_minimum.append(&lower.number_exclusive_minimum);
        self.number_inclusive_maximum.append(&lower.number_inclusive_maximum);
        self.number_exclusive_maximum.append(&lower.number_exclusive_maximum);
        self.number_multiple_of.append(&lower.number_multiple_of);
        self.array_min_items.append(&lower.array_min_items);
        self.array_max_items.append(&lower.array_max_items);
        self.array_unique_items.append(&lower.array_unique_items);
    }
}

impl<S> Default for ConfigPart<S> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// MemberConfigPart
// ---------------------------------------------------------------------------

/// Configuration for fields or for methods.
#[derive(Default)]
pub struct MemberConfigPart {
    attributes: ConfigPart<MemberScope>,
    pub(crate) ignore: ResolverChain<MemberScope, ()>,
    pub(crate) required: ResolverChain<MemberScope, ()>,
    pub(crate) nullable: ResolverChain<MemberScope, bool>,
    pub(crate) read_only: ResolverChain<MemberScope, ()>,
    pub(crate) write_only: ResolverChain<MemberScope, ()>,
    pub(crate) property_name_override: ResolverChain<MemberScope, String>,
    pub(crate) target_type_overrides: ResolverChain<MemberScope, Vec<TypeDescriptor>>,
    pub(crate) custom_definition_providers: Vec<Arc<dyn CustomPropertyDefinitionProvider>>,
    pub(crate) instance_attribute_overrides: Vec<InstanceAttributeOverride>,
}

impl MemberConfigPart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    check_setters! { MemberScope;
        /// Matching members are left out of `properties` entirely.
        with_ignore_check => ignore,
        with_required_check => required,
        with_read_only_check => read_only,
        with_write_only_check => write_only,
    }

    resolver_setters! { MemberScope;
        /// `Some(false)` vetoes nullability even when enabled by default.
        with_nullable_check => nullable: bool,
        with_property_name_overrider => property_name_override: String,
        /// Replace the declared type; several types become `anyOf` options.
        with_target_type_overrides_resolver => target_type_overrides: Vec<TypeDescriptor>,
    }

    pub fn with_custom_definition_provider<P>(&mut self, provider: P) -> &mut Self
    where
        P: CustomPropertyDefinitionProvider + 'static,
    {
        self.custom_definition_providers.insert(0, Arc::new(provider));
        self
    }

    pub fn with_custom_definition_fn<F>(&mut self, provider: F) -> &mut Self
    where
        F: Fn(&MemberScope, &mut SchemaGenerationContext) -> anyhow::Result<Option<CustomPropertyDefinition>>
            + Send
            + Sync
            + 'static,
    {
        self.with_custom_definition_provider(FnPropertyDefinitionProvider(provider))
    }

    /// Adjust the collected attributes of a member after all resolvers ran.
    /// Overrides run in registration order.
    pub fn with_instance_attribute_override<F>(&mut self, attribute_override: F) -> &mut Self
    where
        F: Fn(&mut Map<String, Value>, &MemberScope, &SchemaGenerationContext) + Send + Sync + 'static,
    {
        self.instance_attribute_overrides.push(Arc::new(attribute_override));
        self
    }

    /// Stack `self` over `lower`: resolvers and providers of `self` are
    /// consulted first, overrides of `lower` run first.
    pub(crate) fn stacked_over(mut self, lower: Self) -> Self {
        self.attributes.append(&lower.attributes);
        self.ignore.append(&lower.ignore);
        self.required.append(&lower.required);
        self.nullable.append(&lower.nullable);
        self.read_only.append(&lower.read_only);
        self.write_only.append(&lower.write_only);
        self.property_name_override.append(&lower.property_name_override);
        self.target_type_overrides.append(&lower.target_type_overrides);
        self.custom_definition_providers
            .extend(lower.custom_definition_providers);
        let mut overrides = lower.instance_attribute_overrides;
        overrides.append(&mut self.instance_attribute_overrides);
        self.instance_attribute_overrides = overrides;
        self
    }
}

impl Deref for MemberConfigPart {
    type Target = ConfigPart<MemberScope>;

    fn deref(&self) -> &Self::Target {
        &self.attributes
    }
}

impl DerefMut for MemberConfigPart {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.attributes
    }
}

// ---------------------------------------------------------------------------
// GeneralConfigPart
// ---------------------------------------------------------------------------

/// Configuration for types regardless of where they are used.
#[derive(Default)]
pub struct GeneralConfigPart {
    attributes: ConfigPart<TypeScope>,
    pub(crate) id: ResolverChain<TypeScope, String>,
    pub(crate) anchor: ResolverChain<TypeScope, String>,
    pub(crate) custom_definition_providers: Vec<Arc<dyn CustomDefinitionProvider>>,
    pub(crate) subtype_resolvers: Vec<Arc<dyn SubtypeResolver>>,
    pub(crate) type_attribute_overrides: Vec<TypeAttributeOverride>,
    pub(crate) naming_strategy: Option<Arc<dyn DefinitionNamingStrategy>>,
}

impl GeneralConfigPart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    resolver_setters! { TypeScope;
        with_id_resolver => id: String,
        /// Ignored for dialects before 2019-09.
        with_anchor_resolver => anchor: String,
    }

    pub fn with_custom_definition_provider<P>(&mut self, provider: P) -> &mut Self
    where
        P: CustomDefinitionProvider + 'static,
    {
        self.custom_definition_providers.insert(0, Arc::new(provider));
        self
    }

    pub fn with_custom_definition_fn<F>(&mut self, provider: F) -> &mut Self
    where
        F: Fn(&TypeDescriptor, &mut SchemaGenerationContext) -> anyhow::Result<Option<CustomDefinition>>
            + Send
            + Sync
            + 'static,
    {
        self.with_custom_definition_provider(FnDefinitionProvider(provider))
    }

    pub fn with_subtype_resolver<R>(&mut self, resolver: R) -> &mut Self
    where
        R: SubtypeResolver + 'static,
    {
        self.subtype_resolvers.insert(0, Arc::new(resolver));
        self
    }

    pub fn with_subtype_resolver_fn<F>(&mut self, resolver: F) -> &mut Self
    where
        F: Fn(&TypeDescriptor, &SchemaGenerationContext) -> anyhow::Result<Option<Vec<TypeDescriptor>>>
            + Send
            + Sync
            + 'static,
    {
        self.with_subtype_resolver(FnSubtypeResolver(resolver))
    }

    /// Adjust a finished type definition. Overrides run in registration
    /// order, after all attributes were merged.
    pub fn with_type_attribute_override<F>(&mut self, attribute_override: F) -> &mut Self
    where
        F: Fn(&mut Map<String, Value>, &TypeScope, &SchemaGenerationContext) + Send + Sync + 'static,
    {
        self.type_attribute_overrides.push(Arc::new(attribute_override));
        self
    }

    pub fn with_definition_naming_strategy<N>(&mut self, strategy: N) -> &mut Self
    where
        N: DefinitionNamingStrategy + 'static,
    {
        self.naming_strategy = Some(Arc::new(strategy));
        self
    }

    pub(crate) fn stacked_over(mut self, lower: Self) -> Self {
        self.attributes.append(&lower.attributes);
        self.id.append(&lower.id);
        self.anchor.append(&lower.anchor);
        self.custom_definition_providers
            .extend(lower.custom_definition_providers);
        self.subtype_resolvers.extend(lower.subtype_resolvers);
        let mut overrides = lower.type_attribute_overrides;
        overrides.append(&mut self.type_attribute_overrides);
        self.type_attribute_overrides = overrides;
        self.naming_strategy = self.naming_strategy.or(lower.naming_strategy);
        self
    }
}

impl Deref for GeneralConfigPart {
    type Target = ConfigPart<TypeScope>;

    fn deref(&self) -> &Self::Target {
        &self.attributes
    }
}

impl DerefMut for GeneralConfigPart {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.attributes
    }
}
