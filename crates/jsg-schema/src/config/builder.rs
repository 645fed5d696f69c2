//! Mutable configuration builder.

use std::collections::BTreeSet;
use std::sync::Arc;

use jsg_config::GeneratorSettings;
use jsg_core::{GeneratorOption, OptionPreset, SchemaVersion, SubtypeComposition, TypeContext};

use crate::config::SchemaGeneratorConfig;
use crate::config::part::{GeneralConfigPart, MemberConfigPart};
use crate::modules::{self, Module};
use crate::naming::{
    CleanNamingStrategy, DefaultNamingStrategy, DefinitionNamingStrategy, QualifiedNamingStrategy,
};

/// Collects resolvers, providers, modules, and options until [`build`] freezes
/// them.
///
/// Modules passed to [`with_module`] are applied immediately, so anything
/// registered afterwards takes precedence over them. Modules implied by
/// enabled [`GeneratorOption`]s are applied during [`build`] beneath all
/// other configuration.
///
/// [`build`]: SchemaGeneratorConfigBuilder::build
/// [`with_module`]: SchemaGeneratorConfigBuilder::with_module
pub struct SchemaGeneratorConfigBuilder {
    type_context: TypeContext,
    version: SchemaVersion,
    options: BTreeSet<GeneratorOption>,
    subtype_composition: SubtypeComposition,
    default_naming: DefaultNamingStrategy,
    qualified_names: bool,
    fields: MemberConfigPart,
    methods: MemberConfigPart,
    general: GeneralConfigPart,
}

impl SchemaGeneratorConfigBuilder {
    #[must_use]
    pub fn new(type_context: TypeContext, version: SchemaVersion, preset: OptionPreset) -> Self {
        Self::with_options(
            type_context,
            version,
            preset.enabled_by_default().iter().copied().collect(),
        )
    }

    fn with_options(
        type_context: TypeContext,
        version: SchemaVersion,
        options: BTreeSet<GeneratorOption>,
    ) -> Self {
        Self {
            type_context,
            version,
            options,
            subtype_composition: SubtypeComposition::default(),
            default_naming: DefaultNamingStrategy::default(),
            qualified_names: false,
            fields: MemberConfigPart::new(),
            methods: MemberConfigPart::new(),
            general: GeneralConfigPart::new(),
        }
    }

    /// Builder preconfigured from loaded settings.
    #[must_use]
    pub fn from_settings(type_context: TypeContext, settings: &GeneratorSettings) -> Self {
        let mut builder =
            Self::with_options(type_context, settings.schema_version, settings.enabled_options());
        builder.subtype_composition = settings.subtypes.composition;
        builder.default_naming = DefaultNamingStrategy::new(
            settings.definitions.duplicate_separator.clone(),
            settings.definitions.nullable_suffix.clone(),
        );
        builder.qualified_names = settings.definitions.qualified_names;
        builder
    }

    pub fn with(&mut self, option: GeneratorOption) -> &mut Self {
        self.options.insert(option);
        self
    }

    pub fn without(&mut self, option: GeneratorOption) -> &mut Self {
        self.options.remove(&option);
        self
    }

    #[must_use]
    pub fn is_enabled(&self, option: GeneratorOption) -> bool {
        self.options.contains(&option)
    }

    pub fn with_subtype_composition(&mut self, composition: SubtypeComposition) -> &mut Self {
        self.subtype_composition = composition;
        self
    }

    /// Name definitions by fully qualified type unless a naming strategy is
    /// registered.
    pub const fn with_qualified_names(&mut self, qualified: bool) -> &mut Self {
        self.qualified_names = qualified;
        self
    }

    /// Apply a module now; later registrations override what it configures.
    pub fn with_module<M: Module>(&mut self, module: M) -> &mut Self {
        tracing::debug!(module = std::any::type_name::<M>(), "applying module");
        module.apply_to_config_builder(self);
        self
    }

    #[must_use]
    pub const fn type_context(&self) -> &TypeContext {
        &self.type_context
    }

    #[must_use]
    pub const fn version(&self) -> SchemaVersion {
        self.version
    }

    pub const fn for_fields(&mut self) -> &mut MemberConfigPart {
        &mut self.fields
    }

    pub const fn for_methods(&mut self) -> &mut MemberConfigPart {
        &mut self.methods
    }

    pub const fn for_types_in_general(&mut self) -> &mut GeneralConfigPart {
        &mut self.general
    }

    /// Freeze the configuration.
    #[must_use]
    pub fn build(self) -> SchemaGeneratorConfig {
        let mut base = Self::with_options(
            self.type_context.clone(),
            self.version,
            self.options.clone(),
        );
        modules::apply_option_modules(&mut base);

        let general = self.general.stacked_over(base.general);
        let base_strategy: Arc<dyn DefinitionNamingStrategy> = match general.naming_strategy.clone() {
            Some(strategy) => strategy,
            None if self.qualified_names => Arc::new(QualifiedNamingStrategy::new(self.default_naming)),
            None => Arc::new(self.default_naming),
        };
        let naming_strategy = if self.options.contains(&GeneratorOption::PlainDefinitionKeys) {
            CleanNamingStrategy::plain(base_strategy)
        } else {
            CleanNamingStrategy::uri_compatible(base_strategy)
        };

        tracing::debug!(
            version = %self.version,
            options = self.options.len(),
            "schema generator config built"
        );
        SchemaGeneratorConfig {
            type_context: self.type_context,
            version: self.version,
            options: self.options,
            subtype_composition: self.subtype_composition,
            fields: self.fields.stacked_over(base.fields),
            methods: self.methods.stacked_over(base.methods),
            general,
            naming_strategy: Arc::new(naming_strategy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsg_core::TypeUniverse;

    fn context() -> TypeContext {
        TypeContext::new(TypeUniverse::new())
    }

    #[test]
    fn preset_options_can_be_adjusted() {
        let mut builder =
            SchemaGeneratorConfigBuilder::new(context(), SchemaVersion::Draft7, OptionPreset::Plain);
        assert!(builder.is_enabled(GeneratorOption::FlattenedEnums));
        builder
            .without(GeneratorOption::FlattenedEnums)
            .with(GeneratorOption::InlineAllSchemas);
        let config = builder.build();
        assert!(!config.is_enabled(GeneratorOption::FlattenedEnums));
        assert!(config.is_enabled(GeneratorOption::InlineAllSchemas));
        assert_eq!(config.version(), SchemaVersion::Draft7);
    }

    #[test]
    fn settings_carry_over() {
        let mut settings = GeneratorSettings::default();
        settings.schema_version = SchemaVersion::Draft2019_09;
        settings.subtypes.composition = SubtypeComposition::OneOf;
        settings.options.enable.push(GeneratorOption::StaticFields);

        let config = SchemaGeneratorConfigBuilder::from_settings(context(), &settings).build();
        assert_eq!(config.version(), SchemaVersion::Draft2019_09);
        assert_eq!(config.subtype_composition(), SubtypeComposition::OneOf);
        assert!(config.is_enabled(GeneratorOption::StaticFields));
        assert!(config.is_enabled(GeneratorOption::DeclaredSubtypes));
    }

    #[test]
    fn option_modules_sit_beneath_user_providers() {
        let mut builder =
            SchemaGeneratorConfigBuilder::new(context(), SchemaVersion::Draft2020_12, OptionPreset::Standard);
        builder
            .for_types_in_general()
            .with_custom_definition_fn(|_, _| Ok(None));
        let config = builder.build();
        // user provider first, then the simple-type, enum and optional modules
        assert!(config.general().custom_definition_providers.len() > 1);
        assert!(!config.general().subtype_resolvers.is_empty());
    }
}
