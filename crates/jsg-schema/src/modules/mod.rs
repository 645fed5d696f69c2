//! Reusable bundles of configuration.
//!
//! A [`Module`] registers resolvers and providers on a
//! [`SchemaGeneratorConfigBuilder`]. The modules in this directory back the
//! [`GeneratorOption`]s; [`apply_option_modules`] installs the ones the
//! enabled options ask for.

mod additional_properties;
mod enums;
mod optionals;
mod simple_types;

use jsg_core::GeneratorOption;

use crate::config::SchemaGeneratorConfigBuilder;
use crate::subtypes::DeclaredSubtypeResolver;

pub use additional_properties::{ForbiddenAdditionalPropertiesModule, MapValuesModule};
pub use enums::EnumModule;
pub use optionals::FlattenedWrapperModule;
pub use simple_types::SimpleTypeModule;

/// A bundle of configuration applied to a builder in one go.
pub trait Module {
    fn apply_to_config_builder(&self, builder: &mut SchemaGeneratorConfigBuilder);
}

impl<F> Module for F
where
    F: Fn(&mut SchemaGeneratorConfigBuilder),
{
    fn apply_to_config_builder(&self, builder: &mut SchemaGeneratorConfigBuilder) {
        self(builder);
    }
}

/// Install the modules implied by the builder's enabled options.
///
/// Nullable-by-default options are not modules; the traversal consults them
/// directly when no nullable check answered.
pub(crate) fn apply_option_modules(builder: &mut SchemaGeneratorConfigBuilder) {
    let simple_types = if builder.is_enabled(GeneratorOption::AdditionalFixedTypes) {
        SimpleTypeModule::with_additional_fixed_types()
    } else {
        SimpleTypeModule::primitives_only()
    };
    builder.with_module(simple_types);

    if builder.is_enabled(GeneratorOption::FlattenedEnums) {
        builder.with_module(EnumModule);
    }
    if builder.is_enabled(GeneratorOption::FlattenedOptionals) {
        builder
            .with_module(FlattenedWrapperModule::optional())
            .with_module(FlattenedWrapperModule::supplier());
    }
    if builder.is_enabled(GeneratorOption::MapValuesAsAdditionalProperties) {
        builder.with_module(MapValuesModule);
    }
    if builder.is_enabled(GeneratorOption::ForbiddenAdditionalPropertiesByDefault) {
        builder.with_module(ForbiddenAdditionalPropertiesModule);
    }
    if builder.is_enabled(GeneratorOption::DeclaredSubtypes) {
        builder
            .for_types_in_general()
            .with_subtype_resolver(DeclaredSubtypeResolver);
    }
}
