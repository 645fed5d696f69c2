//! `additionalProperties` defaults for maps and plain objects.

use jsg_core::{TypeKind, TypeScope, builtins};

use crate::config::{AdditionalProperties, SchemaGeneratorConfigBuilder};
use crate::modules::Module;

/// `Map<K, V>` and its subtypes accept additional properties of type `V`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapValuesModule;

impl Module for MapValuesModule {
    fn apply_to_config_builder(&self, builder: &mut SchemaGeneratorConfigBuilder) {
        builder
            .for_types_in_general()
            .with_additional_properties_resolver(map_values);
    }
}

fn map_values(scope: &TypeScope) -> Option<AdditionalProperties> {
    let value = scope
        .context()
        .type_parameter_for(scope.ty(), builtins::MAP, 1)
        .ok()
        .flatten();
    if !is_map(scope) {
        return None;
    }
    Some(match value {
        Some(value) if !value.is_erased(builtins::OBJECT) => AdditionalProperties::Type(value),
        _ => AdditionalProperties::Any,
    })
}

fn is_map(scope: &TypeScope) -> bool {
    matches!(scope.context().find_ancestor(scope.ty(), builtins::MAP), Ok(Some(_)))
}

/// Declared classes and interfaces reject properties they do not declare.
/// Builtins, containers and maps are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForbiddenAdditionalPropertiesModule;

impl Module for ForbiddenAdditionalPropertiesModule {
    fn apply_to_config_builder(&self, builder: &mut SchemaGeneratorConfigBuilder) {
        builder
            .for_types_in_general()
            .with_additional_properties_resolver(|scope| {
                let ty = scope.ty();
                if builtins::is_builtin(ty.erased_name()) || ty.is_array() || is_map(scope) {
                    return None;
                }
                if scope.is_container_type().unwrap_or(true) {
                    return None;
                }
                let declared_object = scope.declaration().is_some_and(|declaration| {
                    matches!(declaration.kind, TypeKind::Class | TypeKind::Interface)
                });
                declared_object.then_some(AdditionalProperties::Forbidden)
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsg_core::{TypeContext, TypeDeclaration, TypeUniverse};
    use pretty_assertions::assert_eq;

    fn types() -> TypeContext {
        let mut universe = TypeUniverse::new();
        universe
            .declare(
                TypeDeclaration::class("acme.Prices")
                    .implements("Map<String, BigDecimal>".parse().unwrap()),
            )
            .unwrap()
            .declare(TypeDeclaration::class("acme.Item"))
            .unwrap();
        TypeContext::new(universe)
    }

    #[test]
    fn map_values_become_additional_properties() {
        let types = types();
        let prices = types.type_scope(&types.parse("acme.Prices").unwrap());
        assert_eq!(
            map_values(&prices),
            Some(AdditionalProperties::Type(types.parse("BigDecimal").unwrap()))
        );

        let anything = types.type_scope(&types.parse("Map<String, Object>").unwrap());
        assert_eq!(map_values(&anything), Some(AdditionalProperties::Any));

        let item = types.type_scope(&types.parse("acme.Item").unwrap());
        assert_eq!(map_values(&item), None);
    }
}
