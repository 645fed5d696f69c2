//! Wrapper types such as `Optional<T>` replaced by their content.

use jsg_core::{MemberScope, TypeDescriptor, builtins};

use crate::config::SchemaGeneratorConfigBuilder;
use crate::modules::Module;

/// Members declared as `Wrapper<T>` are described by the schema of `T` and
/// are nullable.
#[derive(Debug, Clone)]
pub struct FlattenedWrapperModule {
    wrapper: &'static str,
}

impl FlattenedWrapperModule {
    #[must_use]
    pub const fn new(wrapper: &'static str) -> Self {
        Self { wrapper }
    }

    #[must_use]
    pub const fn optional() -> Self {
        Self::new(builtins::OPTIONAL)
    }

    #[must_use]
    pub const fn supplier() -> Self {
        Self::new(builtins::SUPPLIER)
    }
}

/// Whether the declared type of `member` (or of its items, for an item
/// scope) is `wrapper` or a subtype of it.
fn has_wrapper_type(member: &MemberScope, wrapper: &str) -> bool {
    let types = member.context();
    let declared = if member.is_fake_container_item_scope() {
        match types.container_item_type(member.declared_type()) {
            Ok(Some(item)) => item,
            _ => return false,
        }
    } else {
        member.declared_type().clone()
    };
    matches!(types.find_ancestor(&declared, wrapper), Ok(Some(_)))
}

fn wrapped_type(member: &MemberScope, wrapper: &str) -> Option<Vec<TypeDescriptor>> {
    member
        .context()
        .type_parameter_for(member.member_type(), wrapper, 0)
        .ok()
        .flatten()
        .map(|content| vec![content])
}

impl Module for FlattenedWrapperModule {
    fn apply_to_config_builder(&self, builder: &mut SchemaGeneratorConfigBuilder) {
        let wrapper = self.wrapper;
        builder
            .for_fields()
            .with_target_type_overrides_resolver(move |member| wrapped_type(member, wrapper))
            .with_nullable_check(move |member| has_wrapper_type(member, wrapper).then_some(true));
        builder
            .for_methods()
            .with_target_type_overrides_resolver(move |member| wrapped_type(member, wrapper))
            .with_nullable_check(move |member| has_wrapper_type(member, wrapper).then_some(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsg_core::{FieldDeclaration, TypeContext, TypeDeclaration, TypeUniverse};

    #[test]
    fn wrapped_content_is_the_override() {
        let mut universe = TypeUniverse::new();
        universe
            .declare(
                TypeDeclaration::class("acme.Profile")
                    .field(FieldDeclaration::new("nickname", "Optional<String>".parse().unwrap()))
                    .field(FieldDeclaration::new("aliases", "List<Optional<String>>".parse().unwrap()))
                    .field(FieldDeclaration::new("age", "Integer".parse().unwrap())),
            )
            .unwrap();
        let types = TypeContext::new(universe);
        let profile = types.parse("acme.Profile").unwrap();
        let fields = types.fields_of(&profile).unwrap();

        let nickname = &fields[0];
        assert!(has_wrapper_type(nickname, builtins::OPTIONAL));
        assert_eq!(
            wrapped_type(nickname, builtins::OPTIONAL).map(|t| t[0].simple_description()),
            Some("String".to_string())
        );

        let aliases = &fields[1];
        assert!(!has_wrapper_type(aliases, builtins::OPTIONAL));
        let alias_item = aliases.as_fake_container_item_scope().unwrap().unwrap();
        assert!(has_wrapper_type(&alias_item, builtins::OPTIONAL));

        assert!(!has_wrapper_type(&fields[2], builtins::OPTIONAL));
        assert!(wrapped_type(&fields[2], builtins::OPTIONAL).is_none());
    }
}
