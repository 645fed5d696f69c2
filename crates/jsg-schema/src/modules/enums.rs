//! Enums rendered as plain string values.

use jsg_core::{GeneratorOption, TypeKind};
use serde_json::{Map, Value};

use crate::config::SchemaGeneratorConfigBuilder;
use crate::custom::CustomDefinition;
use crate::keyword::{SchemaKeyword, SchemaType};
use crate::modules::Module;

/// Represents enum types as `{"type": "string", "enum": [constants]}`.
///
/// A single constant becomes `const` unless `EnumKeywordForSingleValues` is
/// enabled. The definition is a standard one, so an enum used in several
/// places is still shared.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumModule;

impl Module for EnumModule {
    fn apply_to_config_builder(&self, builder: &mut SchemaGeneratorConfigBuilder) {
        let version = builder.version();
        let single_as_enum = builder.is_enabled(GeneratorOption::EnumKeywordForSingleValues);
        builder
            .for_types_in_general()
            .with_custom_definition_fn(move |ty, context| {
                let Some(declaration) = context.type_context().declaration(ty) else {
                    return Ok(None);
                };
                if declaration.kind != TypeKind::Enum {
                    return Ok(None);
                }
                let mut constants: Vec<Value> = declaration
                    .enum_constants
                    .iter()
                    .map(|constant| Value::from(constant.as_str()))
                    .collect();

                let mut node = Map::new();
                node.insert(
                    SchemaKeyword::Type.for_version(version).to_string(),
                    Value::from(SchemaType::String.as_str()),
                );
                if constants.len() == 1 && !single_as_enum {
                    node.insert(
                        SchemaKeyword::Const.for_version(version).to_string(),
                        constants.remove(0),
                    );
                } else {
                    node.insert(
                        SchemaKeyword::Enum.for_version(version).to_string(),
                        Value::Array(constants),
                    );
                }
                tracing::trace!(r#type = %ty, "flattened enum");
                Ok(Some(CustomDefinition::new(node)))
            });
    }
}
