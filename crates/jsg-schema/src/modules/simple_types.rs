//! Fixed inline schemas for primitives, strings and other value types.

use indexmap::IndexMap;
use jsg_core::{MemberScope, TypeKind, builtins};
use serde_json::{Map, Value};

use crate::config::SchemaGeneratorConfigBuilder;
use crate::custom::CustomDefinition;
use crate::keyword::{SchemaKeyword, SchemaType};
use crate::modules::Module;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FixedSchema {
    schema_type: Option<SchemaType>,
    format: Option<&'static str>,
}

/// Maps builtin value types to fixed inline schemas, e.g. `Integer` to
/// `{"type": "integer"}`. Members of primitive types are never nullable.
#[derive(Debug, Clone)]
pub struct SimpleTypeModule {
    fixed: IndexMap<&'static str, FixedSchema>,
}

impl SimpleTypeModule {
    /// `Object`, `String`, booleans and numbers, boxed and primitive.
    #[must_use]
    pub fn primitives_only() -> Self {
        let mut module = Self {
            fixed: IndexMap::new(),
        };
        module
            .with_empty_schema(builtins::OBJECT)
            .with_type(builtins::STRING, SchemaType::String)
            .with_type(builtins::CHARACTER, SchemaType::String)
            .with_type(builtins::PRIMITIVE_CHAR, SchemaType::String)
            .with_type(builtins::BYTE, SchemaType::String)
            .with_type(builtins::PRIMITIVE_BYTE, SchemaType::String)
            .with_type(builtins::BOOLEAN, SchemaType::Boolean)
            .with_type(builtins::PRIMITIVE_BOOLEAN, SchemaType::Boolean)
            .with_type(builtins::INTEGER, SchemaType::Integer)
            .with_type(builtins::PRIMITIVE_INT, SchemaType::Integer)
            .with_type(builtins::LONG, SchemaType::Integer)
            .with_type(builtins::PRIMITIVE_LONG, SchemaType::Integer)
            .with_type(builtins::SHORT, SchemaType::Integer)
            .with_type(builtins::PRIMITIVE_SHORT, SchemaType::Integer)
            .with_type(builtins::DOUBLE, SchemaType::Number)
            .with_type(builtins::PRIMITIVE_DOUBLE, SchemaType::Number)
            .with_type(builtins::FLOAT, SchemaType::Number)
            .with_type(builtins::PRIMITIVE_FLOAT, SchemaType::Number);
        module
    }

    /// [`primitives_only`](Self::primitives_only) plus dates, times,
    /// identifiers and arbitrary precision numbers.
    #[must_use]
    pub fn with_additional_fixed_types() -> Self {
        let mut module = Self::primitives_only();
        module
            .with_formatted(builtins::LOCAL_DATE, SchemaType::String, "date")
            .with_formatted(builtins::LOCAL_TIME, SchemaType::String, "time")
            .with_formatted(builtins::LOCAL_DATE_TIME, SchemaType::String, "date-time")
            .with_formatted(builtins::ZONED_DATE_TIME, SchemaType::String, "date-time")
            .with_formatted(builtins::INSTANT, SchemaType::String, "date-time")
            .with_formatted(builtins::UUID, SchemaType::String, "uuid")
            .with_formatted(builtins::URI, SchemaType::String, "uri")
            .with_type(builtins::DURATION, SchemaType::String)
            .with_type(builtins::BIG_INTEGER, SchemaType::Integer)
            .with_type(builtins::BIG_DECIMAL, SchemaType::Number);
        module
    }

    /// Represent `erased` by `{}`, accepting anything.
    pub fn with_empty_schema(&mut self, erased: &'static str) -> &mut Self {
        self.fixed.insert(
            erased,
            FixedSchema {
                schema_type: None,
                format: None,
            },
        );
        self
    }

    pub fn with_type(&mut self, erased: &'static str, schema_type: SchemaType) -> &mut Self {
        self.fixed.insert(
            erased,
            FixedSchema {
                schema_type: Some(schema_type),
                format: None,
            },
        );
        self
    }

    pub fn with_formatted(
        &mut self,
        erased: &'static str,
        schema_type: SchemaType,
        format: &'static str,
    ) -> &mut Self {
        self.fixed.insert(
            erased,
            FixedSchema {
                schema_type: Some(schema_type),
                format: Some(format),
            },
        );
        self
    }

    fn is_primitive_member(member: &MemberScope) -> bool {
        member
            .context()
            .kind_of(member.declared_type())
            .is_some_and(|kind| kind == TypeKind::Primitive)
    }
}

impl Module for SimpleTypeModule {
    fn apply_to_config_builder(&self, builder: &mut SchemaGeneratorConfigBuilder) {
        let version = builder.version();
        let fixed = self.fixed.clone();
        builder
            .for_types_in_general()
            .with_custom_definition_fn(move |ty, _| {
                let Some(schema) = fixed.get(ty.erased_name()) else {
                    return Ok(None);
                };
                let mut node = Map::new();
                if let Some(schema_type) = schema.schema_type {
                    node.insert(
                        SchemaKeyword::Type.for_version(version).to_string(),
                        Value::from(schema_type.as_str()),
                    );
                }
                if let Some(format) = schema.format {
                    node.insert(
                        SchemaKeyword::Format.for_version(version).to_string(),
                        Value::from(format),
                    );
                }
                Ok(Some(CustomDefinition::inline(node)))
            });

        let not_nullable = |member: &MemberScope| Self::is_primitive_member(member).then_some(false);
        builder.for_fields().with_nullable_check(not_nullable);
        builder.for_methods().with_nullable_check(not_nullable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additional_types_extend_primitives() {
        let plain = SimpleTypeModule::primitives_only();
        let extended = SimpleTypeModule::with_additional_fixed_types();
        assert!(!plain.fixed.contains_key(builtins::UUID));
        assert_eq!(
            extended.fixed.get(builtins::UUID),
            Some(&FixedSchema {
                schema_type: Some(SchemaType::String),
                format: Some("uuid"),
            })
        );
        assert!(extended.fixed.len() > plain.fixed.len());
    }
}
