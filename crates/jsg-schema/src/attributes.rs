//! Collection of type and member attributes from the resolver chains.

use std::collections::BTreeSet;

use jsg_core::{GeneratorOption, MemberScope, SchemaVersion, TypeScope};
use serde_json::{Map, Number, Value};

use crate::config::{AdditionalProperties, ConfigPart};
use crate::context::SchemaGenerationContext;
use crate::error::GeneratorError;
use crate::keyword::{SchemaKeyword, SchemaType};

/// Schema types a definition declares; attributes specific to other types
/// are skipped. An empty set admits everything.
#[derive(Debug, Default, Clone)]
pub(crate) struct AllowedTypes(BTreeSet<String>);

impl AllowedTypes {
    pub(crate) fn any() -> Self {
        Self::default()
    }

    pub(crate) fn of(definition: &Map<String, Value>, version: SchemaVersion) -> Self {
        let types = match definition.get(SchemaKeyword::Type.for_version(version)) {
            Some(Value::String(single)) => std::iter::once(single.clone()).collect(),
            Some(Value::Array(several)) => several
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => BTreeSet::new(),
        };
        Self(types)
    }

    fn allows(&self, ty: SchemaType) -> bool {
        self.0.is_empty() || self.0.contains(ty.as_str())
    }

    fn allows_numbers(&self) -> bool {
        self.allows(SchemaType::Integer) || self.allows(SchemaType::Number)
    }
}

/// Insert every attribute `target` does not define yet.
pub(crate) fn merge_missing(target: &mut Map<String, Value>, attributes: Map<String, Value>) {
    for (key, value) in attributes {
        target.entry(key).or_insert(value);
    }
}

/// Attributes a type carries wherever it is used.
///
/// # Errors
///
/// Fails if a referenced `additionalProperties` or `patternProperties` type
/// cannot be traversed.
pub(crate) fn collect_type_attributes(
    scope: &TypeScope,
    context: &mut SchemaGenerationContext,
    allowed: &AllowedTypes,
) -> Result<Map<String, Value>, GeneratorError> {
    let config = context.shared_config();
    let version = config.version();
    let general = config.general();
    let mut node = Map::new();

    if let Some(id) = general.id.resolve(scope) {
        node.insert(SchemaKeyword::Id.for_version(version).to_string(), Value::String(id));
    }
    if SchemaKeyword::Anchor.is_supported_by(version) {
        if let Some(anchor) = general.anchor.resolve(scope) {
            node.insert(
                SchemaKeyword::Anchor.for_version(version).to_string(),
                Value::String(anchor),
            );
        }
    }
    collect_descriptive(general, scope, &mut node, context);
    collect_constraints(general, scope, allowed, &mut node, context)?;
    Ok(node)
}

/// Attributes of a field or method within its declaring type, after all
/// instance attribute overrides ran.
///
/// # Errors
///
/// Fails if a referenced `additionalProperties` or `patternProperties` type
/// cannot be traversed.
pub(crate) fn collect_member_attributes(
    member: &MemberScope,
    context: &mut SchemaGenerationContext,
) -> Result<Map<String, Value>, GeneratorError> {
    let config = context.shared_config();
    let version = config.version();
    let part = config.member_part(member);
    let mut node = Map::new();

    collect_descriptive(part, member, &mut node, context);
    if part.read_only.matches(member) && SchemaKeyword::ReadOnly.is_supported_by(version) {
        node.insert(
            SchemaKeyword::ReadOnly.for_version(version).to_string(),
            Value::Bool(true),
        );
    }
    if part.write_only.matches(member) && SchemaKeyword::WriteOnly.is_supported_by(version) {
        node.insert(
            SchemaKeyword::WriteOnly.for_version(version).to_string(),
            Value::Bool(true),
        );
    }
    collect_constraints(part, member, &AllowedTypes::any(), &mut node, context)?;

    for attribute_override in &part.instance_attribute_overrides {
        attribute_override(&mut node, member, &*context);
    }
    Ok(node)
}

fn collect_descriptive<S>(
    part: &ConfigPart<S>,
    scope: &S,
    node: &mut Map<String, Value>,
    context: &SchemaGenerationContext,
) {
    let version = context.config().version();
    let mut put = |keyword: SchemaKeyword, value: Value| {
        node.insert(keyword.for_version(version).to_string(), value);
    };
    if let Some(title) = part.title.resolve(scope) {
        put(SchemaKeyword::Title, Value::String(title));
    }
    if let Some(description) = part.description.resolve(scope) {
        put(SchemaKeyword::Description, Value::String(description));
    }
    if let Some(default) = part.default_value.resolve(scope) {
        put(SchemaKeyword::Default, default);
    }
    if let Some(mut values) = part.enum_values.resolve(scope) {
        let single_as_enum = context
            .config()
            .is_enabled(GeneratorOption::EnumKeywordForSingleValues);
        match values.len() {
            0 => {}
            1 if !single_as_enum => put(SchemaKeyword::Const, values.remove(0)),
            _ => put(SchemaKeyword::Enum, Value::Array(values)),
        }
    }
}

fn collect_constraints<S>(
    part: &ConfigPart<S>,
    scope: &S,
    allowed: &AllowedTypes,
    node: &mut Map<String, Value>,
    context: &mut SchemaGenerationContext,
) -> Result<(), GeneratorError> {
    let version = context.config().version();
    let key = |keyword: SchemaKeyword| keyword.for_version(version).to_string();

    if allowed.allows(SchemaType::Object) {
        match part.additional_properties.resolve(scope) {
            Some(AdditionalProperties::Forbidden) => {
                node.insert(key(SchemaKeyword::AdditionalProperties), Value::Bool(false));
            }
            Some(AdditionalProperties::Type(ty)) => {
                let reference = context.create_definition_reference(&ty)?;
                node.insert(
                    key(SchemaKeyword::AdditionalProperties),
                    Value::Object(reference),
                );
            }
            Some(AdditionalProperties::Any) | None => {}
        }
        let patterns = part.pattern_properties.resolve(scope).unwrap_or_default();
        if !patterns.is_empty() {
            let mut pattern_node = Map::new();
            for (pattern, ty) in patterns {
                let reference = context.create_definition_reference(&ty)?;
                pattern_node.insert(pattern, Value::Object(reference));
            }
            node.insert(key(SchemaKeyword::PatternProperties), Value::Object(pattern_node));
        }
    }

    if allowed.allows(SchemaType::String) {
        put_count(node, key(SchemaKeyword::MinLength), part.string_min_length.resolve(scope));
        put_count(node, key(SchemaKeyword::MaxLength), part.string_max_length.resolve(scope));
        if let Some(format) = part.string_format.resolve(scope) {
            node.insert(key(SchemaKeyword::Format), Value::String(format));
        }
        if let Some(pattern) = part.string_pattern.resolve(scope) {
            node.insert(key(SchemaKeyword::Pattern), Value::String(pattern));
        }
    }

    if allowed.allows_numbers() {
        put_number(node, key(SchemaKeyword::Minimum), part.number_inclusive_minimum.resolve(scope));
        put_number(
            node,
            key(SchemaKeyword::ExclusiveMinimum),
            part.number_exclusive_minimum.resolve(scope),
        );
        put_number(node, key(SchemaKeyword::Maximum), part.number_inclusive_maximum.resolve(scope));
        put_number(
            node,
            key(SchemaKeyword::ExclusiveMaximum),
            part.number_exclusive_maximum.resolve(scope),
        );
        put_number(node, key(SchemaKeyword::MultipleOf), part.number_multiple_of.resolve(scope));
    }

    if allowed.allows(SchemaType::Array) {
        put_count(node, key(SchemaKeyword::MinItems), part.array_min_items.resolve(scope));
        put_count(node, key(SchemaKeyword::MaxItems), part.array_max_items.resolve(scope));
        if let Some(unique) = part.array_unique_items.resolve(scope) {
            node.insert(key(SchemaKeyword::UniqueItems), Value::Bool(unique));
        }
    }
    Ok(())
}

fn put_count(node: &mut Map<String, Value>, key: String, value: Option<u64>) {
    if let Some(value) = value {
        node.insert(key, Value::from(value));
    }
}

fn put_number(node: &mut Map<String, Value>, key: String, value: Option<Number>) {
    if let Some(value) = value {
        node.insert(key, Value::Number(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn allowed_types_follow_declared_type() {
        let version = SchemaVersion::Draft2020_12;
        let single = json!({"type": "string"});
        let allowed = AllowedTypes::of(single.as_object().unwrap(), version);
        assert!(allowed.allows(SchemaType::String));
        assert!(!allowed.allows(SchemaType::Object));
        assert!(!allowed.allows_numbers());

        let several = json!({"type": ["integer", "null"]});
        let allowed = AllowedTypes::of(several.as_object().unwrap(), version);
        assert!(allowed.allows_numbers());
        assert!(!allowed.allows(SchemaType::Array));

        let untyped = json!({"$ref": "#/$defs/Foo"});
        assert!(AllowedTypes::of(untyped.as_object().unwrap(), version).allows(SchemaType::Array));
    }

    #[test]
    fn merge_keeps_existing_values() {
        let mut target = json!({"type": "string", "title": "kept"})
            .as_object()
            .cloned()
            .unwrap();
        let attributes = json!({"title": "dropped", "minLength": 1})
            .as_object()
            .cloned()
            .unwrap();
        merge_missing(&mut target, attributes);
        assert_eq!(
            Value::Object(target),
            json!({"type": "string", "title": "kept", "minLength": 1})
        );
    }
}
