//! Post-processing of an assembled document: `allOf` and `anyOf` reduction
//! and the draft-04 keyword rewrite.

use jsg_core::{GeneratorOption, SchemaVersion};
use serde_json::{Map, Value};

use crate::config::SchemaGeneratorConfig;
use crate::keyword::SchemaKeyword;

const SINGLE_SCHEMA_KEYWORDS: [SchemaKeyword; 2] =
    [SchemaKeyword::Items, SchemaKeyword::AdditionalProperties];
const SCHEMA_ARRAY_KEYWORDS: [SchemaKeyword; 4] = [
    SchemaKeyword::Items,
    SchemaKeyword::AllOf,
    SchemaKeyword::AnyOf,
    SchemaKeyword::OneOf,
];
const NAMED_SCHEMAS_KEYWORDS: [SchemaKeyword; 3] = [
    SchemaKeyword::Properties,
    SchemaKeyword::PatternProperties,
    SchemaKeyword::Definitions,
];

/// Every keyword spelled in `version`; tags outside this list are never
/// merged when they occur more than once.
const KNOWN_KEYWORDS: [SchemaKeyword; 33] = [
    SchemaKeyword::Schema,
    SchemaKeyword::Id,
    SchemaKeyword::Anchor,
    SchemaKeyword::Definitions,
    SchemaKeyword::Ref,
    SchemaKeyword::Type,
    SchemaKeyword::Properties,
    SchemaKeyword::Items,
    SchemaKeyword::Required,
    SchemaKeyword::AdditionalProperties,
    SchemaKeyword::PatternProperties,
    SchemaKeyword::AllOf,
    SchemaKeyword::AnyOf,
    SchemaKeyword::OneOf,
    SchemaKeyword::Const,
    SchemaKeyword::Enum,
    SchemaKeyword::Title,
    SchemaKeyword::Description,
    SchemaKeyword::Default,
    SchemaKeyword::ReadOnly,
    SchemaKeyword::WriteOnly,
    SchemaKeyword::MinLength,
    SchemaKeyword::MaxLength,
    SchemaKeyword::Format,
    SchemaKeyword::Pattern,
    SchemaKeyword::Minimum,
    SchemaKeyword::ExclusiveMinimum,
    SchemaKeyword::Maximum,
    SchemaKeyword::ExclusiveMaximum,
    SchemaKeyword::MultipleOf,
    SchemaKeyword::MinItems,
    SchemaKeyword::MaxItems,
    SchemaKeyword::UniqueItems,
];

/// Final pass over an assembled schema (and everything nested in it).
pub(crate) fn clean_up(schema: &mut Map<String, Value>, config: &SchemaGeneratorConfig) {
    let version = config.version();
    let merge_all_of = config.is_enabled(GeneratorOption::AllOfCleanupAtTheEnd);
    visit_schemas(schema, version, &mut |node: &mut Map<String, Value>| {
        if merge_all_of {
            reduce_all_of(node, version);
        }
        reduce_any_of(node, version);
        if version == SchemaVersion::Draft4 {
            rewrite_for_draft4(node);
        }
    });
}

/// Visit `schema` and every nested subschema, innermost first.
pub(crate) fn visit_schemas(
    schema: &mut Map<String, Value>,
    version: SchemaVersion,
    visit: &mut dyn FnMut(&mut Map<String, Value>),
) {
    for keyword in SINGLE_SCHEMA_KEYWORDS {
        if let Some(Value::Object(nested)) = schema.get_mut(keyword.for_version(version)) {
            visit_schemas(nested, version, visit);
        }
    }
    for keyword in SCHEMA_ARRAY_KEYWORDS {
        if let Some(Value::Array(entries)) = schema.get_mut(keyword.for_version(version)) {
            for entry in entries {
                if let Value::Object(nested) = entry {
                    visit_schemas(nested, version, visit);
                }
            }
        }
    }
    for keyword in NAMED_SCHEMAS_KEYWORDS {
        if let Some(Value::Object(named)) = schema.get_mut(keyword.for_version(version)) {
            for nested in named.values_mut() {
                if let Value::Object(nested) = nested {
                    visit_schemas(nested, version, visit);
                }
            }
        }
    }
    visit(schema);
}

// ---------------------------------------------------------------------------
// anyOf
// ---------------------------------------------------------------------------

/// Splice entries that consist of nothing but another `anyOf` into the
/// enclosing `anyOf`.
pub(crate) fn reduce_any_of(schema: &mut Map<String, Value>, version: SchemaVersion) {
    let any_of = SchemaKeyword::AnyOf.for_version(version);
    let Some(Value::Array(entries)) = schema.get_mut(any_of) else {
        return;
    };
    let mut flattened = Vec::with_capacity(entries.len());
    for entry in entries.drain(..) {
        match entry {
            Value::Object(mut wrapper) if wrapper.len() == 1 && wrapper.contains_key(any_of) => {
                match wrapper.shift_remove(any_of) {
                    Some(Value::Array(nested)) => flattened.extend(nested),
                    Some(other) => {
                        wrapper.insert(any_of.to_string(), other);
                        flattened.push(Value::Object(wrapper));
                    }
                    None => flattened.push(Value::Object(wrapper)),
                }
            }
            other => flattened.push(other),
        }
    }
    *entries = flattened;
}

// ---------------------------------------------------------------------------
// allOf
// ---------------------------------------------------------------------------

/// Merge the `allOf` parts of `schema` into it when no two parts disagree.
pub(crate) fn reduce_all_of(schema: &mut Map<String, Value>, version: SchemaVersion) {
    let all_of = SchemaKeyword::AllOf.for_version(version);
    let Some(Value::Array(entries)) = schema.get(all_of) else {
        return;
    };
    let mut parts: Vec<&Value> = Vec::with_capacity(entries.len() + 1);
    let main = Value::Object(schema.clone());
    parts.push(&main);
    parts.extend(entries.iter());

    let Some(merged) = merge_schemas(Some(&*schema), &parts, version) else {
        return;
    };
    schema.shift_remove(all_of);
    for (key, value) in merged {
        schema.insert(key, value);
    }
}

fn merge_schemas(
    main: Option<&Map<String, Value>>,
    nodes: &[&Value],
    version: SchemaVersion,
) -> Option<Map<String, Value>> {
    if nodes.iter().any(|node| **node == Value::Bool(false)) {
        return None;
    }
    let parts: Vec<&Map<String, Value>> = nodes.iter().filter_map(|node| node.as_object()).collect();

    let mut fields: Map<String, Value> = Map::new();
    let mut occurrences: Vec<(String, Vec<&Value>)> = Vec::new();
    for part in &parts {
        for (key, value) in *part {
            match occurrences.iter_mut().find(|(existing, _)| existing == key) {
                Some((_, values)) => values.push(value),
                None => occurrences.push((key.clone(), vec![value])),
            }
        }
    }

    if should_skip_merging(main, &parts, &occurrences, version) {
        return None;
    }

    let all_of = SchemaKeyword::AllOf.for_version(version);
    for (key, mut values) in occurrences {
        if key == all_of && main.is_some() {
            // the allOf being removed is not a value to merge
            values.remove(0);
            if values.is_empty() {
                continue;
            }
        }
        let keyword = KNOWN_KEYWORDS
            .iter()
            .copied()
            .find(|keyword| keyword.for_version(version) == key);
        let merged = match (values.as_slice(), keyword) {
            ([single], _) => Some((*single).clone()),
            (_, Some(keyword)) => merge_values(keyword, &values, version),
            (_, None) => None,
        };
        fields.insert(key, merged?);
    }
    Some(fields)
}

/// Dialects up to draft 7 ignore siblings of `$ref`, so a reference may only
/// be merged into an otherwise empty node.
fn should_skip_merging(
    main: Option<&Map<String, Value>>,
    parts: &[&Map<String, Value>],
    occurrences: &[(String, Vec<&Value>)],
    version: SchemaVersion,
) -> bool {
    if !version.ref_ignores_siblings() {
        return false;
    }
    let reference = SchemaKeyword::Ref.for_version(version);
    if !occurrences.iter().any(|(key, _)| key == reference) {
        return false;
    }
    match main {
        None => parts.len() > 1,
        Some(main) => main.len() > 1 || parts.len() > 2,
    }
}

fn merge_values(keyword: SchemaKeyword, values: &[&Value], version: SchemaVersion) -> Option<Value> {
    match keyword {
        SchemaKeyword::AllOf | SchemaKeyword::Required => merge_arrays(values),
        SchemaKeyword::Properties => merge_object_properties(values),
        SchemaKeyword::Items | SchemaKeyword::AdditionalProperties => {
            merge_schemas(None, values, version).map(Value::Object)
        }
        SchemaKeyword::Type => overlap_of_types(values),
        SchemaKeyword::MaxItems
        | SchemaKeyword::Maximum
        | SchemaKeyword::ExclusiveMaximum
        | SchemaKeyword::MaxLength => pick_number(values, |candidate, current| candidate < current),
        SchemaKeyword::MinItems
        | SchemaKeyword::Minimum
        | SchemaKeyword::ExclusiveMinimum
        | SchemaKeyword::MinLength => pick_number(values, |candidate, current| candidate > current),
        _ => {
            let first = values[0];
            values[1..].iter().all(|value| *value == first).then(|| first.clone())
        }
    }
}

fn merge_arrays(values: &[&Value]) -> Option<Value> {
    let mut merged: Vec<Value> = Vec::new();
    for value in values {
        for item in value.as_array()? {
            if !merged.contains(item) {
                merged.push(item.clone());
            }
        }
    }
    Some(Value::Array(merged))
}

fn merge_object_properties(values: &[&Value]) -> Option<Value> {
    let mut merged = Map::new();
    for value in values {
        for (key, property) in value.as_object()? {
            match merged.get(key) {
                None => {
                    merged.insert(key.clone(), property.clone());
                }
                Some(existing) if existing == property => {}
                Some(_) => return None,
            }
        }
    }
    Some(Value::Object(merged))
}

fn overlap_of_types(values: &[&Value]) -> Option<Value> {
    let names = |value: &Value| -> Option<Vec<String>> {
        match value {
            Value::String(single) => Some(vec![single.clone()]),
            Value::Array(several) => several
                .iter()
                .map(|entry| entry.as_str().map(str::to_string))
                .collect(),
            _ => None,
        }
    };
    let mut overlap = names(values[0])?;
    for value in &values[1..] {
        let next = names(*value)?;
        overlap.retain(|name| next.contains(name));
        if overlap.is_empty() {
            return None;
        }
    }
    if overlap.len() == 1 {
        return overlap.pop().map(Value::String);
    }
    Some(Value::Array(overlap.into_iter().map(Value::String).collect()))
}

fn pick_number(values: &[&Value], replaces: fn(f64, f64) -> bool) -> Option<Value> {
    let mut picked = values[0];
    let mut picked_number = picked.as_f64()?;
    for value in &values[1..] {
        let number = value.as_f64()?;
        if replaces(number, picked_number) {
            picked = *value;
            picked_number = number;
        }
    }
    Some(picked.clone())
}

// ---------------------------------------------------------------------------
// Draft 04
// ---------------------------------------------------------------------------

/// Rewrite keywords draft 04 spells differently: `const` becomes a single
/// value `enum`, numeric exclusive bounds become boolean flags beside
/// `minimum`/`maximum`.
pub(crate) fn rewrite_for_draft4(schema: &mut Map<String, Value>) {
    if let Some(value) = schema.shift_remove("const") {
        schema
            .entry("enum")
            .or_insert_with(|| Value::Array(vec![value]));
    }
    rewrite_exclusive_bound(schema, "exclusiveMinimum", "minimum", |inclusive, exclusive| {
        inclusive > exclusive
    });
    rewrite_exclusive_bound(schema, "exclusiveMaximum", "maximum", |inclusive, exclusive| {
        inclusive < exclusive
    });
}

/// Draft 04 has one slot per side, so only the stricter of an inclusive and
/// an exclusive bound survives.
fn rewrite_exclusive_bound(
    schema: &mut Map<String, Value>,
    exclusive: &str,
    inclusive: &str,
    inclusive_is_stricter: fn(f64, f64) -> bool,
) {
    let Some(bound) = schema.get(exclusive).filter(|bound| bound.is_number()).cloned() else {
        return;
    };
    let keep_inclusive = match (schema.get(inclusive).and_then(Value::as_f64), bound.as_f64()) {
        (Some(inclusive), Some(exclusive)) => inclusive_is_stricter(inclusive, exclusive),
        _ => false,
    };
    if keep_inclusive {
        schema.shift_remove(exclusive);
    } else {
        schema.insert(inclusive.to_string(), bound);
        schema.insert(exclusive.to_string(), Value::Bool(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn cleaned(value: Value, version: SchemaVersion) -> Value {
        let mut schema = object(value);
        visit_schemas(&mut schema, version, &mut |node: &mut Map<String, Value>| {
            reduce_all_of(node, version);
            reduce_any_of(node, version);
        });
        Value::Object(schema)
    }

    #[test]
    fn compatible_all_of_parts_are_merged() {
        let schema = json!({
            "allOf": [
                {"type": "object", "properties": {"a": {"type": "string"}}, "required": ["a"]},
                {"properties": {"b": {"type": "integer"}}, "required": ["b"], "title": "Both"}
            ]
        });
        assert_eq!(
            cleaned(schema, SchemaVersion::Draft2020_12),
            json!({
                "type": "object",
                "properties": {"a": {"type": "string"}, "b": {"type": "integer"}},
                "required": ["a", "b"],
                "title": "Both"
            })
        );
    }

    #[test]
    fn conflicting_all_of_parts_are_kept() {
        let schema = json!({
            "allOf": [{"title": "One"}, {"title": "Two"}]
        });
        assert_eq!(cleaned(schema.clone(), SchemaVersion::Draft2020_12), schema);
    }

    #[test]
    fn reference_with_siblings_stays_wrapped_before_2019() {
        let schema = json!({
            "allOf": [{"$ref": "#/definitions/Foo"}, {"description": "member"}]
        });
        assert_eq!(cleaned(schema.clone(), SchemaVersion::Draft7), schema);
        assert_eq!(
            cleaned(schema, SchemaVersion::Draft2019_09),
            json!({"$ref": "#/definitions/Foo", "description": "member"})
        );
    }

    #[test]
    fn nested_any_of_is_flattened() {
        let schema = json!({
            "anyOf": [
                {"type": "null"},
                {"anyOf": [{"$ref": "#/$defs/A"}, {"$ref": "#/$defs/B"}]}
            ]
        });
        assert_eq!(
            cleaned(schema, SchemaVersion::Draft2020_12),
            json!({"anyOf": [{"type": "null"}, {"$ref": "#/$defs/A"}, {"$ref": "#/$defs/B"}]})
        );
    }

    #[test]
    fn draft4_rewrites_const_and_exclusive_bounds() {
        let mut schema = object(json!({"const": "x", "exclusiveMinimum": 0, "maximum": 9}));
        rewrite_for_draft4(&mut schema);
        assert_eq!(
            Value::Object(schema),
            json!({"exclusiveMinimum": true, "maximum": 9, "enum": ["x"], "minimum": 0})
        );
    }

    #[test]
    fn draft4_keeps_the_stricter_of_two_bounds() {
        let mut inclusive_wins = object(json!({"minimum": 5, "exclusiveMinimum": 3, "maximum": 7, "exclusiveMaximum": 9}));
        rewrite_for_draft4(&mut inclusive_wins);
        assert_eq!(Value::Object(inclusive_wins), json!({"minimum": 5, "maximum": 7}));

        let mut exclusive_wins = object(json!({"minimum": 2, "exclusiveMinimum": 3, "maximum": 9, "exclusiveMaximum": 9}));
        rewrite_for_draft4(&mut exclusive_wins);
        assert_eq!(
            Value::Object(exclusive_wins),
            json!({"minimum": 3, "exclusiveMinimum": true, "maximum": 9, "exclusiveMaximum": true})
        );
    }
}
