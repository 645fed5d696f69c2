//! Dialects, generator options, and presets shared by the jsg crates.
//!
//! All enums use `snake_case` serialization so they can be written directly in
//! TOML settings files and `JSG_*` environment variables.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SchemaVersion
// ---------------------------------------------------------------------------

/// JSON Schema dialect of the generated documents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum SchemaVersion {
    #[serde(rename = "draft_4")]
    Draft4,
    #[serde(rename = "draft_6")]
    Draft6,
    #[serde(rename = "draft_7")]
    Draft7,
    #[serde(rename = "draft_2019_09")]
    Draft2019_09,
    #[default]
    #[serde(rename = "draft_2020_12")]
    Draft2020_12,
}

impl SchemaVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft4 => "draft_4",
            Self::Draft6 => "draft_6",
            Self::Draft7 => "draft_7",
            Self::Draft2019_09 => "draft_2019_09",
            Self::Draft2020_12 => "draft_2020_12",
        }
    }

    /// Meta-schema URI written into the `$schema` keyword.
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Draft4 => "http://json-schema.org/draft-04/schema#",
            Self::Draft6 => "http://json-schema.org/draft-06/schema#",
            Self::Draft7 => "http://json-schema.org/draft-07/schema#",
            Self::Draft2019_09 => "https://json-schema.org/draft/2019-09/schema",
            Self::Draft2020_12 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// Whether `$ref` ignores sibling keywords in this dialect.
    #[must_use]
    pub const fn ref_ignores_siblings(self) -> bool {
        matches!(self, Self::Draft4 | Self::Draft6 | Self::Draft7)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GeneratorOption
// ---------------------------------------------------------------------------

/// Switchable generator behaviour. Most options register a built-in module
/// beneath any user configuration when the config builder is finalized.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorOption {
    SchemaVersionIndicator,
    AdditionalFixedTypes,
    FlattenedEnums,
    FlattenedOptionals,
    MapValuesAsAdditionalProperties,
    NullableFieldsByDefault,
    NullableMethodReturnValuesByDefault,
    NullableArrayItemsAllowed,
    NonStaticNonVoidMethods,
    StaticFields,
    DeclaredSubtypes,
    EnumKeywordForSingleValues,
    ForbiddenAdditionalPropertiesByDefault,
    DefinitionsForAllObjects,
    DefinitionForMainSchema,
    InlineAllSchemas,
    PlainDefinitionKeys,
    AllOfCleanupAtTheEnd,
}

impl GeneratorOption {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SchemaVersionIndicator => "schema_version_indicator",
            Self::AdditionalFixedTypes => "additional_fixed_types",
            Self::FlattenedEnums => "flattened_enums",
            Self::FlattenedOptionals => "flattened_optionals",
            Self::MapValuesAsAdditionalProperties => "map_values_as_additional_properties",
            Self::NullableFieldsByDefault => "nullable_fields_by_default",
            Self::NullableMethodReturnValuesByDefault => "nullable_method_return_values_by_default",
            Self::NullableArrayItemsAllowed => "nullable_array_items_allowed",
            Self::NonStaticNonVoidMethods => "non_static_non_void_methods",
            Self::StaticFields => "static_fields",
            Self::DeclaredSubtypes => "declared_subtypes",
            Self::EnumKeywordForSingleValues => "enum_keyword_for_single_values",
            Self::ForbiddenAdditionalPropertiesByDefault => {
                "forbidden_additional_properties_by_default"
            }
            Self::DefinitionsForAllObjects => "definitions_for_all_objects",
            Self::DefinitionForMainSchema => "definition_for_main_schema",
            Self::InlineAllSchemas => "inline_all_schemas",
            Self::PlainDefinitionKeys => "plain_definition_keys",
            Self::AllOfCleanupAtTheEnd => "all_of_cleanup_at_the_end",
        }
    }
}

impl fmt::Display for GeneratorOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OptionPreset
// ---------------------------------------------------------------------------

/// Named starting set of enabled [`GeneratorOption`]s.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum OptionPreset {
    Plain,
    #[default]
    Standard,
    Full,
}

impl OptionPreset {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Standard => "standard",
            Self::Full => "full",
        }
    }

    /// Options enabled by this preset before any explicit adjustments.
    #[must_use]
    pub const fn enabled_by_default(self) -> &'static [GeneratorOption] {
        use GeneratorOption as O;
        match self {
            Self::Plain => &[
                O::SchemaVersionIndicator,
                O::AdditionalFixedTypes,
                O::FlattenedEnums,
                O::FlattenedOptionals,
                O::AllOfCleanupAtTheEnd,
            ],
            Self::Standard => &[
                O::SchemaVersionIndicator,
                O::AdditionalFixedTypes,
                O::FlattenedEnums,
                O::FlattenedOptionals,
                O::AllOfCleanupAtTheEnd,
                O::MapValuesAsAdditionalProperties,
                O::DeclaredSubtypes,
            ],
            Self::Full => &[
                O::SchemaVersionIndicator,
                O::AdditionalFixedTypes,
                O::FlattenedEnums,
                O::FlattenedOptionals,
                O::AllOfCleanupAtTheEnd,
                O::MapValuesAsAdditionalProperties,
                O::DeclaredSubtypes,
                O::NullableFieldsByDefault,
                O::DefinitionsForAllObjects,
            ],
        }
    }
}

impl fmt::Display for OptionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SubtypeComposition
// ---------------------------------------------------------------------------

/// Combinator used when a definition lists more than one subtype.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SubtypeComposition {
    #[default]
    AnyOf,
    OneOf,
}

impl SubtypeComposition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AnyOf => "any_of",
            Self::OneOf => "one_of",
        }
    }
}

impl fmt::Display for SubtypeComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SchemaVersion::Draft4, "\"draft_4\"")]
    #[case(SchemaVersion::Draft7, "\"draft_7\"")]
    #[case(SchemaVersion::Draft2019_09, "\"draft_2019_09\"")]
    #[case(SchemaVersion::Draft2020_12, "\"draft_2020_12\"")]
    fn schema_version_serializes_like_as_str(#[case] version: SchemaVersion, #[case] json: &str) {
        assert_eq!(serde_json::to_string(&version).unwrap(), json);
        assert_eq!(format!("\"{version}\""), json);
        let back: SchemaVersion = serde_json::from_str(json).unwrap();
        assert_eq!(back, version);
    }

    #[test]
    fn option_serde_matches_as_str() {
        let option = GeneratorOption::ForbiddenAdditionalPropertiesByDefault;
        let json = serde_json::to_string(&option).unwrap();
        assert_eq!(json, format!("\"{}\"", option.as_str()));
    }

    #[test]
    fn presets_are_cumulative() {
        let plain = OptionPreset::Plain.enabled_by_default();
        let standard = OptionPreset::Standard.enabled_by_default();
        let full = OptionPreset::Full.enabled_by_default();
        assert!(plain.iter().all(|o| standard.contains(o)));
        assert!(standard.iter().all(|o| full.contains(o)));
        assert!(!standard.contains(&GeneratorOption::DefinitionsForAllObjects));
    }

    #[test]
    fn only_old_drafts_ignore_ref_siblings() {
        assert!(SchemaVersion::Draft7.ref_ignores_siblings());
        assert!(!SchemaVersion::Draft2019_09.ref_ignores_siblings());
    }
}
