//! Schema keywords and their spelling per dialect.

use jsg_core::SchemaVersion;

/// A JSON Schema keyword used by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKeyword {
    Schema,
    Id,
    Anchor,
    Definitions,
    Ref,
    Type,
    Properties,
    Items,
    Required,
    AdditionalProperties,
    PatternProperties,
    AllOf,
    AnyOf,
    OneOf,
    Const,
    Enum,
    Title,
    Description,
    Default,
    ReadOnly,
    WriteOnly,
    MinLength,
    MaxLength,
    Format,
    Pattern,
    Minimum,
    ExclusiveMinimum,
    Maximum,
    ExclusiveMaximum,
    MultipleOf,
    MinItems,
    MaxItems,
    UniqueItems,
}

impl SchemaKeyword {
    /// Spelling of this keyword in the given dialect.
    #[must_use]
    pub const fn for_version(self, version: SchemaVersion) -> &'static str {
        match self {
            Self::Schema => "$schema",
            Self::Id => match version {
                SchemaVersion::Draft4 => "id",
                _ => "$id",
            },
            Self::Anchor => "$anchor",
            Self::Definitions => match version {
                SchemaVersion::Draft4 | SchemaVersion::Draft6 | SchemaVersion::Draft7 => {
                    "definitions"
                }
                SchemaVersion::Draft2019_09 | SchemaVersion::Draft2020_12 => "$defs",
            },
            Self::Ref => "$ref",
            Self::Type => "type",
            Self::Properties => "properties",
            Self::Items => "items",
            Self::Required => "required",
            Self::AdditionalProperties => "additionalProperties",
            Self::PatternProperties => "patternProperties",
            Self::AllOf => "allOf",
            Self::AnyOf => "anyOf",
            Self::OneOf => "oneOf",
            Self::Const => "const",
            Self::Enum => "enum",
            Self::Title => "title",
            Self::Description => "description",
            Self::Default => "default",
            Self::ReadOnly => "readOnly",
            Self::WriteOnly => "writeOnly",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Format => "format",
            Self::Pattern => "pattern",
            Self::Minimum => "minimum",
            Self::ExclusiveMinimum => "exclusiveMinimum",
            Self::Maximum => "maximum",
            Self::ExclusiveMaximum => "exclusiveMaximum",
            Self::MultipleOf => "multipleOf",
            Self::MinItems => "minItems",
            Self::MaxItems => "maxItems",
            Self::UniqueItems => "uniqueItems",
        }
    }

    /// Whether the dialect knows this keyword at all.
    #[must_use]
    pub const fn is_supported_by(self, version: SchemaVersion) -> bool {
        match self {
            Self::Anchor => matches!(
                version,
                SchemaVersion::Draft2019_09 | SchemaVersion::Draft2020_12
            ),
            Self::Const | Self::ReadOnly => !matches!(version, SchemaVersion::Draft4),
            Self::WriteOnly => !matches!(version, SchemaVersion::Draft4 | SchemaVersion::Draft6),
            _ => true,
        }
    }
}

/// Values of the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Null,
    Array,
    Object,
    String,
    Boolean,
    Integer,
    Number,
}

impl SchemaType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Array => "array",
            Self::Object => "object",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SchemaVersion::Draft4, "definitions", "id")]
    #[case(SchemaVersion::Draft7, "definitions", "$id")]
    #[case(SchemaVersion::Draft2019_09, "$defs", "$id")]
    #[case(SchemaVersion::Draft2020_12, "$defs", "$id")]
    fn dialect_specific_spellings(
        #[case] version: SchemaVersion,
        #[case] definitions: &str,
        #[case] id: &str,
    ) {
        assert_eq!(SchemaKeyword::Definitions.for_version(version), definitions);
        assert_eq!(SchemaKeyword::Id.for_version(version), id);
        assert_eq!(SchemaKeyword::Ref.for_version(version), "$ref");
    }

    #[test]
    fn anchor_only_in_recent_dialects() {
        assert!(!SchemaKeyword::Anchor.is_supported_by(SchemaVersion::Draft7));
        assert!(SchemaKeyword::Anchor.is_supported_by(SchemaVersion::Draft2019_09));
    }
}
