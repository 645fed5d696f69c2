//! Integration tests for TOML settings loading.
//!
//! Uses figment::Jail for sandboxed working directories and env vars.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use jsg_config::{ConfigError, GeneratorSettings};
use jsg_core::{GeneratorOption, OptionPreset, SchemaVersion, SubtypeComposition};
use pretty_assertions::assert_eq;

#[test]
fn loads_all_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "settings.toml",
            r#"
schema_version = "draft_7"
preset = "full"

[options]
enable = ["definition_for_main_schema", "plain_definition_keys"]
disable = ["declared_subtypes"]

[subtypes]
composition = "one_of"

[definitions]
nullable_suffix = "OrNull"
duplicate_separator = "_"
qualified_names = true
"#,
        )?;

        let settings: GeneratorSettings =
            Figment::from(Serialized::defaults(GeneratorSettings::default()))
                .merge(Toml::file("settings.toml"))
                .extract()?;

        assert_eq!(settings.schema_version, SchemaVersion::Draft7);
        assert_eq!(settings.preset, OptionPreset::Full);
        assert_eq!(settings.subtypes.composition, SubtypeComposition::OneOf);
        assert_eq!(settings.definitions.nullable_suffix, "OrNull");
        assert_eq!(settings.definitions.duplicate_separator, "_");
        assert!(settings.definitions.qualified_names);

        let enabled = settings.enabled_options();
        assert!(enabled.contains(&GeneratorOption::DefinitionForMainSchema));
        assert!(enabled.contains(&GeneratorOption::NullableFieldsByDefault));
        assert!(!enabled.contains(&GeneratorOption::DeclaredSubtypes));
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_file("jsg.toml", "schema_version = \"draft_2019_09\"\n")?;

        let settings = GeneratorSettings::load().map_err(|e| e.to_string())?;
        assert_eq!(settings.schema_version, SchemaVersion::Draft2019_09);
        assert_eq!(settings.preset, OptionPreset::Standard);
        Ok(())
    });
}

#[test]
fn missing_sections_keep_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("partial.toml", "[definitions]\nduplicate_separator = \"~\"\n")?;

        let settings = GeneratorSettings::load_from("partial.toml").map_err(|e| e.to_string())?;
        assert_eq!(settings.definitions.duplicate_separator, "~");
        assert_eq!(settings.definitions.nullable_suffix, "-nullable");
        assert_eq!(settings.schema_version, SchemaVersion::Draft2020_12);
        Ok(())
    });
}

#[test]
fn unknown_option_name_fails_extraction() {
    Jail::expect_with(|jail| {
        jail.create_file("bad.toml", "[options]\nenable = [\"no_such_option\"]\n")?;

        let err = GeneratorSettings::load_from("bad.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}

#[test]
fn contradictory_options_fail_validation() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "contradiction.toml",
            "[options]\nenable = [\"static_fields\"]\ndisable = [\"static_fields\"]\n",
        )?;

        let err = GeneratorSettings::load_from("contradiction.toml").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field, .. } if field == "options"));
        Ok(())
    });
}

#[test]
fn settings_schema_accepts_a_settings_document() {
    let schema = GeneratorSettings::json_schema().unwrap();
    let validator = jsonschema::validator_for(&schema).unwrap();

    let settings = serde_json::to_value(GeneratorSettings::default()).unwrap();
    assert!(validator.is_valid(&settings));

    let wrong = serde_json::json!({ "schema_version": "draft_5" });
    assert!(!validator.is_valid(&wrong));
}

#[test]
fn load_from_reads_a_file_outside_the_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("generator.toml");
    std::fs::write(&path, "preset = \"plain\"\n[subtypes]\ncomposition = \"one_of\"\n").unwrap();

    let settings = GeneratorSettings::load_from(&path).unwrap();
    assert_eq!(settings.preset, OptionPreset::Plain);
    assert_eq!(settings.subtypes.composition, SubtypeComposition::OneOf);
}
