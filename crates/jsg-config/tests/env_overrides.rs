//! Environment variables take precedence over TOML files.

use figment::Jail;
use jsg_config::GeneratorSettings;
use jsg_core::{OptionPreset, SchemaVersion};
use pretty_assertions::assert_eq;

#[test]
fn env_overrides_project_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "jsg.toml",
            r#"
schema_version = "draft_6"
preset = "plain"

[definitions]
nullable_suffix = "-toml"
"#,
        )?;
        jail.set_env("JSG_SCHEMA_VERSION", "draft_4");
        jail.set_env("JSG_DEFINITIONS__NULLABLE_SUFFIX", "-env");

        let settings = GeneratorSettings::load().map_err(|e| e.to_string())?;
        assert_eq!(settings.schema_version, SchemaVersion::Draft4);
        assert_eq!(settings.preset, OptionPreset::Plain);
        assert_eq!(settings.definitions.nullable_suffix, "-env");
        Ok(())
    });
}

#[test]
fn env_alone_configures_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("JSG_PRESET", "full");
        jail.set_env("JSG_SUBTYPES__COMPOSITION", "one_of");

        let settings: GeneratorSettings = GeneratorSettings::figment().extract()?;
        assert_eq!(settings.preset, OptionPreset::Full);
        assert_eq!(
            settings.subtypes.composition,
            jsg_core::SubtypeComposition::OneOf
        );
        Ok(())
    });
}
