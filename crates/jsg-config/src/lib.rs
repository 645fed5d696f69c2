//! # jsg-config
//!
//! Layered settings loading for the jsg schema generator using figment.
//!
//! Settings sources (in priority order, highest wins):
//! 1. Environment variables (`JSG_*` prefix, `__` as separator)
//! 2. Project-level `jsg.toml`
//! 3. User-level `~/.config/jsg/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `JSG_SCHEMA_VERSION` -> `schema_version` and
//! `JSG_DEFINITIONS__NULLABLE_SUFFIX` -> `definitions.nullable_suffix`.
//!
//! # Usage
//!
//! ```no_run
//! use jsg_config::GeneratorSettings;
//!
//! let settings = GeneratorSettings::load().expect("settings");
//! println!("dialect: {}", settings.schema_version);
//! ```

mod definitions;
mod error;
mod options;
mod subtypes;

pub use definitions::DefinitionSettings;
pub use error::ConfigError;
pub use options::OptionSettings;
pub use subtypes::SubtypeSettings;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use jsg_core::{GeneratorOption, OptionPreset, SchemaVersion};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name of the project-level settings file, looked up in the working directory.
pub const PROJECT_FILE: &str = "jsg.toml";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "JSG_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct GeneratorSettings {
    #[serde(default)]
    pub schema_version: SchemaVersion,
    #[serde(default)]
    pub preset: OptionPreset,
    #[serde(default)]
    pub options: OptionSettings,
    #[serde(default)]
    pub subtypes: SubtypeSettings,
    #[serde(default)]
    pub definitions: DefinitionSettings,
}

impl GeneratorSettings {
    /// Load settings from all sources and validate them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` when a source cannot be parsed and
    /// `ConfigError::InvalidValue` when validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Self = Self::figment().extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from defaults, one explicit TOML file, and the
    /// environment. The global and project files are not consulted.
    ///
    /// # Errors
    ///
    /// See [`GeneratorSettings::load`].
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(PROJECT_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Path to the user-global settings file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jsg").join("config.toml"))
    }

    /// Reject settings that cannot produce a usable generator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(option) = self.options.conflicting() {
            return Err(ConfigError::InvalidValue {
                field: "options".to_string(),
                reason: format!("'{option}' is both enabled and disabled"),
            });
        }
        if self.definitions.nullable_suffix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "definitions.nullable_suffix".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.definitions.duplicate_separator.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "definitions.duplicate_separator".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        let enabled = self.enabled_options();
        if enabled.contains(&GeneratorOption::InlineAllSchemas)
            && enabled.contains(&GeneratorOption::DefinitionsForAllObjects)
        {
            return Err(ConfigError::InvalidValue {
                field: "options".to_string(),
                reason: "inline_all_schemas cannot be combined with definitions_for_all_objects"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Options in effect after applying the explicit adjustments to the preset.
    #[must_use]
    pub fn enabled_options(&self) -> BTreeSet<GeneratorOption> {
        self.options.resolve(self.preset)
    }

    /// JSON Schema describing the settings file format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Schema` if the schema cannot be rendered as JSON.
    pub fn json_schema() -> Result<serde_json::Value, ConfigError> {
        Ok(serde_json::to_value(schemars::schema_for!(Self))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = GeneratorSettings::default();
        assert_eq!(settings.schema_version, SchemaVersion::Draft2020_12);
        assert_eq!(settings.preset, OptionPreset::Standard);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn figment_builds_without_files() {
        let settings: GeneratorSettings = GeneratorSettings::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(settings.definitions.nullable_suffix, "-nullable");
    }

    #[test]
    fn empty_suffix_is_rejected() {
        let mut settings = GeneratorSettings::default();
        settings.definitions.nullable_suffix.clear();
        let err = settings.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { field, .. } if field == "definitions.nullable_suffix")
        );
    }

    #[test]
    fn inline_all_conflicts_with_definitions_for_all() {
        let mut settings = GeneratorSettings {
            preset: OptionPreset::Full,
            ..GeneratorSettings::default()
        };
        settings.options.enable.push(GeneratorOption::InlineAllSchemas);
        assert!(settings.validate().is_err());
    }
}
