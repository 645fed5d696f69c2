//! Definition naming settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_nullable_suffix() -> String {
    "-nullable".to_string()
}

fn default_duplicate_separator() -> String {
    "-".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct DefinitionSettings {
    /// Appended to a definition name for its nullable variant.
    #[serde(default = "default_nullable_suffix")]
    pub nullable_suffix: String,

    /// Placed between a duplicated definition name and its counter.
    #[serde(default = "default_duplicate_separator")]
    pub duplicate_separator: String,

    /// Name definitions by their fully qualified type, e.g. `acme.Address`.
    #[serde(default)]
    pub qualified_names: bool,
}

impl Default for DefinitionSettings {
    fn default() -> Self {
        Self {
            nullable_suffix: default_nullable_suffix(),
            duplicate_separator: default_duplicate_separator(),
            qualified_names: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let settings = DefinitionSettings::default();
        assert_eq!(settings.nullable_suffix, "-nullable");
        assert_eq!(settings.duplicate_separator, "-");
        assert!(!settings.qualified_names);
    }
}
