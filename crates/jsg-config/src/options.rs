//! Explicit option adjustments on top of a preset.

use std::collections::BTreeSet;

use jsg_core::{GeneratorOption, OptionPreset};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct OptionSettings {
    /// Options switched on in addition to the preset.
    #[serde(default)]
    pub enable: Vec<GeneratorOption>,

    /// Options switched off even if the preset enables them.
    #[serde(default)]
    pub disable: Vec<GeneratorOption>,
}

impl OptionSettings {
    /// Preset defaults with `enable` added and `disable` removed.
    #[must_use]
    pub fn resolve(&self, preset: OptionPreset) -> BTreeSet<GeneratorOption> {
        let mut enabled: BTreeSet<GeneratorOption> =
            preset.enabled_by_default().iter().copied().collect();
        enabled.extend(self.enable.iter().copied());
        for option in &self.disable {
            enabled.remove(option);
        }
        enabled
    }

    /// First option listed in both `enable` and `disable`, if any.
    #[must_use]
    pub fn conflicting(&self) -> Option<GeneratorOption> {
        self.enable
            .iter()
            .copied()
            .find(|option| self.disable.contains(option))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjustments_apply_to_preset() {
        let settings = OptionSettings {
            enable: vec![GeneratorOption::InlineAllSchemas],
            disable: vec![GeneratorOption::DeclaredSubtypes],
        };
        let enabled = settings.resolve(OptionPreset::Standard);
        assert!(enabled.contains(&GeneratorOption::InlineAllSchemas));
        assert!(enabled.contains(&GeneratorOption::FlattenedEnums));
        assert!(!enabled.contains(&GeneratorOption::DeclaredSubtypes));
        assert_eq!(settings.conflicting(), None);
    }

    #[test]
    fn conflict_is_detected() {
        let settings = OptionSettings {
            enable: vec![GeneratorOption::StaticFields],
            disable: vec![GeneratorOption::StaticFields],
        };
        assert_eq!(settings.conflicting(), Some(GeneratorOption::StaticFields));
    }
}
