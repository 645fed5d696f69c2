//! Subtype composition settings.

use jsg_core::SubtypeComposition;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct SubtypeSettings {
    /// Combinator for definitions with more than one subtype.
    #[serde(default)]
    pub composition: SubtypeComposition,
}
