//! Errors raised while generating a schema.

use jsg_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A type reference could not be resolved against the universe.
    #[error(transparent)]
    Type(#[from] CoreError),

    /// Distinct definitions ended up with the same name after disambiguation.
    #[error("Duplicate definition names: {}", names.join(", "))]
    DuplicateDefinitionNames { names: Vec<String> },

    /// A naming strategy added or removed keys while disambiguating a group.
    #[error("Naming strategy altered the definition group '{name}' ({expected} keys in, {found} out)")]
    NamingStrategyAlteredGroup {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A type must be inlined into its own definition.
    #[error("Circular inlining of '{type_description}'")]
    CircularInlining { type_description: String },

    /// A custom definition provider or subtype resolver failed.
    #[error("Provider error: {0}")]
    Provider(#[from] anyhow::Error),
}
