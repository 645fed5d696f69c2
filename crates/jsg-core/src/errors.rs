//! Type resolution error types.
//!
//! These errors abort a generation run: a type reference that cannot be
//! resolved leaves no sensible schema to emit. Errors raised by the schema
//! engine itself live in `jsg-schema`.

use thiserror::Error;

/// Errors raised while declaring or resolving types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No declaration exists for the referenced type name.
    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    /// A type variable was referenced outside of any binding for it.
    #[error("Unbound type variable '{name}'")]
    UnboundTypeVariable { name: String },

    /// A generic type was given the wrong number of type arguments.
    #[error("Type {name} expects {expected} type argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A type with the same fully qualified name was declared twice.
    #[error("Type already declared: {name}")]
    DuplicateDeclaration { name: String },

    /// A textual type reference could not be parsed.
    #[error("Malformed type reference '{input}': {reason}")]
    MalformedTypeReference { input: String, reason: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
