//! Definition naming and disambiguation.
//!
//! A [`DefinitionNamingStrategy`] turns definition keys into names for the
//! definitions container. The generator always wraps the configured strategy
//! in a [`CleanNamingStrategy`] so names are URI-compatible (or plain).

pub mod cleanup;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::context::SchemaGenerationContext;
use crate::registry::DefinitionKey;

pub use cleanup::{ensure_definition_key_is_plain, ensure_definition_key_is_uri_compatible};

pub const DEFAULT_DUPLICATE_SEPARATOR: &str = "-";
pub const DEFAULT_NULLABLE_SUFFIX: &str = "-nullable";

pub trait DefinitionNamingStrategy: Send + Sync {
    /// Base name of a definition, before disambiguation.
    fn definition_name_for_key(&self, key: &DefinitionKey, context: &SchemaGenerationContext)
    -> String;

    /// Make the names of one group of keys sharing a base name distinct.
    ///
    /// Keys arrive in first-encounter order. The default keeps the first name
    /// and appends `-1`, `-2`, ... to the others. Implementations must not add
    /// or remove keys.
    fn adjust_duplicate_names(
        &self,
        names: &mut IndexMap<DefinitionKey, String>,
        _context: &SchemaGenerationContext,
    ) {
        suffix_duplicates(names, DEFAULT_DUPLICATE_SEPARATOR);
    }

    /// Name of the nullable variant of a named definition.
    fn adjust_nullable_name(
        &self,
        _key: &DefinitionKey,
        name: &str,
        _context: &SchemaGenerationContext,
    ) -> String {
        format!("{name}{DEFAULT_NULLABLE_SUFFIX}")
    }
}

/// Keep the first name, append `<separator><n>` to the n-th further one.
pub fn suffix_duplicates(names: &mut IndexMap<DefinitionKey, String>, separator: &str) {
    for (index, name) in names.values_mut().enumerate().skip(1) {
        *name = format!("{name}{separator}{index}");
    }
}

// ---------------------------------------------------------------------------
// DefaultNamingStrategy
// ---------------------------------------------------------------------------

/// Names definitions by the simple type description, e.g. `Map<String, Long>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultNamingStrategy {
    duplicate_separator: String,
    nullable_suffix: String,
}

impl DefaultNamingStrategy {
    #[must_use]
    pub fn new(duplicate_separator: impl Into<String>, nullable_suffix: impl Into<String>) -> Self {
        Self {
            duplicate_separator: duplicate_separator.into(),
            nullable_suffix: nullable_suffix.into(),
        }
    }

    #[must_use]
    pub fn duplicate_separator(&self) -> &str {
        &self.duplicate_separator
    }

    #[must_use]
    pub fn nullable_suffix(&self) -> &str {
        &self.nullable_suffix
    }
}

impl Default for DefaultNamingStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_SEPARATOR, DEFAULT_NULLABLE_SUFFIX)
    }
}

impl DefinitionNamingStrategy for DefaultNamingStrategy {
    fn definition_name_for_key(
        &self,
        key: &DefinitionKey,
        _context: &SchemaGenerationContext,
    ) -> String {
        key.ty().simple_description()
    }

    fn adjust_duplicate_names(
        &self,
        names: &mut IndexMap<DefinitionKey, String>,
        _context: &SchemaGenerationContext,
    ) {
        suffix_duplicates(names, &self.duplicate_separator);
    }

    fn adjust_nullable_name(
        &self,
        _key: &DefinitionKey,
        name: &str,
        _context: &SchemaGenerationContext,
    ) -> String {
        format!("{name}{}", self.nullable_suffix)
    }
}

// ---------------------------------------------------------------------------
// QualifiedNamingStrategy
// ---------------------------------------------------------------------------

/// Names definitions by the fully qualified type description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifiedNamingStrategy {
    base: DefaultNamingStrategy,
}

impl QualifiedNamingStrategy {
    #[must_use]
    pub const fn new(base: DefaultNamingStrategy) -> Self {
        Self { base }
    }
}

impl DefinitionNamingStrategy for QualifiedNamingStrategy {
    fn definition_name_for_key(
        &self,
        key: &DefinitionKey,
        _context: &SchemaGenerationContext,
    ) -> String {
        key.ty().full_description()
    }

    fn adjust_duplicate_names(
        &self,
        names: &mut IndexMap<DefinitionKey, String>,
        context: &SchemaGenerationContext,
    ) {
        self.base.adjust_duplicate_names(names, context);
    }

    fn adjust_nullable_name(
        &self,
        key: &DefinitionKey,
        name: &str,
        context: &SchemaGenerationContext,
    ) -> String {
        self.base.adjust_nullable_name(key, name, context)
    }
}

// ---------------------------------------------------------------------------
// CleanNamingStrategy
// ---------------------------------------------------------------------------

/// Applies a clean-up function to every name the wrapped strategy produces.
#[derive(Clone)]
pub struct CleanNamingStrategy {
    inner: Arc<dyn DefinitionNamingStrategy>,
    cleanup: fn(&str) -> String,
}

impl CleanNamingStrategy {
    #[must_use]
    pub fn new(inner: Arc<dyn DefinitionNamingStrategy>, cleanup: fn(&str) -> String) -> Self {
        Self { inner, cleanup }
    }

    #[must_use]
    pub fn uri_compatible(inner: Arc<dyn DefinitionNamingStrategy>) -> Self {
        Self::new(inner, ensure_definition_key_is_uri_compatible)
    }

    #[must_use]
    pub fn plain(inner: Arc<dyn DefinitionNamingStrategy>) -> Self {
        Self::new(inner, ensure_definition_key_is_plain)
    }
}

impl DefinitionNamingStrategy for CleanNamingStrategy {
    fn definition_name_for_key(
        &self,
        key: &DefinitionKey,
        context: &SchemaGenerationContext,
    ) -> String {
        (self.cleanup)(&self.inner.definition_name_for_key(key, context))
    }

    fn adjust_duplicate_names(
        &self,
        names: &mut IndexMap<DefinitionKey, String>,
        context: &SchemaGenerationContext,
    ) {
        self.inner.adjust_duplicate_names(names, context);
        for name in names.values_mut() {
            *name = (self.cleanup)(name);
        }
    }

    fn adjust_nullable_name(
        &self,
        key: &DefinitionKey,
        name: &str,
        context: &SchemaGenerationContext,
    ) -> String {
        (self.cleanup)(&self.inner.adjust_nullable_name(key, name, context))
    }
}

impl fmt::Debug for CleanNamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanNamingStrategy").finish_non_exhaustive()
    }
}
