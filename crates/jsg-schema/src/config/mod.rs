//! Generator configuration: resolver chains, providers, and options.
//!
//! Built once through [`SchemaGeneratorConfigBuilder`] and frozen into an
//! immutable [`SchemaGeneratorConfig`] shared by every run of a generator.

pub mod builder;
pub mod chain;
pub mod part;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use jsg_core::{GeneratorOption, MemberKind, MemberScope, SchemaVersion, SubtypeComposition, TypeContext};

use crate::keyword::SchemaKeyword;
use crate::naming::DefinitionNamingStrategy;

pub use builder::SchemaGeneratorConfigBuilder;
pub use chain::ResolverChain;
pub use part::{AdditionalProperties, ConfigPart, GeneralConfigPart, MemberConfigPart};

/// Frozen configuration. `Send + Sync`; cheap to share behind an `Arc`.
pub struct SchemaGeneratorConfig {
    pub(crate) type_context: TypeContext,
    pub(crate) version: SchemaVersion,
    pub(crate) options: BTreeSet<GeneratorOption>,
    pub(crate) subtype_composition: SubtypeComposition,
    pub(crate) fields: MemberConfigPart,
    pub(crate) methods: MemberConfigPart,
    pub(crate) general: GeneralConfigPart,
    pub(crate) naming_strategy: Arc<dyn DefinitionNamingStrategy>,
}

impl SchemaGeneratorConfig {
    #[must_use]
    pub const fn type_context(&self) -> &TypeContext {
        &self.type_context
    }

    #[must_use]
    pub const fn version(&self) -> SchemaVersion {
        self.version
    }

    #[must_use]
    pub const fn options(&self) -> &BTreeSet<GeneratorOption> {
        &self.options
    }

    #[must_use]
    pub fn is_enabled(&self, option: GeneratorOption) -> bool {
        self.options.contains(&option)
    }

    /// Spelling of `keyword` in the configured dialect.
    #[must_use]
    pub const fn keyword(&self, keyword: SchemaKeyword) -> &'static str {
        keyword.for_version(self.version)
    }

    #[must_use]
    pub const fn subtype_composition(&self) -> SubtypeComposition {
        self.subtype_composition
    }

    #[must_use]
    pub const fn fields(&self) -> &MemberConfigPart {
        &self.fields
    }

    #[must_use]
    pub const fn methods(&self) -> &MemberConfigPart {
        &self.methods
    }

    #[must_use]
    pub const fn member_part(&self, member: &MemberScope) -> &MemberConfigPart {
        match member.kind() {
            MemberKind::Field => &self.fields,
            MemberKind::Method => &self.methods,
        }
    }

    #[must_use]
    pub const fn general(&self) -> &GeneralConfigPart {
        &self.general
    }

    #[must_use]
    pub fn naming_strategy(&self) -> Arc<dyn DefinitionNamingStrategy> {
        Arc::clone(&self.naming_strategy)
    }

    /// Notify every stateful provider and resolver that a run begins or ends.
    pub(crate) fn reset_providers(&self) {
        for provider in &self.general.custom_definition_providers {
            provider.reset_for_new_run();
        }
        for resolver in &self.general.subtype_resolvers {
            resolver.reset_for_new_run();
        }
        for provider in self
            .fields
            .custom_definition_providers
            .iter()
            .chain(&self.methods.custom_definition_providers)
        {
            provider.reset_for_new_run();
        }
    }
}

impl fmt::Debug for SchemaGeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaGeneratorConfig")
            .field("version", &self.version)
            .field("options", &self.options)
            .field("subtype_composition", &self.subtype_composition)
            .finish_non_exhaustive()
    }
}
