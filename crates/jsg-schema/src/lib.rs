//! # jsg-schema
//!
//! JSON Schema generation over a declared type graph.
//!
//! A [`SchemaGenerator`] walks a type from a [`jsg_core::TypeUniverse`] depth
//! first, asking the resolvers of its [`SchemaGeneratorConfig`] for every
//! attribute. Types used in several places share one definition; the
//! document assembler names definitions, places them under `definitions` or
//! `$defs`, and replaces use sites with `$ref`s or inlined copies.
//!
//! ## Architecture
//!
//! - `config`: resolver chains per scope, frozen by the builder
//! - `context`: per-run traversal state handed to custom providers
//! - `registry` / `naming`: definition bookkeeping and naming strategies
//! - `assembler` / `cleanup`: placement of definitions and final clean-up
//! - `modules`: the built-in behaviour behind [`jsg_core::GeneratorOption`]s
//!
//! ```
//! use jsg_core::{FieldDeclaration, OptionPreset, SchemaVersion, TypeContext, TypeDeclaration, TypeUniverse};
//! use jsg_schema::{SchemaGenerator, SchemaGeneratorConfigBuilder};
//!
//! let mut universe = TypeUniverse::new();
//! universe
//!     .declare(
//!         TypeDeclaration::class("com.acme.Point")
//!             .field(FieldDeclaration::new("x", "int".parse().unwrap()))
//!             .field(FieldDeclaration::new("y", "int".parse().unwrap())),
//!     )
//!     .unwrap();
//! let builder = SchemaGeneratorConfigBuilder::new(
//!     TypeContext::new(universe),
//!     SchemaVersion::Draft2020_12,
//!     OptionPreset::Plain,
//! );
//! let generator = SchemaGenerator::new(builder.build());
//! let schema = generator.generate_schema(&"com.acme.Point".parse().unwrap()).unwrap();
//! assert_eq!(schema["properties"]["x"]["type"], "integer");
//! ```

mod assembler;
mod attributes;
mod cleanup;
pub mod config;
pub mod context;
pub mod custom;
pub mod error;
pub mod generator;
pub mod keyword;
pub mod modules;
pub mod naming;
pub mod registry;
pub mod subtypes;

pub use config::{
    AdditionalProperties, ConfigPart, GeneralConfigPart, MemberConfigPart, ResolverChain,
    SchemaGeneratorConfig, SchemaGeneratorConfigBuilder,
};
pub use context::SchemaGenerationContext;
pub use custom::{
    AttributeInclusion, CustomDefinition, CustomDefinitionProvider, CustomPropertyDefinition,
    CustomPropertyDefinitionProvider, DefinitionType, ProviderId,
};
pub use error::GeneratorError;
pub use generator::{CollectedDefinitions, MultiTypeSchemaBuilder, SchemaGenerator, SchemaReference};
pub use keyword::{SchemaKeyword, SchemaType};
pub use modules::Module;
pub use naming::{
    CleanNamingStrategy, DefaultNamingStrategy, DefinitionNamingStrategy, QualifiedNamingStrategy,
};
pub use registry::{DefinitionKey, DefinitionRegistry};
pub use subtypes::{DeclaredSubtypeResolver, SubtypeResolver};
