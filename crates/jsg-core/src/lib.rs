//! # jsg-core
//!
//! Type model and type resolution for the jsg JSON Schema generator.
//!
//! Rust has no runtime reflection, so the types a schema is generated for are
//! declared up front in a [`TypeUniverse`]: classes, interfaces, enums and
//! generic types with their fields, methods and opaque annotations.
//! [`TypeContext`] resolves raw [`TypeRef`]s into canonical
//! [`TypeDescriptor`]s and exposes members as [`MemberScope`]s.
//!
//! ```
//! use jsg_core::{FieldDeclaration, TypeContext, TypeDeclaration, TypeRef, TypeUniverse};
//!
//! let mut universe = TypeUniverse::new();
//! universe
//!     .declare(
//!         TypeDeclaration::class("com.acme.Pair")
//!             .type_param("T")
//!             .field(FieldDeclaration::new("left", TypeRef::var("T")))
//!             .field(FieldDeclaration::new("right", TypeRef::var("T"))),
//!     )
//!     .unwrap();
//! let context = TypeContext::new(universe);
//! let pair = context.parse("com.acme.Pair<Integer>").unwrap();
//! let fields = context.fields_of(&pair).unwrap();
//! assert_eq!(fields[0].member_type().simple_description(), "Integer");
//! ```

pub mod context;
pub mod declaration;
pub mod descriptor;
pub mod enums;
pub mod errors;
pub mod scope;
pub mod type_ref;
pub mod universe;

pub use context::{TypeBindings, TypeContext};
pub use declaration::{Annotations, FieldDeclaration, MethodDeclaration, TypeDeclaration, TypeKind};
pub use descriptor::{ARRAY_TYPE_NAME, TypeDescriptor};
pub use enums::{GeneratorOption, OptionPreset, SchemaVersion, SubtypeComposition};
pub use errors::CoreError;
pub use scope::{AnnotationLookup, MemberKind, MemberScope, TypeScope};
pub use type_ref::TypeRef;
pub use universe::{TypeUniverse, builtins};
