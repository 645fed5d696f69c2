//! Type declarations registered in a [`crate::TypeUniverse`].
//!
//! Declarations are built with consuming builder methods:
//!
//! ```
//! use jsg_core::{FieldDeclaration, TypeDeclaration, TypeRef};
//! use serde_json::json;
//!
//! let person = TypeDeclaration::class("com.acme.Person")
//!     .field(FieldDeclaration::new("name", TypeRef::named("String")).annotation("required", json!(true)))
//!     .field(FieldDeclaration::new("friends", "List<com.acme.Person>".parse().unwrap()));
//! assert_eq!(person.fields.len(), 2);
//! ```

use indexmap::IndexMap;
use serde_json::Value;

use crate::type_ref::TypeRef;

/// Opaque metadata attached to declarations, keyed by a marker name.
///
/// The engine never interprets annotation payloads; modules read them through
/// [`crate::AnnotationLookup`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations(IndexMap<String, Value>);

impl Annotations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, marker: impl Into<String>, payload: Value) {
        self.0.insert(marker.into(), payload);
    }

    #[must_use]
    pub fn get(&self, marker: &str) -> Option<&Value> {
        self.0.get(marker)
    }

    #[must_use]
    pub fn contains(&self, marker: &str) -> bool {
        self.0.contains_key(marker)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Primitive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    /// Fully qualified name, e.g. `com.acme.Person`.
    pub name: String,
    pub kind: TypeKind,
    pub is_abstract: bool,
    pub type_params: Vec<String>,
    pub supertype: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldDeclaration>,
    pub methods: Vec<MethodDeclaration>,
    pub enum_constants: Vec<String>,
    pub annotations: Annotations,
}

impl TypeDeclaration {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_abstract: false,
            type_params: Vec::new(),
            supertype: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            enum_constants: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    #[must_use]
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    #[must_use]
    pub fn enumeration<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut declaration = Self::new(name, TypeKind::Enum);
        declaration.enum_constants = constants.into_iter().map(Into::into).collect();
        declaration
    }

    #[must_use]
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Primitive)
    }

    #[must_use]
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    #[must_use]
    pub fn extends(mut self, supertype: TypeRef) -> Self {
        self.supertype = Some(supertype);
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodDeclaration) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn annotation(mut self, marker: impl Into<String>, payload: Value) -> Self {
        self.annotations.insert(marker, payload);
        self
    }

    /// Interfaces and abstract classes cannot be instantiated directly.
    #[must_use]
    pub fn is_abstract_or_interface(&self) -> bool {
        self.is_abstract || self.kind == TypeKind::Interface
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
    pub annotations: Annotations,
    /// Annotations applying to the elements when the field is a container.
    pub item_annotations: Annotations,
}

impl FieldDeclaration {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            annotations: Annotations::new(),
            item_annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn annotation(mut self, marker: impl Into<String>, payload: Value) -> Self {
        self.annotations.insert(marker, payload);
        self
    }

    #[must_use]
    pub fn item_annotation(mut self, marker: impl Into<String>, payload: Value) -> Self {
        self.item_annotations.insert(marker, payload);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub name: String,
    /// `None` for methods without a return value.
    pub return_type: Option<TypeRef>,
    pub is_static: bool,
    pub annotations: Annotations,
    pub item_annotations: Annotations,
}

impl MethodDeclaration {
    #[must_use]
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            return_type: Some(return_type),
            is_static: false,
            annotations: Annotations::new(),
            item_annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn void(name: impl Into<String>) -> Self {
        Self {
            return_type: None,
            ..Self::new(name, TypeRef::named(crate::builtins::VOID))
        }
    }

    #[must_use]
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn annotation(mut self, marker: impl Into<String>, payload: Value) -> Self {
        self.annotations.insert(marker, payload);
        self
    }

    #[must_use]
    pub fn item_annotation(mut self, marker: impl Into<String>, payload: Value) -> Self {
        self.item_annotations.insert(marker, payload);
        self
    }
}
