//! Scopes handed to attribute resolvers.
//!
//! A [`TypeScope`] is a resolved type seen on its own; a [`MemberScope`] is a
//! field or method as it appears in one particular declaring instantiation.
//! Both expose declaration metadata through [`AnnotationLookup`].

use serde_json::Value;

use crate::context::TypeContext;
use crate::declaration::{Annotations, FieldDeclaration, MethodDeclaration, TypeDeclaration};
use crate::descriptor::TypeDescriptor;
use crate::errors::CoreError;
use crate::universe::builtins;

/// Read access to the opaque annotations of a declaration.
///
/// This is the only way ecosystem modules see annotation payloads; the
/// generator itself never inspects them.
pub trait AnnotationLookup {
    fn annotation(&self, marker: &str) -> Option<&Value>;

    fn has_annotation(&self, marker: &str) -> bool {
        self.annotation(marker).is_some()
    }
}

// ---------------------------------------------------------------------------
// TypeScope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TypeScope {
    ty: TypeDescriptor,
    context: TypeContext,
}

impl TypeScope {
    #[must_use]
    pub const fn new(ty: TypeDescriptor, context: TypeContext) -> Self {
        Self { ty, context }
    }

    #[must_use]
    pub const fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    #[must_use]
    pub const fn context(&self) -> &TypeContext {
        &self.context
    }

    #[must_use]
    pub fn declaration(&self) -> Option<&TypeDeclaration> {
        self.context.declaration(&self.ty)
    }

    /// # Errors
    ///
    /// Propagates resolution errors from supertype references.
    pub fn is_container_type(&self) -> Result<bool, CoreError> {
        self.context.is_container_type(&self.ty)
    }

    /// # Errors
    ///
    /// Propagates resolution errors from supertype references.
    pub fn container_item_type(&self) -> Result<Option<TypeDescriptor>, CoreError> {
        self.context.container_item_type(&self.ty)
    }

    #[must_use]
    pub fn simple_type_description(&self) -> String {
        self.ty.simple_description()
    }
}

impl AnnotationLookup for TypeScope {
    fn annotation(&self, marker: &str) -> Option<&Value> {
        self.declaration()?.annotations.get(marker)
    }
}

// ---------------------------------------------------------------------------
// MemberScope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

/// A field or method within a specific declaring instantiation.
#[derive(Debug, Clone)]
pub struct MemberScope {
    kind: MemberKind,
    declared_name: String,
    declaring_type: TypeDescriptor,
    declared_type: TypeDescriptor,
    override_type: Option<TypeDescriptor>,
    override_name: Option<String>,
    is_static: bool,
    fake_container_item: bool,
    annotations: Annotations,
    item_annotations: Annotations,
    context: TypeContext,
}

impl MemberScope {
    pub(crate) fn for_field(
        context: TypeContext,
        declaring_type: TypeDescriptor,
        field: &FieldDeclaration,
        field_type: TypeDescriptor,
    ) -> Self {
        Self {
            kind: MemberKind::Field,
            declared_name: field.name.clone(),
            declaring_type,
            declared_type: field_type,
            override_type: None,
            override_name: None,
            is_static: field.is_static,
            fake_container_item: false,
            annotations: field.annotations.clone(),
            item_annotations: field.item_annotations.clone(),
            context,
        }
    }

    pub(crate) fn for_method(
        context: TypeContext,
        declaring_type: TypeDescriptor,
        method: &MethodDeclaration,
        return_type: TypeDescriptor,
    ) -> Self {
        Self {
            kind: MemberKind::Method,
            declared_name: method.name.clone(),
            declaring_type,
            declared_type: return_type,
            override_type: None,
            override_name: None,
            is_static: method.is_static,
            fake_container_item: false,
            annotations: method.annotations.clone(),
            item_annotations: method.item_annotations.clone(),
            context,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> MemberKind {
        self.kind
    }

    #[must_use]
    pub fn is_field(&self) -> bool {
        self.kind == MemberKind::Field
    }

    #[must_use]
    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    /// Name as written in the declaration.
    #[must_use]
    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    /// Field name, or method name followed by `()`.
    #[must_use]
    pub fn name(&self) -> String {
        match self.kind {
            MemberKind::Field => self.declared_name.clone(),
            MemberKind::Method => format!("{}()", self.declared_name),
        }
    }

    /// Property name used in the generated `properties`.
    #[must_use]
    pub fn schema_property_name(&self) -> String {
        self.override_name.clone().unwrap_or_else(|| self.name())
    }

    #[must_use]
    pub const fn declaring_type(&self) -> &TypeDescriptor {
        &self.declaring_type
    }

    /// Type as declared, ignoring any override.
    #[must_use]
    pub const fn declared_type(&self) -> &TypeDescriptor {
        &self.declared_type
    }

    /// Effective type: the override if one was applied, else the declared type.
    #[must_use]
    pub fn member_type(&self) -> &TypeDescriptor {
        self.override_type.as_ref().unwrap_or(&self.declared_type)
    }

    #[must_use]
    pub const fn override_type(&self) -> Option<&TypeDescriptor> {
        self.override_type.as_ref()
    }

    #[must_use]
    pub fn override_name(&self) -> Option<&str> {
        self.override_name.as_deref()
    }

    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.is_method() && self.declared_type.is_erased(builtins::VOID)
    }

    /// Whether this scope stands for the elements of a container member.
    #[must_use]
    pub const fn is_fake_container_item_scope(&self) -> bool {
        self.fake_container_item
    }

    #[must_use]
    pub const fn context(&self) -> &TypeContext {
        &self.context
    }

    #[must_use]
    pub fn with_overridden_type(&self, ty: TypeDescriptor) -> Self {
        Self {
            override_type: Some(ty),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_overridden_name(&self, name: impl Into<String>) -> Self {
        Self {
            override_name: Some(name.into()),
            ..self.clone()
        }
    }

    /// Scope for the elements of this container member, or `None` when the
    /// member type is not a container.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from supertype references.
    pub fn as_fake_container_item_scope(&self) -> Result<Option<Self>, CoreError> {
        Ok(self.container_item_type()?.map(|item| Self {
            override_type: Some(item),
            fake_container_item: true,
            ..self.clone()
        }))
    }

    /// # Errors
    ///
    /// Propagates resolution errors from supertype references.
    pub fn is_container_type(&self) -> Result<bool, CoreError> {
        self.context.is_container_type(self.member_type())
    }

    /// # Errors
    ///
    /// Propagates resolution errors from supertype references.
    pub fn container_item_type(&self) -> Result<Option<TypeDescriptor>, CoreError> {
        self.context.container_item_type(self.member_type())
    }

    /// The member's effective type as a standalone scope.
    #[must_use]
    pub fn type_scope(&self) -> TypeScope {
        TypeScope::new(self.member_type().clone(), self.context.clone())
    }
}

impl AnnotationLookup for MemberScope {
    fn annotation(&self, marker: &str) -> Option<&Value> {
        if self.fake_container_item {
            self.item_annotations.get(marker)
        } else {
            self.annotations.get(marker)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_ref::TypeRef;
    use crate::universe::TypeUniverse;
    use serde_json::json;

    fn tagged_members() -> Vec<MemberScope> {
        let mut universe = TypeUniverse::new();
        universe
            .declare(
                TypeDeclaration::class("test.Tagged")
                    .annotation("doc", json!("a tagged thing"))
                    .field(
                        FieldDeclaration::new("tags", "List<String>".parse().unwrap())
                            .annotation("size", json!({"min": 1}))
                            .item_annotation("pattern", json!("^[a-z]+$")),
                    )
                    .method(MethodDeclaration::new("getCount", TypeRef::named("int")))
                    .method(MethodDeclaration::void("reset")),
            )
            .unwrap();
        let ctx = TypeContext::new(universe);
        let ty = ctx.parse("test.Tagged").unwrap();
        let mut members = ctx.fields_of(&ty).unwrap();
        members.extend(ctx.methods_of(&ty).unwrap());
        members
    }

    #[test]
    fn member_names() {
        let members = tagged_members();
        let names: Vec<String> = members.iter().map(MemberScope::name).collect();
        assert_eq!(names, vec!["tags", "getCount()", "reset()"]);
        assert!(members[2].is_void());
        assert!(!members[1].is_void());

        let renamed = members[0].with_overridden_name("labels");
        assert_eq!(renamed.schema_property_name(), "labels");
        assert_eq!(renamed.declared_name(), "tags");
    }

    #[test]
    fn item_scope_reads_item_annotations() {
        let members = tagged_members();
        let tags = &members[0];
        assert!(tags.has_annotation("size"));
        assert!(!tags.has_annotation("pattern"));

        let item = tags.as_fake_container_item_scope().unwrap().unwrap();
        assert!(item.is_fake_container_item_scope());
        assert_eq!(item.member_type().simple_description(), "String");
        assert_eq!(item.annotation("pattern"), Some(&json!("^[a-z]+$")));
        assert!(!item.has_annotation("size"));

        assert!(members[1].as_fake_container_item_scope().unwrap().is_none());
    }

    #[test]
    fn type_scope_reads_declaration_annotations() {
        let members = tagged_members();
        let declaring = members[0].context().type_scope(members[0].declaring_type());
        assert_eq!(declaring.annotation("doc"), Some(&json!("a tagged thing")));
    }
}
