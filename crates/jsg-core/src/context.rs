//! Type resolution against a [`TypeUniverse`].
//!
//! `TypeContext` binds generic type variables through inheritance (a
//! `StringBox extends Box<String>` sees `Box.value: T` as `String`) and through
//! composition (a field `Box<T> inner` inside `Pair<T>` resolves `T` against the
//! enclosing instantiation).

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::declaration::{TypeDeclaration, TypeKind};
use crate::descriptor::TypeDescriptor;
use crate::errors::CoreError;
use crate::scope::{MemberScope, TypeScope};
use crate::type_ref::TypeRef;
use crate::universe::{TypeUniverse, builtins};

/// Type variable name → resolved argument.
pub type TypeBindings = HashMap<String, TypeDescriptor>;

/// Shared, immutable view of a [`TypeUniverse`]. Cloning is cheap.
#[derive(Clone)]
pub struct TypeContext {
    universe: Arc<TypeUniverse>,
}

impl TypeContext {
    #[must_use]
    pub fn new(universe: TypeUniverse) -> Self {
        Self {
            universe: Arc::new(universe),
        }
    }

    #[must_use]
    pub fn universe(&self) -> &TypeUniverse {
        &self.universe
    }

    /// Resolve a raw reference with the given variable bindings in scope.
    ///
    /// A generic type referenced without any arguments is treated as raw and
    /// gets `Object` for each of its parameters.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownType`, `CoreError::UnboundTypeVariable` or
    /// `CoreError::ArityMismatch` when the reference does not match the
    /// universe.
    pub fn resolve(
        &self,
        reference: &TypeRef,
        bindings: &TypeBindings,
    ) -> Result<TypeDescriptor, CoreError> {
        match reference {
            TypeRef::Variable(name) => {
                bindings
                    .get(name)
                    .cloned()
                    .ok_or_else(|| CoreError::UnboundTypeVariable { name: name.clone() })
            }
            TypeRef::Array(component) => {
                Ok(TypeDescriptor::array_of(self.resolve(component, bindings)?))
            }
            TypeRef::Named { name, args } => {
                if args.is_empty() {
                    if let Some(bound) = bindings.get(name) {
                        return Ok(bound.clone());
                    }
                }
                let declaration = self
                    .universe
                    .lookup(name)
                    .ok_or_else(|| CoreError::UnknownType { name: name.clone() })?;
                let expected = declaration.type_params.len();
                let resolved_args = if args.is_empty() {
                    vec![TypeDescriptor::simple(builtins::OBJECT); expected]
                } else if args.len() == expected {
                    args.iter()
                        .map(|arg| self.resolve(arg, bindings))
                        .collect::<Result<Vec<_>, _>>()?
                } else {
                    return Err(CoreError::ArityMismatch {
                        name: declaration.name.clone(),
                        expected,
                        found: args.len(),
                    });
                };
                Ok(TypeDescriptor::new(declaration.name.clone(), resolved_args))
            }
        }
    }

    /// Resolve a reference without any variables in scope.
    ///
    /// # Errors
    ///
    /// See [`TypeContext::resolve`].
    pub fn resolve_closed(&self, reference: &TypeRef) -> Result<TypeDescriptor, CoreError> {
        self.resolve(reference, &TypeBindings::new())
    }

    /// Parse and resolve a textual reference such as `List<com.acme.Foo>`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MalformedTypeReference` for unparsable text, or any
    /// error of [`TypeContext::resolve`].
    pub fn parse(&self, text: &str) -> Result<TypeDescriptor, CoreError> {
        self.resolve_closed(&text.parse()?)
    }

    #[must_use]
    pub fn declaration(&self, ty: &TypeDescriptor) -> Option<&TypeDeclaration> {
        self.universe.get(ty.erased_name())
    }

    #[must_use]
    pub fn kind_of(&self, ty: &TypeDescriptor) -> Option<TypeKind> {
        self.declaration(ty).map(|d| d.kind)
    }

    /// Bindings of the declared type parameters of `ty` to its arguments.
    #[must_use]
    pub fn bindings_of(&self, ty: &TypeDescriptor) -> TypeBindings {
        self.declaration(ty)
            .map(|declaration| {
                declaration
                    .type_params
                    .iter()
                    .cloned()
                    .zip(ty.type_arguments().iter().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Direct supertypes (superclass first, then interfaces), resolved with the
    /// bindings of `ty`.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from the declared supertype references.
    pub fn supertypes(&self, ty: &TypeDescriptor) -> Result<Vec<TypeDescriptor>, CoreError> {
        let Some(declaration) = self.declaration(ty) else {
            return Ok(Vec::new());
        };
        let bindings = self.bindings_of(ty);
        declaration
            .supertype
            .iter()
            .chain(&declaration.interfaces)
            .map(|reference| self.resolve(reference, &bindings))
            .collect()
    }

    /// `ty` followed by all of its transitive supertypes, breadth first.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from supertype references.
    pub fn hierarchy(&self, ty: &TypeDescriptor) -> Result<Vec<TypeDescriptor>, CoreError> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        let mut queue = VecDeque::from([ty.clone()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            queue.extend(self.supertypes(&current)?);
            ordered.push(current);
        }
        Ok(ordered)
    }

    /// The instantiation of `erased` that `ty` is or inherits from.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from supertype references.
    pub fn find_ancestor(
        &self,
        ty: &TypeDescriptor,
        erased: &str,
    ) -> Result<Option<TypeDescriptor>, CoreError> {
        Ok(self
            .hierarchy(ty)?
            .into_iter()
            .find(|candidate| candidate.is_erased(erased)))
    }

    /// Resolved argument `index` of the supertype `erased` as seen from `ty`,
    /// e.g. `V` of `Map` for a `class Lookup extends Map<String, Long>`.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from supertype references.
    pub fn type_parameter_for(
        &self,
        ty: &TypeDescriptor,
        erased: &str,
        index: usize,
    ) -> Result<Option<TypeDescriptor>, CoreError> {
        Ok(self
            .find_ancestor(ty, erased)?
            .and_then(|ancestor| ancestor.type_arguments().get(index).cloned()))
    }

    /// Arrays and anything iterable are rendered as JSON arrays.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from supertype references.
    pub fn is_container_type(&self, ty: &TypeDescriptor) -> Result<bool, CoreError> {
        Ok(self.container_item_type(ty)?.is_some())
    }

    /// Element type of a container, `None` for anything else.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from supertype references.
    pub fn container_item_type(
        &self,
        ty: &TypeDescriptor,
    ) -> Result<Option<TypeDescriptor>, CoreError> {
        if let Some(component) = ty.component_type() {
            return Ok(Some(component.clone()));
        }
        self.type_parameter_for(ty, builtins::ITERABLE, 0)
    }

    #[must_use]
    pub fn simple_type_description(&self, ty: &TypeDescriptor) -> String {
        ty.simple_description()
    }

    #[must_use]
    pub fn full_type_description(&self, ty: &TypeDescriptor) -> String {
        ty.full_description()
    }

    #[must_use]
    pub fn type_scope(&self, ty: &TypeDescriptor) -> TypeScope {
        TypeScope::new(ty.clone(), self.clone())
    }

    /// Fields of `ty` and its supertypes, subtype members first, with their
    /// types resolved against the declaring instantiation.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from field and supertype references.
    pub fn fields_of(&self, ty: &TypeDescriptor) -> Result<Vec<MemberScope>, CoreError> {
        let mut members = Vec::new();
        for declaring in self.hierarchy(ty)? {
            let Some(declaration) = self.declaration(&declaring) else {
                continue;
            };
            let bindings = self.bindings_of(&declaring);
            for field in &declaration.fields {
                let field_type = self.resolve(&field.ty, &bindings)?;
                members.push(MemberScope::for_field(
                    self.clone(),
                    declaring.clone(),
                    field,
                    field_type,
                ));
            }
        }
        Ok(members)
    }

    /// Methods of `ty` and its supertypes, in the same order as
    /// [`TypeContext::fields_of`].
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from return and supertype references.
    pub fn methods_of(&self, ty: &TypeDescriptor) -> Result<Vec<MemberScope>, CoreError> {
        let mut members = Vec::new();
        for declaring in self.hierarchy(ty)? {
            let Some(declaration) = self.declaration(&declaring) else {
                continue;
            };
            let bindings = self.bindings_of(&declaring);
            for method in &declaration.methods {
                let return_type = match &method.return_type {
                    Some(reference) => self.resolve(reference, &bindings)?,
                    None => TypeDescriptor::simple(builtins::VOID),
                };
                members.push(MemberScope::for_method(
                    self.clone(),
                    declaring.clone(),
                    method,
                    return_type,
                ));
            }
        }
        Ok(members)
    }

    /// Declared non-generic types that directly extend or implement `ty`, in
    /// declaration order.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from supertype references of candidates.
    pub fn known_subtypes(&self, ty: &TypeDescriptor) -> Result<Vec<TypeDescriptor>, CoreError> {
        let mut subtypes = Vec::new();
        for declaration in self.universe.declarations() {
            if !declaration.type_params.is_empty() || declaration.name == ty.erased_name() {
                continue;
            }
            if declaration.supertype.is_none() && declaration.interfaces.is_empty() {
                continue;
            }
            let candidate = TypeDescriptor::simple(declaration.name.clone());
            if self.supertypes(&candidate)?.contains(ty) {
                subtypes.push(candidate);
            }
        }
        Ok(subtypes)
    }
}

impl fmt::Debug for TypeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeContext")
            .field("declarations", &self.universe.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::FieldDeclaration;
    use pretty_assertions::assert_eq;

    fn context() -> TypeContext {
        let mut universe = TypeUniverse::new();
        universe
            .declare(
                TypeDeclaration::class("test.Box")
                    .type_param("T")
                    .field(FieldDeclaration::new("value", TypeRef::var("T"))),
            )
            .unwrap()
            .declare(
                TypeDeclaration::class("test.StringBox")
                    .extends("test.Box<String>".parse().unwrap())
                    .field(FieldDeclaration::new("label", TypeRef::named("String"))),
            )
            .unwrap()
            .declare(
                TypeDeclaration::class("test.Names")
                    .implements("List<String>".parse().unwrap()),
            )
            .unwrap();
        TypeContext::new(universe)
    }

    #[test]
    fn raw_generic_gets_object_arguments() {
        let ctx = context();
        let raw = ctx.parse("List").unwrap();
        assert_eq!(raw.full_description(), "std.List<std.Object>");
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let ctx = context();
        let err = ctx.parse("Map<String>").unwrap_err();
        assert!(matches!(
            err,
            CoreError::ArityMismatch { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn unknown_type_is_reported() {
        let ctx = context();
        let err = ctx.parse("test.Missing").unwrap_err();
        assert!(matches!(err, CoreError::UnknownType { name } if name == "test.Missing"));
    }

    #[test]
    fn unbound_variable_is_reported() {
        let ctx = context();
        let err = ctx.resolve_closed(&TypeRef::var("T")).unwrap_err();
        assert!(matches!(err, CoreError::UnboundTypeVariable { .. }));
    }

    #[test]
    fn inherited_fields_see_bound_variables() {
        let ctx = context();
        let ty = ctx.parse("test.StringBox").unwrap();
        let fields = ctx.fields_of(&ty).unwrap();
        let described: Vec<(String, String)> = fields
            .iter()
            .map(|f| (f.declared_name().to_string(), f.member_type().simple_description()))
            .collect();
        assert_eq!(
            described,
            vec![
                ("label".to_string(), "String".to_string()),
                ("value".to_string(), "String".to_string()),
            ]
        );
        assert_eq!(fields[1].declaring_type().simple_description(), "Box<String>");
    }

    #[test]
    fn container_detection_follows_inheritance() {
        let ctx = context();
        let names = ctx.parse("test.Names").unwrap();
        assert!(ctx.is_container_type(&names).unwrap());
        assert_eq!(
            ctx.container_item_type(&names).unwrap(),
            Some(ctx.parse("String").unwrap())
        );

        let array = ctx.parse("Integer[]").unwrap();
        assert_eq!(
            ctx.container_item_type(&array).unwrap(),
            Some(ctx.parse("Integer").unwrap())
        );
        assert!(!ctx.is_container_type(&ctx.parse("Map<String, Long>").unwrap()).unwrap());
    }

    #[test]
    fn known_subtypes_in_declaration_order() {
        let ctx = context();
        let list = ctx.parse("List<String>").unwrap();
        let subtypes = ctx.known_subtypes(&list).unwrap();
        assert_eq!(subtypes, vec![ctx.parse("test.Names").unwrap()]);
        assert!(ctx.known_subtypes(&ctx.parse("List<Long>").unwrap()).unwrap().is_empty());
    }
}
