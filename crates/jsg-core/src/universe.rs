//! The set of declared types the generator can resolve.

use indexmap::IndexMap;

use crate::declaration::{FieldDeclaration, TypeDeclaration};
use crate::errors::CoreError;
use crate::type_ref::TypeRef;

/// Fully qualified names of the builtin declarations.
pub mod builtins {
    /// Package prefix shared by all builtins.
    pub const PACKAGE: &str = "std";

    pub const OBJECT: &str = "std.Object";
    pub const STRING: &str = "std.String";
    pub const CHARACTER: &str = "std.Character";
    pub const BOOLEAN: &str = "std.Boolean";
    pub const BYTE: &str = "std.Byte";
    pub const SHORT: &str = "std.Short";
    pub const INTEGER: &str = "std.Integer";
    pub const LONG: &str = "std.Long";
    pub const FLOAT: &str = "std.Float";
    pub const DOUBLE: &str = "std.Double";
    pub const BIG_INTEGER: &str = "std.BigInteger";
    pub const BIG_DECIMAL: &str = "std.BigDecimal";
    pub const UUID: &str = "std.Uuid";
    pub const URI: &str = "std.Uri";
    pub const LOCAL_DATE: &str = "std.LocalDate";
    pub const LOCAL_TIME: &str = "std.LocalTime";
    pub const LOCAL_DATE_TIME: &str = "std.LocalDateTime";
    pub const ZONED_DATE_TIME: &str = "std.ZonedDateTime";
    pub const INSTANT: &str = "std.Instant";
    pub const DURATION: &str = "std.Duration";

    pub const PRIMITIVE_BOOLEAN: &str = "boolean";
    pub const PRIMITIVE_CHAR: &str = "char";
    pub const PRIMITIVE_BYTE: &str = "byte";
    pub const PRIMITIVE_SHORT: &str = "short";
    pub const PRIMITIVE_INT: &str = "int";
    pub const PRIMITIVE_LONG: &str = "long";
    pub const PRIMITIVE_FLOAT: &str = "float";
    pub const PRIMITIVE_DOUBLE: &str = "double";
    pub const VOID: &str = "void";

    pub const ITERABLE: &str = "std.Iterable";
    pub const COLLECTION: &str = "std.Collection";
    pub const LIST: &str = "std.List";
    pub const SET: &str = "std.Set";
    pub const MAP: &str = "std.Map";
    pub const OPTIONAL: &str = "std.Optional";
    pub const SUPPLIER: &str = "std.Supplier";

    /// Whether `name` lives in the builtin package.
    #[must_use]
    pub fn is_builtin(name: &str) -> bool {
        name.strip_prefix(PACKAGE).is_some_and(|rest| rest.starts_with('.'))
            || (!name.contains('.') && name.chars().next().is_some_and(char::is_lowercase))
    }
}

/// Registry of [`TypeDeclaration`]s keyed by fully qualified name, in
/// declaration order.
#[derive(Debug, Clone)]
pub struct TypeUniverse {
    declarations: IndexMap<String, TypeDeclaration>,
}

impl TypeUniverse {
    /// Universe pre-populated with the builtin types.
    #[must_use]
    pub fn new() -> Self {
        let mut universe = Self::empty();
        for declaration in builtin_declarations() {
            universe
                .declarations
                .insert(declaration.name.clone(), declaration);
        }
        universe
    }

    /// Universe without any declarations, not even the builtins.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            declarations: IndexMap::new(),
        }
    }

    /// Register a declaration.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DuplicateDeclaration` if a type with the same name
    /// was already declared.
    pub fn declare(&mut self, declaration: TypeDeclaration) -> Result<&mut Self, CoreError> {
        if self.declarations.contains_key(&declaration.name) {
            return Err(CoreError::DuplicateDeclaration {
                name: declaration.name,
            });
        }
        self.declarations
            .insert(declaration.name.clone(), declaration);
        Ok(self)
    }

    /// Look up a declaration by its exact fully qualified name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDeclaration> {
        self.declarations.get(name)
    }

    /// Look up a declaration, accepting unqualified builtin names such as
    /// `String` or `List`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TypeDeclaration> {
        self.get(name).or_else(|| {
            if name.contains('.') {
                None
            } else {
                self.get(&format!("{}.{name}", builtins::PACKAGE))
            }
        })
    }

    pub fn declarations(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.declarations.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_declarations() -> Vec<TypeDeclaration> {
    use crate::universe::builtins as b;

    let mut declarations: Vec<TypeDeclaration> = [
        b::OBJECT,
        b::STRING,
        b::CHARACTER,
        b::BOOLEAN,
        b::BYTE,
        b::SHORT,
        b::INTEGER,
        b::LONG,
        b::FLOAT,
        b::DOUBLE,
        b::BIG_INTEGER,
        b::BIG_DECIMAL,
        b::UUID,
        b::URI,
        b::LOCAL_DATE,
        b::LOCAL_TIME,
        b::LOCAL_DATE_TIME,
        b::ZONED_DATE_TIME,
        b::INSTANT,
        b::DURATION,
    ]
    .into_iter()
    .map(TypeDeclaration::class)
    .collect();

    declarations.extend(
        [
            b::PRIMITIVE_BOOLEAN,
            b::PRIMITIVE_CHAR,
            b::PRIMITIVE_BYTE,
            b::PRIMITIVE_SHORT,
            b::PRIMITIVE_INT,
            b::PRIMITIVE_LONG,
            b::PRIMITIVE_FLOAT,
            b::PRIMITIVE_DOUBLE,
            b::VOID,
        ]
        .into_iter()
        .map(TypeDeclaration::primitive),
    );

    let element = || TypeRef::var("E");
    declarations.extend([
        TypeDeclaration::interface(b::ITERABLE).type_param("T"),
        TypeDeclaration::interface(b::COLLECTION)
            .type_param("E")
            .implements(TypeRef::generic(b::ITERABLE, vec![element()])),
        TypeDeclaration::interface(b::LIST)
            .type_param("E")
            .implements(TypeRef::generic(b::COLLECTION, vec![element()])),
        TypeDeclaration::interface(b::SET)
            .type_param("E")
            .implements(TypeRef::generic(b::COLLECTION, vec![element()])),
        TypeDeclaration::interface(b::MAP)
            .type_param("K")
            .type_param("V"),
        TypeDeclaration::class(b::OPTIONAL)
            .type_param("T")
            .field(FieldDeclaration::new("value", TypeRef::var("T"))),
        TypeDeclaration::interface(b::SUPPLIER).type_param("T"),
    ]);
    declarations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_declared() {
        let universe = TypeUniverse::new();
        assert!(universe.get(builtins::STRING).is_some());
        assert!(universe.get(builtins::PRIMITIVE_INT).is_some());
        assert_eq!(
            universe.get(builtins::MAP).map(|d| d.type_params.len()),
            Some(2)
        );
    }

    #[test]
    fn lookup_accepts_unqualified_builtin_names() {
        let universe = TypeUniverse::new();
        assert_eq!(
            universe.lookup("List").map(|d| d.name.as_str()),
            Some(builtins::LIST)
        );
        assert!(universe.lookup("com.acme.List").is_none());
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let mut universe = TypeUniverse::new();
        universe
            .declare(TypeDeclaration::class("com.acme.Foo"))
            .unwrap();
        let err = universe
            .declare(TypeDeclaration::class("com.acme.Foo"))
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateDeclaration { name } if name == "com.acme.Foo"));
    }

    #[test]
    fn builtin_package_detection() {
        assert!(builtins::is_builtin("std.String"));
        assert!(builtins::is_builtin("int"));
        assert!(!builtins::is_builtin("standard.Thing"));
        assert!(!builtins::is_builtin("Foo"));
    }
}
