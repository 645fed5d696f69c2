//! Integration tests for generic binding through inheritance and composition.

use jsg_core::{
    CoreError, FieldDeclaration, MethodDeclaration, TypeContext, TypeDeclaration, TypeRef,
    TypeUniverse, builtins,
};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

#[fixture]
fn context() -> TypeContext {
    let mut universe = TypeUniverse::new();
    universe
        .declare(
            TypeDeclaration::class("acme.Box")
                .type_param("T")
                .field(FieldDeclaration::new("content", TypeRef::var("T"))),
        )
        .unwrap()
        .declare(
            TypeDeclaration::class("acme.Pair")
                .type_param("A")
                .type_param("B")
                .field(FieldDeclaration::new("first", "acme.Box<A>".parse().unwrap()))
                .field(FieldDeclaration::new("second", "List<B>".parse().unwrap()))
                .method(MethodDeclaration::new("swap", "acme.Pair<B, A>".parse().unwrap())),
        )
        .unwrap()
        .declare(
            TypeDeclaration::class("acme.Ledger")
                .extends("acme.Pair<String, BigDecimal>".parse().unwrap())
                .implements("Map<String, Long>".parse().unwrap()),
        )
        .unwrap();
    TypeContext::new(universe)
}

fn member_types(members: &[jsg_core::MemberScope]) -> Vec<(String, String)> {
    members
        .iter()
        .map(|m| (m.name(), m.member_type().simple_description()))
        .collect()
}

#[rstest]
fn composition_resolves_against_declaring_instantiation(context: TypeContext) {
    let pair = context.parse("acme.Pair<Integer, Boolean>").unwrap();
    let fields = context.fields_of(&pair).unwrap();
    assert_eq!(
        member_types(&fields),
        vec![
            ("first".to_string(), "Box<Integer>".to_string()),
            ("second".to_string(), "List<Boolean>".to_string()),
        ]
    );

    let boxed = fields[0].member_type().clone();
    let nested = context.fields_of(&boxed).unwrap();
    assert_eq!(
        member_types(&nested),
        vec![("content".to_string(), "Integer".to_string())]
    );

    let methods = context.methods_of(&pair).unwrap();
    assert_eq!(
        member_types(&methods),
        vec![("swap()".to_string(), "Pair<Boolean, Integer>".to_string())]
    );
}

#[rstest]
fn inheritance_binds_supertype_parameters(context: TypeContext) {
    let ledger = context.parse("acme.Ledger").unwrap();
    let fields = context.fields_of(&ledger).unwrap();
    assert_eq!(
        member_types(&fields),
        vec![
            ("first".to_string(), "Box<String>".to_string()),
            ("second".to_string(), "List<BigDecimal>".to_string()),
        ]
    );
    assert_eq!(
        context
            .type_parameter_for(&ledger, builtins::MAP, 1)
            .unwrap()
            .map(|t| t.full_description()),
        Some("std.Long".to_string())
    );
}

#[rstest]
fn identical_references_resolve_to_equal_descriptors(context: TypeContext) {
    let a = context.parse("acme.Pair<String, List<Long>>").unwrap();
    let b = context
        .resolve_closed(&TypeRef::generic(
            "acme.Pair",
            vec![
                TypeRef::named(builtins::STRING),
                TypeRef::generic("List", vec![TypeRef::named("Long")]),
            ],
        ))
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.full_description(), "acme.Pair<std.String, std.List<std.Long>>");
}

#[rstest]
#[case("acme.Box<String, String>")]
#[case("acme.Unknown")]
#[case("acme.Box<")]
fn invalid_references_are_errors(context: TypeContext, #[case] text: &str) {
    let err = context.parse(text).unwrap_err();
    assert!(matches!(
        err,
        CoreError::ArityMismatch { .. }
            | CoreError::UnknownType { .. }
            | CoreError::MalformedTypeReference { .. }
    ));
}
