//! Collecting definitions for several types under a custom path.

use jsg_core::{FieldDeclaration, OptionPreset, SchemaVersion, TypeContext, TypeDeclaration, TypeUniverse};
use jsg_schema::{SchemaGenerator, SchemaGeneratorConfigBuilder};
use pretty_assertions::assert_eq;
use serde_json::json;

fn generator() -> SchemaGenerator {
    let mut universe = TypeUniverse::new();
    universe
        .declare(
            TypeDeclaration::class("acme.Address")
                .field(FieldDeclaration::new("street", "String".parse().unwrap())),
        )
        .unwrap()
        .declare(
            TypeDeclaration::class("acme.Person")
                .field(FieldDeclaration::new("home", "acme.Address".parse().unwrap()))
                .field(FieldDeclaration::new("work", "acme.Address".parse().unwrap())),
        )
        .unwrap();
    let builder = SchemaGeneratorConfigBuilder::new(
        TypeContext::new(universe),
        SchemaVersion::Draft2020_12,
        OptionPreset::Plain,
    );
    SchemaGenerator::new(builder.build())
}

#[test]
fn shared_definitions_live_under_the_designated_path() {
    let generator = generator();
    let types = generator.config().type_context();
    let person = types.parse("acme.Person").unwrap();
    let address = types.parse("acme.Address").unwrap();
    let text = types.parse("String").unwrap();

    let mut builder = generator.multi_type_builder();
    let person_ref = builder.create_schema_reference(&person).unwrap();
    let address_ref = builder.create_schema_reference(&address).unwrap();
    let text_ref = builder.create_schema_reference(&text).unwrap();
    let collected = builder.collect_definitions("components/schemas").unwrap();

    assert_eq!(
        collected.definitions(),
        json!({
            "Address": {"type": "object", "properties": {"street": {"type": "string"}}}
        })
        .as_object()
        .unwrap()
    );
    // used once, so inlined into the reference itself
    assert_eq!(
        collected.reference(person_ref).unwrap(),
        &json!({
            "type": "object",
            "properties": {
                "home": {"$ref": "#/components/schemas/Address"},
                "work": {"$ref": "#/components/schemas/Address"}
            }
        })
    );
    assert_eq!(
        collected.reference(address_ref).unwrap(),
        &json!({"$ref": "#/components/schemas/Address"})
    );
    assert_eq!(collected.reference(text_ref).unwrap(), &json!({"type": "string"}));
}

#[test]
fn repeated_references_to_one_type_share_a_definition() {
    let generator = generator();
    let person = generator.config().type_context().parse("acme.Person").unwrap();

    let mut builder = generator.multi_type_builder();
    let first = builder.create_schema_reference(&person).unwrap();
    let second = builder.create_schema_reference(&person).unwrap();
    let (definitions, references) = builder.collect_definitions("defs").unwrap().into_parts();

    assert_eq!(
        definitions.keys().cloned().collect::<Vec<_>>(),
        vec!["Address".to_string(), "Person".to_string()]
    );
    assert_eq!(references.len(), 2);
    assert_ne!(first, second);
    assert_eq!(references[0], json!({"$ref": "#/defs/Person"}));
    assert_eq!(references[1], json!({"$ref": "#/defs/Person"}));
}
