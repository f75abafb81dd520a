use anyhow::{ensure, Result};

use hydrator::{
    ClassDef, ClassMapEntry, FieldDef, MapError, Mapper, ObjectInstance, SchemaRegistry, Value,
};

fn decode(json: &str) -> Result<Value> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    Ok(Value::from_json(&parsed))
}

fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(ClassDef::new("shop::Address").field(FieldDef::new("street").native("string")));
    registry.register(ClassDef::new("util::Tag").field(FieldDef::new("label").native("string")));
    registry.register(
        ClassDef::new("shop::Person")
            .field(FieldDef::new("address").annotation("@var Address"))
            .field(FieldDef::new("tag").annotation("@var ::util::Tag"))
            .field(FieldDef::new("score").annotation("@var int|null"))
            .field(FieldDef::new("payload").annotation("@var int|string"))
            .field(FieldDef::new("age").native("int")),
    );
    registry
}

#[test]
fn bare_names_qualify_against_the_class_namespace() -> Result<()> {
    let mapper = Mapper::new(registry());
    let input = decode(r#"{"address": {"street": "Main"}}"#)?;
    let mut person = ObjectInstance::new("shop::Person");
    mapper.map_object(&input, &mut person)?;

    let Some(Value::Object(address)) = person.get_field("address") else {
        anyhow::bail!("expected an address instance");
    };
    ensure!(address.class == "shop::Address");
    Ok(())
}

#[test]
fn rooted_names_resolve_from_global_scope() -> Result<()> {
    let mapper = Mapper::new(registry());
    let input = decode(r#"{"tag": {"label": "new"}}"#)?;
    let mut person = ObjectInstance::new("shop::Person");
    mapper.map_object(&input, &mut person)?;

    let Some(Value::Object(tag)) = person.get_field("tag") else {
        anyhow::bail!("expected a tag instance");
    };
    ensure!(tag.class == "util::Tag");
    Ok(())
}

#[test]
fn scalar_keywords_are_never_namespace_qualified() -> Result<()> {
    let mapper = Mapper::new(registry());
    let input = decode(r#"{"age": "41"}"#)?;
    let mut person = ObjectInstance::new("shop::Person");
    mapper.map_object(&input, &mut person)?;

    ensure!(person.get_field("age") == Some(&Value::Int(41)));
    Ok(())
}

#[test]
fn nullable_union_resolves_to_inner_type() -> Result<()> {
    let mapper = Mapper::new(registry());

    let input = decode(r#"{"score": 5}"#)?;
    let mut person = ObjectInstance::new("shop::Person");
    mapper.map_object(&input, &mut person)?;
    ensure!(person.get_field("score") == Some(&Value::Int(5)));

    let input = decode(r#"{"score": null}"#)?;
    let mut person = ObjectInstance::new("shop::Person");
    mapper.map_object(&input, &mut person)?;
    ensure!(person.get_field("score") == Some(&Value::Null));
    Ok(())
}

#[test]
fn non_null_unions_are_rejected_as_ambiguous() -> Result<()> {
    let mapper = Mapper::new(registry());
    let input = decode(r#"{"payload": 5}"#)?;
    let mut person = ObjectInstance::new("shop::Person");
    let error = mapper
        .map_object(&input, &mut person)
        .expect_err("a two-branch union must be rejected");

    match error {
        MapError::AmbiguousUnion {
            property, declared, ..
        } => {
            ensure!(property == "payload");
            ensure!(declared == "int|string");
        }
        other => anyhow::bail!("expected AmbiguousUnion, got {other}"),
    }
    Ok(())
}

#[test]
fn class_map_literal_override_redirects_construction() -> Result<()> {
    let mut registry = registry();
    registry.register(
        ClassDef::new("shop::PostalAddress")
            .parent("shop::Address")
            .field(FieldDef::new("street").native("string")),
    );

    let mut mapper = Mapper::new(registry);
    mapper.class_map_mut().insert(
        "shop::Address".to_string(),
        ClassMapEntry::Name("shop::PostalAddress".to_string()),
    );

    let input = decode(r#"{"address": {"street": "Main"}}"#)?;
    let mut person = ObjectInstance::new("shop::Person");
    mapper.map_object(&input, &mut person)?;

    let Some(Value::Object(address)) = person.get_field("address") else {
        anyhow::bail!("expected an address instance");
    };
    ensure!(address.class == "shop::PostalAddress");
    Ok(())
}

#[test]
fn class_map_callback_sees_declared_name_and_value() -> Result<()> {
    let mut mapper = Mapper::new(registry());
    mapper.class_map_mut().insert(
        "shop::Address".to_string(),
        ClassMapEntry::resolver(|declared, value| {
            assert_eq!(declared, "::shop::Address");
            assert!(matches!(value, Value::Map(_)));
            "shop::Address".to_string()
        }),
    );

    let input = decode(r#"{"address": {"street": "Main"}}"#)?;
    let mut person = ObjectInstance::new("shop::Person");
    mapper.map_object(&input, &mut person)?;
    ensure!(person.get_field("address").is_some());
    Ok(())
}

#[test]
fn empty_override_result_is_an_error() -> Result<()> {
    let mut mapper = Mapper::new(registry());
    mapper.class_map_mut().insert(
        "shop::Address".to_string(),
        ClassMapEntry::resolver(|_declared, _value| String::new()),
    );

    let input = decode(r#"{"address": {"street": "Main"}}"#)?;
    let mut person = ObjectInstance::new("shop::Person");
    let error = mapper
        .map_object(&input, &mut person)
        .expect_err("empty override must fail");
    ensure!(matches!(error, MapError::EmptyType { .. }));
    Ok(())
}

#[test]
fn unregistered_resolved_class_is_an_error() -> Result<()> {
    let mut registry = SchemaRegistry::new();
    registry.register(
        ClassDef::new("Order").field(FieldDef::new("customer").annotation("@var Customer")),
    );

    let mapper = Mapper::new(registry);
    let input = decode(r#"{"customer": {"name": "Ann"}}"#)?;
    let mut order = ObjectInstance::new("Order");
    let error = mapper
        .map_object(&input, &mut order)
        .expect_err("unregistered class must fail");

    match error {
        MapError::UnknownClass { name, property } => {
            ensure!(name == "Customer");
            ensure!(property == "customer");
        }
        other => anyhow::bail!("expected UnknownClass, got {other}"),
    }
    Ok(())
}
