use anyhow::{ensure, Result};

use hydrator::{
    ClassDef, ConstructorDef, FieldDef, MapError, Mapper, ObjectInstance, SchemaRegistry, Value,
};

fn decode(json: &str) -> Result<Value> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    Ok(Value::from_json(&parsed))
}

fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(
        ClassDef::new("Event")
            .field(FieldDef::new("title").native("string"))
            .field(FieldDef::new("tags").annotation("@var string[]"))
            .field(FieldDef::new("at").annotation("@var Timestamp")),
    );
    registry.register(
        ClassDef::new("Timestamp").constructor(
            ConstructorDef::new(|args| match args {
                [Value::Int(seconds)] => {
                    let mut instance = hydrator::ObjectInstance::new("Timestamp");
                    instance.set_field("seconds", Value::Int(*seconds));
                    Ok(Value::Object(instance))
                }
                [other] => Err(format!("expected seconds as int, got {}", other.kind_name())),
                _ => Err("expected exactly one argument".to_string()),
            })
            .param("seconds", true),
        ),
    );
    registry
}

#[test]
fn top_level_input_must_be_a_map() -> Result<()> {
    let mapper = Mapper::new(registry());
    let mut event = ObjectInstance::new("Event");
    let error = mapper
        .map_object(&Value::Array(vec![]), &mut event)
        .expect_err("sequence input at the top level must fail");
    ensure!(matches!(error, MapError::InvalidArgument { .. }));
    Ok(())
}

#[test]
fn unregistered_target_class_is_rejected() -> Result<()> {
    let mapper = Mapper::new(registry());
    let mut ghost = ObjectInstance::new("Ghost");
    let error = mapper
        .map_object(&decode("{}")?, &mut ghost)
        .expect_err("unregistered target must fail");
    let message = error.to_string();
    ensure!(message.contains("Ghost"), "unexpected message: {message}");
    Ok(())
}

#[test]
fn flat_input_for_sequence_typed_member_fails() -> Result<()> {
    let mapper = Mapper::new(registry());
    let input = decode(r#"{"tags": "not-a-sequence"}"#)?;
    let mut event = ObjectInstance::new("Event");
    let error = mapper
        .map_object(&input, &mut event)
        .expect_err("flat value for string[] must fail");

    match error {
        MapError::ExpectedArray {
            property,
            class,
            declared,
        } => {
            ensure!(property == "tags");
            ensure!(class == "Event");
            ensure!(declared == "string[]");
        }
        other => anyhow::bail!("expected ExpectedArray, got {other}"),
    }
    Ok(())
}

#[test]
fn null_for_non_nullable_member_names_property_and_class() -> Result<()> {
    let mapper = Mapper::new(registry());
    let input = decode(r#"{"title": null}"#)?;
    let mut event = ObjectInstance::new("Event");
    let error = mapper
        .map_object(&input, &mut event)
        .expect_err("null into non-nullable string must fail");

    match error {
        MapError::NullNotAllowed { property, class } => {
            ensure!(property == "title");
            ensure!(class == "Event");
        }
        other => anyhow::bail!("expected NullNotAllowed, got {other}"),
    }
    Ok(())
}

#[test]
fn flat_value_invokes_single_argument_constructor() -> Result<()> {
    let mapper = Mapper::new(registry());
    let input = decode(r#"{"at": 1700000000}"#)?;
    let mut event = ObjectInstance::new("Event");
    mapper.map_object(&input, &mut event)?;

    let Some(Value::Object(timestamp)) = event.get_field("at") else {
        anyhow::bail!("expected a constructed Timestamp");
    };
    ensure!(timestamp.get_field("seconds") == Some(&Value::Int(1700000000)));
    Ok(())
}

#[test]
fn rejecting_constructor_surfaces_its_reason() -> Result<()> {
    let mapper = Mapper::new(registry());
    let input = decode(r#"{"at": "soon"}"#)?;
    let mut event = ObjectInstance::new("Event");
    let error = mapper
        .map_object(&input, &mut event)
        .expect_err("constructor rejects string input");

    match error {
        MapError::ConstructorFailed { class, reason } => {
            ensure!(class == "Timestamp");
            ensure!(reason.contains("string"), "unexpected reason: {reason}");
        }
        other => anyhow::bail!("expected ConstructorFailed, got {other}"),
    }
    Ok(())
}

#[test]
fn flat_value_without_registered_constructor_fails() -> Result<()> {
    let mut registry = SchemaRegistry::new();
    registry.register(ClassDef::new("Plain"));
    registry.register(ClassDef::new("Holder").field(FieldDef::new("item").annotation("@var Plain")));

    let mapper = Mapper::new(registry);
    let input = decode(r#"{"item": 5}"#)?;
    let mut holder = ObjectInstance::new("Holder");
    let error = mapper
        .map_object(&input, &mut holder)
        .expect_err("flat input without a constructor must fail");
    ensure!(matches!(error, MapError::ConstructorFailed { .. }));
    Ok(())
}

#[test]
fn failure_leaves_target_partially_populated() -> Result<()> {
    let mapper = Mapper::new(registry());
    let input = decode(r#"{"title": "release", "tags": "broken"}"#)?;
    let mut event = ObjectInstance::new("Event");
    let error = mapper.map_object(&input, &mut event);

    ensure!(error.is_err());
    // members mapped before the failure stay assigned
    ensure!(event.get_field("title") == Some(&Value::String("release".to_string())));
    ensure!(event.get_field("tags").is_none());
    Ok(())
}

#[test]
fn blank_construction_bypasses_required_constructor() -> Result<()> {
    let mut registry = SchemaRegistry::new();
    registry.register(
        ClassDef::new("Strict")
            .field(FieldDef::new("id").native("int"))
            .constructor(
                ConstructorDef::new(|_args| Err("must not run during population".to_string()))
                    .param("id", true),
            ),
    );
    registry.register(
        ClassDef::new("Wrapper").field(FieldDef::new("strict").annotation("@var Strict")),
    );

    let mapper = Mapper::new(registry);
    let input = decode(r#"{"strict": {"id": 3}}"#)?;
    let mut wrapper = ObjectInstance::new("Wrapper");
    mapper.map_object(&input, &mut wrapper)?;

    let Some(Value::Object(strict)) = wrapper.get_field("strict") else {
        anyhow::bail!("expected a Strict instance");
    };
    ensure!(strict.get_field("id") == Some(&Value::Int(3)));
    Ok(())
}

#[test]
fn zero_argument_constructor_runs_when_not_required() -> Result<()> {
    let mut registry = SchemaRegistry::new();
    registry.register(
        ClassDef::new("Seeded")
            .field(FieldDef::new("label").native("string"))
            .constructor(ConstructorDef::new(|_args| {
                let mut instance = hydrator::ObjectInstance::new("Seeded");
                instance.set_field("seeded", Value::Bool(true));
                Ok(Value::Object(instance))
            })),
    );
    registry.register(
        ClassDef::new("Holder").field(FieldDef::new("seeded").annotation("@var Seeded")),
    );

    let mapper = Mapper::new(registry);
    let input = decode(r#"{"seeded": {"label": "x"}}"#)?;
    let mut holder = ObjectInstance::new("Holder");
    mapper.map_object(&input, &mut holder)?;

    let Some(Value::Object(seeded)) = holder.get_field("seeded") else {
        anyhow::bail!("expected a Seeded instance");
    };
    ensure!(seeded.get_field("seeded") == Some(&Value::Bool(true)));
    ensure!(seeded.get_field("label") == Some(&Value::String("x".to_string())));
    Ok(())
}
