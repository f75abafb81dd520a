use crate::error::MapError;
use crate::schema::{ClassDef, ClassKind};
use crate::value::{CollectionInstance, ObjectInstance, Value};

/// Construction policy. `Some(value)` invokes the class constructor with the
/// single raw value. `None` asks for an instance ready for member-by-member
/// population: the constructor is bypassed whenever it is absent or has
/// required parameters, and invoked with no arguments otherwise.
pub(crate) fn create(class: &ClassDef, argument: Option<&Value>) -> Result<Value, MapError> {
    match argument {
        Some(value) => match &class.constructor {
            Some(constructor) => (constructor.build)(std::slice::from_ref(value)).map_err(
                |reason| MapError::ConstructorFailed {
                    class: class.name().to_string(),
                    reason,
                },
            ),
            None => Err(MapError::ConstructorFailed {
                class: class.name().to_string(),
                reason: "no constructor registered for single-argument construction".to_string(),
            }),
        },
        None => match &class.constructor {
            Some(constructor) if !constructor.has_required_params() => (constructor.build)(&[])
                .map_err(|reason| MapError::ConstructorFailed {
                    class: class.name().to_string(),
                    reason,
                }),
            _ => Ok(blank(class)),
        },
    }
}

fn blank(class: &ClassDef) -> Value {
    match class.kind() {
        ClassKind::Object => Value::Object(ObjectInstance::new(class.name())),
        ClassKind::Collection => Value::Collection(CollectionInstance::new(class.name())),
    }
}
