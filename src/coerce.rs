use indexmap::IndexMap;

use crate::descriptor::ScalarKind;
use crate::error::MapError;
use crate::value::Value;

pub(crate) fn coerce(
    value: &Value,
    kind: ScalarKind,
    property: &str,
    class: &str,
) -> Result<Value, MapError> {
    let mismatch = || MapError::TypeMismatch {
        property: property.to_string(),
        class: class.to_string(),
        expected: kind.keyword().to_string(),
        found: value.kind_name(),
    };
    match kind {
        ScalarKind::String => match value {
            Value::String(text) => Ok(Value::String(text.clone())),
            Value::Bool(v) => Ok(Value::String(v.to_string())),
            Value::Int(v) => Ok(Value::String(v.to_string())),
            Value::Float(v) => Ok(Value::String(v.to_string())),
            // structured values never flatten into a string
            _ => Err(mismatch()),
        },
        ScalarKind::Bool => match value {
            Value::Bool(v) => Ok(Value::Bool(*v)),
            Value::Int(v) => Ok(Value::Bool(*v != 0)),
            Value::Float(v) => Ok(Value::Bool(*v != 0.0)),
            Value::String(text) => {
                let falsy = text.is_empty() || text == "0" || text.eq_ignore_ascii_case("false");
                Ok(Value::Bool(!falsy))
            }
            _ => Err(mismatch()),
        },
        ScalarKind::Int => match value {
            Value::Int(v) => Ok(Value::Int(*v)),
            Value::Float(v) => Ok(Value::Int(*v as i64)),
            Value::Bool(v) => Ok(Value::Int(i64::from(*v))),
            Value::String(text) => {
                let trimmed = text.trim();
                if let Ok(int) = trimmed.parse::<i64>() {
                    return Ok(Value::Int(int));
                }
                match trimmed.parse::<f64>() {
                    Ok(float) => Ok(Value::Int(float as i64)),
                    Err(_) => Err(mismatch()),
                }
            }
            _ => Err(mismatch()),
        },
        ScalarKind::Float => match value {
            Value::Float(v) => Ok(Value::Float(*v)),
            Value::Int(v) => Ok(Value::Float(*v as f64)),
            Value::Bool(v) => Ok(Value::Float(if *v { 1.0 } else { 0.0 })),
            Value::String(text) => match text.trim().parse::<f64>() {
                Ok(float) => Ok(Value::Float(float)),
                Err(_) => Err(mismatch()),
            },
            _ => Err(mismatch()),
        },
        ScalarKind::Array => match value {
            Value::Array(_) | Value::Map(_) => Ok(value.clone()),
            Value::Object(instance) => Ok(Value::Map(instance.fields.clone())),
            Value::Collection(collection) => Ok(Value::Array(collection.items.clone())),
            Value::Null => Ok(Value::Array(Vec::new())),
            flat => Ok(Value::Array(vec![flat.clone()])),
        },
        ScalarKind::Object => match value {
            Value::Map(_) | Value::Object(_) | Value::Collection(_) => Ok(value.clone()),
            Value::Array(items) => {
                let mut entries = IndexMap::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    entries.insert(index.to_string(), item.clone());
                }
                Ok(Value::Map(entries))
            }
            Value::Null => Ok(Value::Map(IndexMap::new())),
            flat => {
                let mut entries = IndexMap::with_capacity(1);
                entries.insert("scalar".to_string(), flat.clone());
                Ok(Value::Map(entries))
            }
        },
    }
}
