use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::error::MapError;

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInstance {
    pub class: String,
    pub fields: IndexMap<String, Value>,
}

impl ObjectInstance {
    pub fn new<S: Into<String>>(class: S) -> Self {
        Self {
            class: class.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field<S: Into<String>>(&mut self, name: S, value: Value) {
        self.fields.insert(name.into(), value);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInstance {
    pub class: String,
    pub items: Vec<Value>,
}

impl CollectionInstance {
    pub fn new<S: Into<String>>(class: S) -> Self {
        Self {
            class: class.into(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object(ObjectInstance),
    Collection(CollectionInstance),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A flat value carries no nested structure.
    pub fn is_flat(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Collection(_) => "collection",
        }
    }

    pub fn from_json(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(v) => Value::Bool(*v),
            JsonValue::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Value::Int(int)
                } else if let Some(uint) = number.as_u64() {
                    // above i64::MAX, widen to float
                    Value::Float(uint as f64)
                } else {
                    Value::Float(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(text) => Value::String(text.clone()),
            JsonValue::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(Value::from_json(item));
                }
                Value::Array(values)
            }
            JsonValue::Object(map) => {
                let mut entries = IndexMap::with_capacity(map.len());
                for (key, value) in map.iter() {
                    entries.insert(key.clone(), Value::from_json(value));
                }
                Value::Map(entries)
            }
        }
    }

    pub fn from_yaml(yaml: &YamlValue) -> Result<Value, MapError> {
        let json = serde_json::to_value(yaml).map_err(|error| MapError::InvalidArgument {
            reason: format!("failed to normalize YAML into the generic value form: {error}"),
        })?;
        Ok(Value::from_json(&json))
    }

    pub fn to_json(&self) -> Result<JsonValue, MapError> {
        Ok(match self {
            Value::Null => JsonValue::Null,
            Value::Bool(v) => JsonValue::Bool(*v),
            Value::Int(v) => (*v).into(),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .ok_or_else(|| MapError::InvalidArgument {
                    reason: "cannot encode NaN or infinite floats to JSON".to_string(),
                })?,
            Value::String(text) => JsonValue::String(text.clone()),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(item.to_json()?);
                }
                JsonValue::Array(out)
            }
            Value::Map(entries) => {
                let mut object = serde_json::Map::with_capacity(entries.len());
                for (key, value) in entries.iter() {
                    object.insert(key.clone(), value.to_json()?);
                }
                JsonValue::Object(object)
            }
            Value::Object(instance) => {
                let mut object = serde_json::Map::with_capacity(instance.fields.len());
                for (name, value) in instance.fields.iter() {
                    object.insert(name.clone(), value.to_json()?);
                }
                JsonValue::Object(object)
            }
            Value::Collection(collection) => {
                let mut out = Vec::with_capacity(collection.items.len());
                for item in &collection.items {
                    out.push(item.to_json()?);
                }
                JsonValue::Array(out)
            }
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
            Value::Array(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Object(instance) => {
                write!(f, "{}(", instance.class)?;
                for (index, (name, value)) in instance.fields.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, ")")
            }
            Value::Collection(collection) => {
                write!(f, "{}[", collection.class)?;
                for (index, value) in collection.items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Object(instance) => {
                let mut map = serializer.serialize_map(Some(instance.fields.len()))?;
                for (name, value) in &instance.fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Value::Collection(collection) => {
                let mut seq = serializer.serialize_seq(Some(collection.items.len()))?;
                for value in &collection.items {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}
