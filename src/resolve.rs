use std::sync::Arc;

use indexmap::IndexMap;

use crate::descriptor::TypeDescriptor;
use crate::error::MapError;
use crate::value::Value;

type ResolverFn = dyn Fn(&str, &Value) -> String + Send + Sync;

/// Caller-supplied override table remapping declared type names to effective
/// types, optionally depending on the input value.
#[derive(Clone)]
pub enum ClassMapEntry {
    Name(String),
    Resolver(Arc<ResolverFn>),
}

impl ClassMapEntry {
    pub fn resolver<F>(resolver: F) -> Self
    where
        F: Fn(&str, &Value) -> String + Send + Sync + 'static,
    {
        ClassMapEntry::Resolver(Arc::new(resolver))
    }
}

pub type ClassMap = IndexMap<String, ClassMapEntry>;

/// Prefixes unrooted structured names with the context namespace. Scalars,
/// `mixed`, rooted names, and empty namespaces pass through untouched.
pub(crate) fn qualify(descriptor: &TypeDescriptor, namespace: &str) -> TypeDescriptor {
    if namespace.is_empty() {
        return descriptor.clone();
    }
    match descriptor {
        TypeDescriptor::Named(name) => TypeDescriptor::Named(qualify_name(name, namespace)),
        TypeDescriptor::Array(element) => {
            TypeDescriptor::Array(Box::new(qualify(element, namespace)))
        }
        TypeDescriptor::Container(name, element) => {
            TypeDescriptor::Container(qualify_name(name, namespace), element.clone())
        }
        TypeDescriptor::Union(alternatives) => TypeDescriptor::Union(
            alternatives
                .iter()
                .map(|alternative| qualify(alternative, namespace))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn qualify_name(name: &str, namespace: &str) -> String {
    if name.is_empty() || name.starts_with("::") {
        name.to_string()
    } else {
        format!("::{namespace}::{name}")
    }
}

/// Applies the Class Map to a qualified type and rejects what cannot be
/// mapped further: an empty replacement and any union left standing.
pub(crate) fn apply_override(
    class_map: &ClassMap,
    descriptor: &TypeDescriptor,
    value: &Value,
    property: &str,
    class: &str,
) -> Result<TypeDescriptor, MapError> {
    let rendered = descriptor.to_string();
    let entry = class_map.get(&rendered).or_else(|| {
        rendered
            .strip_prefix("::")
            .and_then(|unrooted| class_map.get(unrooted))
    });
    let effective = match entry {
        Some(ClassMapEntry::Name(name)) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(MapError::EmptyType {
                    property: property.to_string(),
                    class: class.to_string(),
                });
            }
            TypeDescriptor::parse(name)
        }
        Some(ClassMapEntry::Resolver(resolver)) => {
            let name = resolver(&rendered, value);
            let name = name.trim();
            if name.is_empty() {
                return Err(MapError::EmptyType {
                    property: property.to_string(),
                    class: class.to_string(),
                });
            }
            TypeDescriptor::parse(name)
        }
        None => descriptor.clone(),
    };
    if let TypeDescriptor::Union(_) = effective {
        return Err(MapError::AmbiguousUnion {
            property: property.to_string(),
            class: class.to_string(),
            declared: effective.to_string(),
        });
    }
    Ok(effective)
}
