//! Per-(class, property) member metadata. Descriptors are derived once and
//! cached for the process lifetime; racing writers produce equivalent entries.

use std::sync::Arc;

use dashmap::DashMap;

use crate::descriptor::TypeDescriptor;
use crate::logging::{LogLevel, Logger};
use crate::schema::{ClassDef, FieldDef, SchemaRegistry, SetterDef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Setter(String),
    Field(String),
}

impl Accessor {
    /// Canonical member name the accessor writes to.
    pub fn name(&self) -> &str {
        match self {
            Accessor::Setter(name) => name,
            Accessor::Field(name) => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub exists: bool,
    /// `None` with `exists` set means the member is not publicly writable;
    /// the mapper skips it.
    pub accessor: Option<Accessor>,
    /// Declared type with the null alternative already stripped. `None` means
    /// no type information: values pass through unchanged.
    pub declared: Option<TypeDescriptor>,
    pub nullable: bool,
}

impl PropertyDescriptor {
    fn missing() -> Self {
        Self {
            exists: false,
            accessor: None,
            declared: None,
            nullable: false,
        }
    }

    fn unwritable() -> Self {
        Self {
            exists: true,
            accessor: None,
            declared: None,
            nullable: false,
        }
    }
}

#[derive(Default)]
pub(crate) struct MetadataCache {
    entries: DashMap<(String, String), Arc<PropertyDescriptor>>,
}

impl MetadataCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub(crate) fn describe(
        &self,
        registry: &SchemaRegistry,
        class: &ClassDef,
        property: &str,
        logger: Option<&dyn Logger>,
    ) -> Arc<PropertyDescriptor> {
        let key = (class.name().to_string(), property.to_string());
        if let Some(hit) = self.entries.get(&key) {
            return Arc::clone(hit.value());
        }
        let built = Arc::new(extract(registry, class, property, logger));
        self.entries.insert(key, Arc::clone(&built));
        built
    }
}

fn extract(
    registry: &SchemaRegistry,
    class: &ClassDef,
    property: &str,
    logger: Option<&dyn Logger>,
) -> PropertyDescriptor {
    if let Some(setter) = find_setter(registry, class, property) {
        if setter.public {
            return from_setter(&setter);
        }
    }
    if let Some(field) = find_field(registry, class, property) {
        if !field.public {
            return PropertyDescriptor::unwritable();
        }
        return from_field(&field);
    }
    if let Some(canonical) = find_case_insensitive(registry, class, property) {
        if let Some(logger) = logger {
            logger.log(
                LogLevel::Debug,
                "matched input key to a member case-insensitively",
                &[
                    ("property", property.to_string()),
                    ("member", canonical.clone()),
                    ("class", class.name().to_string()),
                ],
            );
        }
        return extract(registry, class, &canonical, logger);
    }
    PropertyDescriptor::missing()
}

fn from_setter(setter: &SetterDef) -> PropertyDescriptor {
    let accessor = Some(Accessor::Setter(setter.property.clone()));
    match setter.native.as_deref() {
        // A concrete native parameter type wins; the annotation is not
        // consulted. The generic `array` marker defers to a more specific
        // annotation below.
        Some(native) if native != "array" => {
            let (declared, null_in_text) = TypeDescriptor::parse(native).strip_null();
            PropertyDescriptor {
                exists: true,
                accessor,
                declared: Some(declared),
                nullable: setter.allows_null || null_in_text,
            }
        }
        native => {
            if let Some(token) = annotation_token(setter.annotation.as_deref(), "@param") {
                let (declared, null_in_text) = TypeDescriptor::parse(token).strip_null();
                return PropertyDescriptor {
                    exists: true,
                    accessor,
                    declared: Some(declared),
                    nullable: setter.allows_null || null_in_text,
                };
            }
            if native == Some("array") {
                return PropertyDescriptor {
                    exists: true,
                    accessor,
                    declared: Some(TypeDescriptor::parse("array")),
                    nullable: setter.allows_null,
                };
            }
            PropertyDescriptor {
                exists: true,
                accessor,
                declared: None,
                nullable: true,
            }
        }
    }
}

fn from_field(field: &FieldDef) -> PropertyDescriptor {
    let accessor = Some(Accessor::Field(field.name.clone()));
    if let Some(token) = annotation_token(field.annotation.as_deref(), "@var") {
        let (declared, null_in_text) = TypeDescriptor::parse(token).strip_null();
        return PropertyDescriptor {
            exists: true,
            accessor,
            declared: Some(declared),
            nullable: field.allows_null || null_in_text,
        };
    }
    if let Some(native) = field.native.as_deref() {
        let (parsed, null_in_text) = TypeDescriptor::parse(native).strip_null();
        // Native field types that are not simple scalars are already fully
        // qualified; root them so namespace qualification leaves them alone.
        let declared = if parsed.is_simple() {
            parsed
        } else {
            root(parsed)
        };
        return PropertyDescriptor {
            exists: true,
            accessor,
            declared: Some(declared),
            nullable: field.allows_null || null_in_text,
        };
    }
    PropertyDescriptor {
        exists: true,
        accessor,
        declared: None,
        nullable: true,
    }
}

fn root(descriptor: TypeDescriptor) -> TypeDescriptor {
    match descriptor {
        TypeDescriptor::Named(name) => TypeDescriptor::Named(root_name(name)),
        TypeDescriptor::Array(element) => TypeDescriptor::Array(Box::new(root(*element))),
        TypeDescriptor::Container(name, element) => {
            TypeDescriptor::Container(root_name(name), element)
        }
        other => other,
    }
}

fn root_name(name: String) -> String {
    if name.starts_with("::") {
        name
    } else {
        format!("::{name}")
    }
}

/// First whitespace-delimited token following the tag, e.g. the type text of
/// `@param string|null $name`.
fn annotation_token<'a>(docblock: Option<&'a str>, tag: &str) -> Option<&'a str> {
    let docblock = docblock?;
    let mut tokens = docblock.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == tag {
            return tokens.next();
        }
    }
    None
}

fn find_setter(registry: &SchemaRegistry, class: &ClassDef, property: &str) -> Option<SetterDef> {
    if let Some(setter) = class.setters.get(property) {
        return Some(setter.clone());
    }
    for ancestor in registry.ancestors(class) {
        if let Some(setter) = ancestor.setters.get(property) {
            return Some(setter.clone());
        }
    }
    None
}

fn find_field(registry: &SchemaRegistry, class: &ClassDef, property: &str) -> Option<FieldDef> {
    if let Some(field) = class.fields.get(property) {
        return Some(field.clone());
    }
    for ancestor in registry.ancestors(class) {
        if let Some(field) = ancestor.fields.get(property) {
            return Some(field.clone());
        }
    }
    None
}

fn find_case_insensitive(
    registry: &SchemaRegistry,
    class: &ClassDef,
    property: &str,
) -> Option<String> {
    let mut scope: Vec<&ClassDef> = vec![class];
    let ancestors = registry.ancestors(class);
    scope.extend(ancestors.iter().map(|ancestor| ancestor.as_ref()));
    for candidate in &scope {
        for setter in candidate.setters.values() {
            if setter.public && setter.property.eq_ignore_ascii_case(property) {
                return Some(setter.property.clone());
            }
        }
    }
    for candidate in &scope {
        for field in candidate.fields.values() {
            if field.public && field.name.eq_ignore_ascii_case(property) {
                return Some(field.name.clone());
            }
        }
    }
    None
}
