//! Recursive descent from decoded generic values into registered classes.
//!
//! A failed member aborts the whole call and leaves the target populated up
//! to that point; callers must not treat a failed mapping as untouched.

use std::sync::Arc;

use crate::coerce;
use crate::descriptor::{ScalarKind, TypeDescriptor};
use crate::error::MapError;
use crate::factory;
use crate::logging::{LogLevel, Logger};
use crate::metadata::{MetadataCache, PropertyDescriptor};
use crate::resolve::{self, ClassMap};
use crate::schema::{ClassKind, SchemaRegistry};
use crate::value::{CollectionInstance, ObjectInstance, Value};

pub type UndefinedPropertyHandler = Arc<dyn Fn(&mut ObjectInstance, &str, &Value) + Send + Sync>;

pub struct Mapper {
    registry: Arc<SchemaRegistry>,
    class_map: ClassMap,
    undefined_property_handler: Option<UndefinedPropertyHandler>,
    logger: Option<Arc<dyn Logger>>,
    cache: MetadataCache,
}

impl Mapper {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            class_map: ClassMap::new(),
            undefined_property_handler: None,
            logger: None,
            cache: MetadataCache::new(),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn class_map(&self) -> &ClassMap {
        &self.class_map
    }

    /// The Class Map is caller configuration; mutate it between mapping
    /// calls, never concurrently with one.
    pub fn class_map_mut(&mut self) -> &mut ClassMap {
        &mut self.class_map
    }

    pub fn set_undefined_property_handler(&mut self, handler: UndefinedPropertyHandler) {
        self.undefined_property_handler = Some(handler);
    }

    pub fn clear_undefined_property_handler(&mut self) {
        self.undefined_property_handler = None;
    }

    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = Some(logger);
    }

    /// Member metadata for a registered class, derived once per
    /// (class, property) pair and cached for the process lifetime.
    pub fn describe(&self, class: &str, property: &str) -> Option<Arc<PropertyDescriptor>> {
        let class = self.registry.get(class)?;
        Some(
            self.cache
                .describe(&self.registry, class, property, self.logger.as_deref()),
        )
    }

    fn log(&self, level: LogLevel, message: &str, context: &[(&str, String)]) {
        if let Some(logger) = &self.logger {
            logger.log(level, message, context);
        }
    }

    /// Maps every key of `input` onto the members of `target`. The target
    /// class and every structured type reached from it must be registered.
    pub fn map_object(&self, input: &Value, target: &mut ObjectInstance) -> Result<(), MapError> {
        let Value::Map(entries) = input else {
            return Err(MapError::InvalidArgument {
                reason: format!(
                    "map_object expects a key/value map as input, got {}",
                    input.kind_name()
                ),
            });
        };
        let class = Arc::clone(self.registry.get(&target.class).ok_or_else(|| {
            MapError::InvalidArgument {
                reason: format!("target class `{}` is not registered", target.class),
            }
        })?);
        let namespace = class.namespace().to_string();

        for (key, raw) in entries {
            let member = normalize_key(key);
            let descriptor =
                self.cache
                    .describe(&self.registry, &class, &member, self.logger.as_deref());
            if !descriptor.exists {
                match &self.undefined_property_handler {
                    Some(handler) => handler(target, key.as_str(), raw),
                    None => self.log(
                        LogLevel::Info,
                        "ignoring input key with no matching member",
                        &[
                            ("key", key.clone()),
                            ("class", class.name().to_string()),
                        ],
                    ),
                }
                continue;
            }
            let Some(accessor) = &descriptor.accessor else {
                self.log(
                    LogLevel::Info,
                    "skipping member without a writable accessor",
                    &[
                        ("member", member.clone()),
                        ("class", class.name().to_string()),
                    ],
                );
                continue;
            };
            if raw.is_null() {
                if descriptor.nullable {
                    target.set_field(accessor.name(), Value::Null);
                    continue;
                }
                return Err(MapError::NullNotAllowed {
                    property: member,
                    class: class.name().to_string(),
                });
            }
            let child = self.map_member(
                raw,
                descriptor.declared.as_ref(),
                &namespace,
                &member,
                class.name(),
            )?;
            target.set_field(accessor.name(), child);
        }
        Ok(())
    }

    /// Maps the elements of a sequence (or an index-keyed map) with
    /// `element_type` as the declared element type.
    pub fn map_sequence(
        &self,
        input: &Value,
        element_type: &TypeDescriptor,
        context_key: &str,
    ) -> Result<Vec<Value>, MapError> {
        self.sequence(input, element_type, context_key, "<sequence>", "")
    }

    fn map_member(
        &self,
        raw: &Value,
        declared: Option<&TypeDescriptor>,
        namespace: &str,
        property: &str,
        class: &str,
    ) -> Result<Value, MapError> {
        let Some(declared) = declared else {
            return Ok(raw.clone());
        };
        let qualified = resolve::qualify(declared, namespace);
        let effective =
            resolve::apply_override(&self.class_map, &qualified, raw, property, class)?;
        self.map_value(raw, &effective, namespace, property, class)
    }

    fn map_value(
        &self,
        raw: &Value,
        effective: &TypeDescriptor,
        namespace: &str,
        property: &str,
        class: &str,
    ) -> Result<Value, MapError> {
        match effective {
            TypeDescriptor::Null | TypeDescriptor::Dynamic => Ok(raw.clone()),
            TypeDescriptor::Union(_) => Err(MapError::AmbiguousUnion {
                property: property.to_string(),
                class: class.to_string(),
                declared: effective.to_string(),
            }),
            TypeDescriptor::Scalar(kind) => coerce::coerce(raw, *kind, property, class),
            TypeDescriptor::Array(element) => {
                if raw.is_flat() {
                    return Err(MapError::ExpectedArray {
                        property: property.to_string(),
                        class: class.to_string(),
                        declared: effective.to_string(),
                    });
                }
                let element = resolve::qualify(element, namespace);
                let items = self.sequence(raw, &element, property, class, namespace)?;
                Ok(Value::Array(items))
            }
            TypeDescriptor::Container(name, element) => {
                if raw.is_flat() {
                    return Err(MapError::ExpectedArray {
                        property: property.to_string(),
                        class: class.to_string(),
                        declared: effective.to_string(),
                    });
                }
                let container = self.registry.get(name).ok_or_else(|| {
                    MapError::UnknownClass {
                        name: name.clone(),
                        property: property.to_string(),
                    }
                })?;
                let element = resolve::qualify(element, namespace);
                let items = self.sequence(raw, &element, property, class, namespace)?;
                Ok(Value::Collection(CollectionInstance {
                    class: container.name().to_string(),
                    items,
                }))
            }
            TypeDescriptor::Named(name) => {
                if self.already_satisfies(raw, name) {
                    return Ok(raw.clone());
                }
                let target = Arc::clone(self.registry.get(name).ok_or_else(|| {
                    MapError::UnknownClass {
                        name: name.clone(),
                        property: property.to_string(),
                    }
                })?);
                if target.kind() == ClassKind::Collection {
                    // container-capability without a declared element type:
                    // elements pass through unchanged
                    if raw.is_flat() {
                        return Err(MapError::ExpectedArray {
                            property: property.to_string(),
                            class: class.to_string(),
                            declared: effective.to_string(),
                        });
                    }
                    let items =
                        self.sequence(raw, &TypeDescriptor::Dynamic, property, class, namespace)?;
                    return Ok(Value::Collection(CollectionInstance {
                        class: target.name().to_string(),
                        items,
                    }));
                }
                if raw.is_flat() {
                    return factory::create(&target, Some(raw));
                }
                match factory::create(&target, None)? {
                    Value::Object(mut instance) => {
                        self.map_object(raw, &mut instance)?;
                        Ok(Value::Object(instance))
                    }
                    constructed => Ok(constructed),
                }
            }
        }
    }

    fn sequence(
        &self,
        input: &Value,
        element_type: &TypeDescriptor,
        context_key: &str,
        class: &str,
        namespace: &str,
    ) -> Result<Vec<Value>, MapError> {
        let mut out;
        match input {
            Value::Array(items) => {
                out = Vec::with_capacity(items.len());
                for (index, element) in items.iter().enumerate() {
                    let context = format!("{context_key}[{index}]");
                    out.push(self.element(element, element_type, &context, class, namespace)?);
                }
            }
            Value::Map(entries) => {
                out = Vec::with_capacity(entries.len());
                for (key, element) in entries {
                    let context = format!("{context_key}[{key}]");
                    out.push(self.element(element, element_type, &context, class, namespace)?);
                }
            }
            other => {
                return Err(MapError::InvalidArgument {
                    reason: format!(
                        "map_sequence expects a sequence as input, got {}",
                        other.kind_name()
                    ),
                })
            }
        }
        Ok(out)
    }

    fn element(
        &self,
        element: &Value,
        element_type: &TypeDescriptor,
        context: &str,
        class: &str,
        namespace: &str,
    ) -> Result<Value, MapError> {
        // element types may be value-dependent, so the override is re-applied
        // per element
        let effective =
            resolve::apply_override(&self.class_map, element_type, element, context, class)?;
        if element.is_null() {
            return Ok(Value::Null);
        }
        match &effective {
            TypeDescriptor::Null | TypeDescriptor::Dynamic => Ok(element.clone()),
            TypeDescriptor::Union(_) => Err(MapError::AmbiguousUnion {
                property: context.to_string(),
                class: class.to_string(),
                declared: effective.to_string(),
            }),
            TypeDescriptor::Array(inner) => {
                if element.is_flat() {
                    return Err(MapError::ExpectedArray {
                        property: context.to_string(),
                        class: class.to_string(),
                        declared: effective.to_string(),
                    });
                }
                let items = self.sequence(element, inner, context, class, namespace)?;
                Ok(Value::Array(items))
            }
            TypeDescriptor::Scalar(kind) => {
                if element.is_flat()
                    || matches!(kind, ScalarKind::Array | ScalarKind::Object)
                {
                    return coerce::coerce(element, *kind, context, class);
                }
                Err(MapError::ArrayElementTypeMismatch {
                    key: context.to_string(),
                    declared: effective.to_string(),
                    found: element.kind_name(),
                })
            }
            TypeDescriptor::Named(name) => {
                if self.already_satisfies(element, name) {
                    return Ok(element.clone());
                }
                let target = Arc::clone(self.registry.get(name).ok_or_else(|| {
                    MapError::UnknownClass {
                        name: name.clone(),
                        property: context.to_string(),
                    }
                })?);
                if element.is_flat() {
                    return factory::create(&target, Some(element));
                }
                if target.kind() == ClassKind::Collection {
                    let items =
                        self.sequence(element, &TypeDescriptor::Dynamic, context, class, namespace)?;
                    return Ok(Value::Collection(CollectionInstance {
                        class: target.name().to_string(),
                        items,
                    }));
                }
                match factory::create(&target, None)? {
                    Value::Object(mut instance) => {
                        self.map_object(element, &mut instance)?;
                        Ok(Value::Object(instance))
                    }
                    constructed => Ok(constructed),
                }
            }
            TypeDescriptor::Container(name, inner) => {
                let target = Arc::clone(self.registry.get(name).ok_or_else(|| {
                    MapError::UnknownClass {
                        name: name.clone(),
                        property: context.to_string(),
                    }
                })?);
                if element.is_flat() {
                    return factory::create(&target, Some(element));
                }
                let inner = resolve::qualify(inner, namespace);
                let items = self.sequence(element, &inner, context, class, namespace)?;
                Ok(Value::Collection(CollectionInstance {
                    class: target.name().to_string(),
                    items,
                }))
            }
        }
    }

    /// True when the input is already an instance of the resolved class or
    /// one of its descendants; such values are assigned unchanged.
    fn already_satisfies(&self, value: &Value, class_name: &str) -> bool {
        match value {
            Value::Object(instance) => self.registry.is_instance_of(&instance.class, class_name),
            Value::Collection(collection) => {
                self.registry.is_instance_of(&collection.class, class_name)
            }
            _ => false,
        }
    }
}

/// Hyphenated input keys follow the member naming convention after
/// camel-casing: `first-name` looks up `firstName`.
fn normalize_key(key: &str) -> String {
    if !key.contains('-') {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '-' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
