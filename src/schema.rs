use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Object,
    /// Container-capability: instances hold a sequence of elements instead of
    /// named members.
    Collection,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub(crate) name: String,
    pub(crate) native: Option<String>,
    pub(crate) allows_null: bool,
    pub(crate) public: bool,
    pub(crate) annotation: Option<String>,
}

impl FieldDef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            native: None,
            allows_null: false,
            public: true,
            annotation: None,
        }
    }

    pub fn native<S: Into<String>>(mut self, declared: S) -> Self {
        self.native = Some(declared.into());
        self
    }

    pub fn allows_null(mut self) -> Self {
        self.allows_null = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn annotation<S: Into<String>>(mut self, docblock: S) -> Self {
        self.annotation = Some(docblock.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct SetterDef {
    pub(crate) property: String,
    pub(crate) native: Option<String>,
    pub(crate) allows_null: bool,
    pub(crate) public: bool,
    pub(crate) annotation: Option<String>,
}

impl SetterDef {
    pub fn new<S: Into<String>>(property: S) -> Self {
        Self {
            property: property.into(),
            native: None,
            allows_null: false,
            public: true,
            annotation: None,
        }
    }

    pub fn native<S: Into<String>>(mut self, declared: S) -> Self {
        self.native = Some(declared.into());
        self
    }

    pub fn allows_null(mut self) -> Self {
        self.allows_null = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn annotation<S: Into<String>>(mut self, docblock: S) -> Self {
        self.annotation = Some(docblock.into());
        self
    }

    pub fn property(&self) -> &str {
        &self.property
    }
}

type BuildFn = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

#[derive(Clone)]
pub struct ConstructorDef {
    pub(crate) params: Vec<ConstructorParam>,
    pub(crate) build: Arc<BuildFn>,
}

#[derive(Debug, Clone)]
pub struct ConstructorParam {
    pub name: String,
    pub required: bool,
}

impl ConstructorDef {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            params: Vec::new(),
            build: Arc::new(build),
        }
    }

    pub fn param<S: Into<String>>(mut self, name: S, required: bool) -> Self {
        self.params.push(ConstructorParam {
            name: name.into(),
            required,
        });
        self
    }

    pub(crate) fn has_required_params(&self) -> bool {
        self.params.iter().any(|param| param.required)
    }
}

#[derive(Clone)]
pub struct ClassDef {
    pub(crate) name: String,
    pub(crate) kind: ClassKind,
    pub(crate) parent: Option<String>,
    pub(crate) fields: IndexMap<String, FieldDef>,
    pub(crate) setters: IndexMap<String, SetterDef>,
    pub(crate) constructor: Option<ConstructorDef>,
}

impl ClassDef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: unrooted(name.into()),
            kind: ClassKind::Object,
            parent: None,
            fields: IndexMap::new(),
            setters: IndexMap::new(),
            constructor: None,
        }
    }

    pub fn collection<S: Into<String>>(name: S) -> Self {
        let mut class = Self::new(name);
        class.kind = ClassKind::Collection;
        class
    }

    pub fn parent<S: Into<String>>(mut self, parent: S) -> Self {
        self.parent = Some(unrooted(parent.into()));
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn setter(mut self, setter: SetterDef) -> Self {
        self.setters.insert(setter.property.clone(), setter);
        self
    }

    pub fn constructor(mut self, constructor: ConstructorDef) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Namespace segment of the qualified name, empty for top-level classes.
    pub fn namespace(&self) -> &str {
        match self.name.rfind("::") {
            Some(index) => &self.name[..index],
            None => "",
        }
    }
}

fn unrooted(name: String) -> String {
    match name.strip_prefix("::") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

#[derive(Clone, Default)]
pub struct SchemaRegistry {
    classes: IndexMap<String, Arc<ClassDef>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            classes: IndexMap::new(),
        }
    }

    pub fn register(&mut self, class: ClassDef) -> &mut Self {
        self.classes.insert(class.name.clone(), Arc::new(class));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ClassDef>> {
        self.classes.get(name.strip_prefix("::").unwrap_or(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Parent chain of a class, nearest first. Unregistered parents end the
    /// walk.
    pub fn ancestors(&self, class: &ClassDef) -> Vec<Arc<ClassDef>> {
        let mut chain = Vec::new();
        let mut current = class.parent.clone();
        while let Some(parent_name) = current {
            match self.get(&parent_name) {
                Some(parent) => {
                    current = parent.parent.clone();
                    chain.push(Arc::clone(parent));
                }
                None => break,
            }
        }
        chain
    }

    /// True when `instance_class` is `target` or one of its descendants.
    pub fn is_instance_of(&self, instance_class: &str, target: &str) -> bool {
        let instance_class = instance_class.strip_prefix("::").unwrap_or(instance_class);
        let target = target.strip_prefix("::").unwrap_or(target);
        if instance_class == target {
            return true;
        }
        let Some(class) = self.get(instance_class) else {
            return false;
        };
        self.ancestors(class)
            .iter()
            .any(|ancestor| ancestor.name == target)
    }
}
