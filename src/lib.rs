mod coerce;
mod descriptor;
mod error;
mod factory;
mod logging;
mod mapper;
mod metadata;
mod resolve;
mod schema;
mod value;

pub use crate::descriptor::{ScalarKind, TypeDescriptor};
pub use crate::error::MapError;
pub use crate::logging::{LogLevel, Logger, NullLogger, TracingLogger};
pub use crate::mapper::{Mapper, UndefinedPropertyHandler};
pub use crate::metadata::{Accessor, PropertyDescriptor};
pub use crate::resolve::{ClassMap, ClassMapEntry};
pub use crate::schema::{
    ClassDef, ClassKind, ConstructorDef, ConstructorParam, FieldDef, SchemaRegistry, SetterDef,
};
pub use crate::value::{CollectionInstance, ObjectInstance, Value};
