use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("property `{property}` of class `{class}` does not allow null")]
    NullNotAllowed { property: String, class: String },

    #[error("cannot coerce {found} value into `{expected}` for property `{property}` of class `{class}`")]
    TypeMismatch {
        property: String,
        class: String,
        expected: String,
        found: &'static str,
    },

    #[error("type of property `{property}` of class `{class}` resolved to an empty string")]
    EmptyType { property: String, class: String },

    #[error("type `{declared}` of property `{property}` of class `{class}` is an ambiguous union")]
    AmbiguousUnion {
        property: String,
        class: String,
        declared: String,
    },

    #[error("property `{property}` of class `{class}` expects a sequence for type `{declared}`, got a flat value")]
    ExpectedArray {
        property: String,
        class: String,
        declared: String,
    },

    #[error("sequence element `{key}` must be of type `{declared}`, got {found}")]
    ArrayElementTypeMismatch {
        key: String,
        declared: String,
        found: &'static str,
    },

    #[error("class `{name}` referenced by property `{property}` is not registered")]
    UnknownClass { name: String, property: String },

    #[error("constructor of class `{class}` failed: {reason}")]
    ConstructorFailed { class: String, reason: String },
}
