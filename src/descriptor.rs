use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Bool,
    Int,
    Float,
    Array,
    Object,
}

impl ScalarKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Array => "array",
            ScalarKind::Object => "object",
        }
    }

    fn from_keyword(text: &str) -> Option<ScalarKind> {
        match text {
            "string" => Some(ScalarKind::String),
            "bool" | "boolean" => Some(ScalarKind::Bool),
            "int" | "integer" => Some(ScalarKind::Int),
            "float" | "double" => Some(ScalarKind::Float),
            "array" => Some(ScalarKind::Array),
            "object" => Some(ScalarKind::Object),
            _ => None,
        }
    }
}

/// Structured form of a declared type string. Parsed once from the text
/// attached to a member; resolution and mapping decisions work on this form
/// instead of slicing strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// The `null` alternative of a union, or a member declared plain `null`.
    Null,
    /// `mixed`: the input value passes through unchanged.
    Dynamic,
    Scalar(ScalarKind),
    /// A structured type name, optionally `::`-qualified; a leading `::`
    /// means the name is absolute.
    Named(String),
    /// `T[]` or `array[T]`: a plain sequence of T.
    Array(Box<TypeDescriptor>),
    /// `Name[T]`: a constructible container holding T.
    Container(String, Box<TypeDescriptor>),
    /// Alternatives joined by `|`. Never mapped directly; either the null
    /// alternative is stripped away or the union is rejected as ambiguous.
    Union(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn parse(text: &str) -> TypeDescriptor {
        let mut alternatives = Vec::new();
        for part in split_top_level(text) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            alternatives.push(parse_single(part));
        }
        match alternatives.len() {
            0 => TypeDescriptor::Dynamic,
            1 => alternatives.into_iter().next().unwrap(),
            _ => TypeDescriptor::Union(alternatives),
        }
    }

    pub fn is_simple(&self) -> bool {
        matches!(self, TypeDescriptor::Scalar(_))
    }

    /// Removes the `null` alternative, reporting whether one was present.
    /// A bare `null` stays `Null` so the mapper can pass raw values through.
    pub fn strip_null(&self) -> (TypeDescriptor, bool) {
        match self {
            TypeDescriptor::Null => (TypeDescriptor::Null, true),
            TypeDescriptor::Union(alternatives) => {
                let rest: Vec<TypeDescriptor> = alternatives
                    .iter()
                    .filter(|alt| !matches!(alt, TypeDescriptor::Null))
                    .cloned()
                    .collect();
                let had_null = rest.len() != alternatives.len();
                let stripped = match rest.len() {
                    0 => TypeDescriptor::Null,
                    1 => rest.into_iter().next().unwrap(),
                    _ => TypeDescriptor::Union(rest),
                };
                (stripped, had_null)
            }
            other => (other.clone(), false),
        }
    }
}

fn parse_single(part: &str) -> TypeDescriptor {
    if part.eq_ignore_ascii_case("null") {
        return TypeDescriptor::Null;
    }
    if part == "mixed" {
        return TypeDescriptor::Dynamic;
    }
    // a trailing `[]` is only the array marker when it is not the tail of a
    // bracketed form, as in `Bag[int[]]`
    if let Some(element) = part.strip_suffix("[]") {
        if brackets_balanced(element) {
            return TypeDescriptor::Array(Box::new(TypeDescriptor::parse(element)));
        }
    }
    if let Some(open) = part.find('[') {
        if let Some(inner) = part[open..].strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let name = &part[..open];
            let element = TypeDescriptor::parse(inner);
            if name == "array" {
                return TypeDescriptor::Array(Box::new(element));
            }
            return TypeDescriptor::Container(name.to_string(), Box::new(element));
        }
    }
    if let Some(kind) = ScalarKind::from_keyword(part) {
        return TypeDescriptor::Scalar(kind);
    }
    TypeDescriptor::Named(part.to_string())
}

fn brackets_balanced(text: &str) -> bool {
    let mut depth = 0i32;
    for ch in text.chars() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Splits on `|` outside of brackets, so `array[int|string]` stays whole.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (index, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                parts.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Null => write!(f, "null"),
            TypeDescriptor::Dynamic => write!(f, "mixed"),
            TypeDescriptor::Scalar(kind) => write!(f, "{}", kind.keyword()),
            TypeDescriptor::Named(name) => write!(f, "{name}"),
            TypeDescriptor::Array(element) => write!(f, "{element}[]"),
            TypeDescriptor::Container(name, element) => write!(f, "{name}[{element}]"),
            TypeDescriptor::Union(alternatives) => {
                for (index, alternative) in alternatives.iter().enumerate() {
                    if index > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{alternative}")?;
                }
                Ok(())
            }
        }
    }
}
