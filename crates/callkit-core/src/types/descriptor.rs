//! Type descriptors: the shape of a value, independent of any runtime type system.
//!
//! Coercion decisions are driven entirely by these descriptors:
//! the scanner registry looks them up by exact identity, by capability,
//! and by kind before falling back to the default scanner.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::value::{OpaqueValue, Value};
use crate::errors::BoxError;

/// Primitive value kinds with their declared width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Text,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Instant,
    Duration,
}

impl PrimitiveKind {
    /// The category used by the kind tier of a scanner registry.
    pub fn kind(self) -> Kind {
        match self {
            Self::Text => Kind::Text,
            Self::Bool => Kind::Bool,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 => Kind::Int,
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => Kind::Uint,
            Self::F32 | Self::F64 => Kind::Float,
            Self::Instant => Kind::Instant,
            Self::Duration => Kind::Duration,
        }
    }

    /// Rust spelling of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "String",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Instant => "DateTime",
            Self::Duration => "Duration",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self.kind(), Kind::Int | Kind::Uint | Kind::Float)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse category of a descriptor. Keys the kind tier of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Text,
    Bool,
    Int,
    Uint,
    Float,
    Instant,
    Duration,
    Optional,
    Sequence,
    Composite,
    Opaque,
    Context,
    Error,
}

/// Capabilities an opaque type can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// The type can parse itself from text.
    TextParse,
    /// The type represents an uploaded file.
    File,
    /// The type is one of a fixed list of options.
    Enumeration,
}

impl Capability {
    pub fn name(self) -> &'static str {
        match self {
            Self::TextParse => "text-parse",
            Self::File => "file",
            Self::Enumeration => "enum",
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text-parse" => Ok(Self::TextParse),
            "file" => Ok(Self::File),
            "enum" => Ok(Self::Enumeration),
            other => Err(format!("unknown capability: {other}")),
        }
    }
}

/// One named field of a composite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A composite of named fields, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeType {
    pub name: String,
    pub fields: Vec<Field>,
}

impl CompositeType {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Hook turning text into a value of an opaque type.
pub type ParseHook = fn(&str) -> Result<Value, BoxError>;

/// Hook producing the zero value of an opaque type.
pub type ZeroHook = fn() -> Value;

/// A type the engine knows only by name and capabilities.
///
/// Identity is the name: two opaque types with the same name are the same type.
#[derive(Clone)]
pub struct OpaqueType {
    pub name: String,
    capabilities: Vec<Capability>,
    options: Vec<String>,
    parse: Option<ParseHook>,
    zero: Option<ZeroHook>,
}

impl OpaqueType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: Vec::new(),
            options: Vec::new(),
            parse: None,
            zero: None,
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    /// Attach a text parser. Implies [`Capability::TextParse`].
    pub fn with_parser(mut self, parse: ParseHook) -> Self {
        self.parse = Some(parse);
        self.with_capability(Capability::TextParse)
    }

    /// Restrict the type to a list of options. Implies [`Capability::Enumeration`].
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self.with_capability(Capability::Enumeration)
    }

    pub fn with_zero(mut self, zero: ZeroHook) -> Self {
        self.zero = Some(zero);
        self
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn parser(&self) -> Option<ParseHook> {
        self.parse
    }

    pub fn zero_value(&self) -> Value {
        match self.zero {
            Some(zero) => zero(),
            None => Value::Opaque(OpaqueValue::unset(&self.name)),
        }
    }
}

impl fmt::Debug for OpaqueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueType")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("options", &self.options)
            .field("parse", &self.parse.is_some())
            .finish()
    }
}

impl PartialEq for OpaqueType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for OpaqueType {}

impl Hash for OpaqueType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// The shape of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Optional(Box<TypeDescriptor>),
    /// Variable length when `len` is `None`, fixed length otherwise.
    Sequence {
        element: Box<TypeDescriptor>,
        len: Option<usize>,
    },
    Composite(CompositeType),
    Opaque(OpaqueType),
    /// The recognized cancellation-context type.
    Context,
    /// The recognized error-result type.
    Error,
}

impl TypeDescriptor {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn sequence(element: TypeDescriptor) -> Self {
        Self::Sequence {
            element: Box::new(element),
            len: None,
        }
    }

    pub fn array(element: TypeDescriptor, len: usize) -> Self {
        Self::Sequence {
            element: Box::new(element),
            len: Some(len),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Primitive(p) => p.kind(),
            Self::Optional(_) => Kind::Optional,
            Self::Sequence { .. } => Kind::Sequence,
            Self::Composite(_) => Kind::Composite,
            Self::Opaque(_) => Kind::Opaque,
            Self::Context => Kind::Context,
            Self::Error => Kind::Error,
        }
    }

    /// Capabilities exposed by the type. Only opaque types expose any.
    pub fn capabilities(&self) -> &[Capability] {
        match self {
            Self::Opaque(o) => o.capabilities(),
            _ => &[],
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// The value an absent argument binds to.
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Primitive(kind) => match kind {
                PrimitiveKind::Text => Value::Text(String::new()),
                PrimitiveKind::Bool => Value::Bool(false),
                PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64 => {
                    Value::Int(0)
                }
                PrimitiveKind::U8 | PrimitiveKind::U16 | PrimitiveKind::U32 | PrimitiveKind::U64 => {
                    Value::Uint(0)
                }
                PrimitiveKind::F32 | PrimitiveKind::F64 => Value::Float(0.0),
                PrimitiveKind::Instant => Value::Instant(super::temporal::zero_instant()),
                PrimitiveKind::Duration => Value::Duration(chrono::TimeDelta::zero()),
            },
            Self::Optional(_) => Value::Optional(None),
            Self::Sequence { element, len } => match len {
                Some(n) => Value::Sequence((0..*n).map(|_| element.zero_value()).collect()),
                None => Value::Sequence(Vec::new()),
            },
            Self::Composite(c) => Value::Composite(
                c.fields
                    .iter()
                    .map(|f| (f.name.clone(), f.ty.zero_value()))
                    .collect(),
            ),
            Self::Opaque(o) => o.zero_value(),
            Self::Context => Value::Context(crate::types::context::Context::background()),
            Self::Error => Value::Optional(None),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{kind}"),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
            Self::Sequence { element, len: None } => write!(f, "Vec<{element}>"),
            Self::Sequence {
                element,
                len: Some(n),
            } => write!(f, "[{element}; {n}]"),
            Self::Composite(c) => f.write_str(&c.name),
            Self::Opaque(o) => f.write_str(&o.name),
            Self::Context => f.write_str("Context"),
            Self::Error => f.write_str("Error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let ty = TypeDescriptor::array(
            TypeDescriptor::optional(TypeDescriptor::sequence(TypeDescriptor::primitive(
                PrimitiveKind::I64,
            ))),
            3,
        );
        assert_eq!(ty.to_string(), "[Option<Vec<i64>>; 3]");
    }

    #[test]
    fn test_opaque_identity_is_name() {
        let a = OpaqueType::new("Color").with_capability(Capability::File);
        let b = OpaqueType::new("Color");
        assert_eq!(TypeDescriptor::Opaque(a), TypeDescriptor::Opaque(b));
    }

    #[test]
    fn test_fixed_sequence_zero_has_len_elements() {
        let ty = TypeDescriptor::array(TypeDescriptor::primitive(PrimitiveKind::U8), 4);
        assert_eq!(ty.zero_value(), Value::Sequence(vec![Value::Uint(0); 4]));
    }

    #[test]
    fn test_kind_categories() {
        assert_eq!(PrimitiveKind::I16.kind(), Kind::Int);
        assert_eq!(PrimitiveKind::U64.kind(), Kind::Uint);
        assert_eq!(PrimitiveKind::F32.kind(), Kind::Float);
        assert_eq!(TypeDescriptor::Context.kind(), Kind::Context);
    }

    #[test]
    fn test_options_imply_enumeration() {
        let ty = OpaqueType::new("Level").with_options(["low", "high"]);
        assert!(ty.has_capability(Capability::Enumeration));
        assert_eq!(ty.options(), ["low".to_string(), "high".to_string()]);
    }
}
