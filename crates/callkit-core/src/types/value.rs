//! Dynamic values produced by coercion and consumed by wrapped functions.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeDelta};

use super::context::Context;
use super::temporal::{format_duration, format_instant};

/// A value of an opaque type: its canonical text plus the parsed payload, if any.
#[derive(Clone)]
pub struct OpaqueValue {
    type_name: String,
    text: String,
    inner: Option<Arc<dyn Any + Send + Sync>>,
}

impl OpaqueValue {
    pub fn new<T: Any + Send + Sync>(
        type_name: impl Into<String>,
        text: impl Into<String>,
        inner: T,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            text: text.into(),
            inner: Some(Arc::new(inner)),
        }
    }

    /// A value with no payload, used as the zero value of opaque types
    /// that declare no zero constructor.
    pub fn unset(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            text: String::new(),
            inner: None,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_set(&self) -> bool {
        self.inner.is_some()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_deref().and_then(|inner| inner.downcast_ref::<T>())
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueValue")
            .field("type_name", &self.type_name)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.text == other.text
    }
}

/// A dynamically-shaped value matching a [`TypeDescriptor`](super::TypeDescriptor).
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Instant(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Optional(Option<Box<Value>>),
    Sequence(Vec<Value>),
    /// Fields in declaration order.
    Composite(Vec<(String, Value)>),
    Opaque(OpaqueValue),
    Context(Context),
}

impl Value {
    pub fn some(inner: Value) -> Self {
        Self::Optional(Some(Box::new(inner)))
    }

    pub fn none() -> Self {
        Self::Optional(None)
    }

    /// Short name of the value's shape, used in type mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Instant(_) => "instant",
            Self::Duration(_) => "duration",
            Self::Optional(_) => "optional",
            Self::Sequence(_) => "sequence",
            Self::Composite(_) => "composite",
            Self::Opaque(_) => "opaque",
            Self::Context(_) => "context",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_instant(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Instant(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<&TimeDelta> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a composite field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Composite(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Canonical text. Coercing it back into the value's type yields the value,
    /// except for a present optional whose inner text is itself a nil literal
    /// (`nil` or `null`): text has no escape for it, so it reads back as the
    /// empty optional.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Uint(u) => u.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Instant(t) => format_instant(t),
            Self::Duration(d) => format_duration(d),
            Self::Optional(None) => "nil".to_string(),
            Self::Optional(Some(inner)) => inner.to_text(),
            Self::Sequence(items) => {
                let elements: Vec<String> = items.iter().map(Value::element_text).collect();
                format!("[{}]", elements.join(","))
            }
            Self::Composite(_) => self.to_json().to_string(),
            Self::Opaque(o) => o.text.clone(),
            Self::Context(_) => String::new(),
        }
    }

    /// Text of a value nested in a sequence literal. Strings are JSON-quoted
    /// so embedded commas and brackets survive the element split.
    fn element_text(&self) -> String {
        match self {
            Self::Text(_) | Self::Instant(_) | Self::Duration(_) | Self::Opaque(_) => {
                serde_json::Value::String(self.to_text()).to_string()
            }
            Self::Optional(Some(inner)) => inner.element_text(),
            _ => self.to_text(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Text(s) => Json::String(s.clone()),
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Uint(u) => Json::from(*u),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::Instant(t) => Json::String(format_instant(t)),
            Self::Duration(d) => Json::String(format_duration(d)),
            Self::Optional(None) | Self::Context(_) => Json::Null,
            Self::Optional(Some(inner)) => inner.to_json(),
            Self::Sequence(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Composite(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Opaque(o) => Json::String(o.text.clone()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Uint(a), Self::Uint(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Instant(a), Self::Instant(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Optional(a), Self::Optional(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Composite(a), Self::Composite(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a == b,
            (Self::Context(a), Self::Context(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Self::Uint(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_text_quotes_strings() {
        let v = Value::Sequence(vec![Value::from("a,b"), Value::from("c")]);
        assert_eq!(v.to_text(), r#"["a,b","c"]"#);
    }

    #[test]
    fn test_nested_sequence_text() {
        let v = Value::Sequence(vec![
            Value::Sequence(vec![Value::Int(1), Value::Int(2)]),
            Value::Sequence(vec![]),
        ]);
        assert_eq!(v.to_text(), "[[1,2],[]]");
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(Value::none().to_text(), "nil");
        assert_eq!(Value::some(Value::Uint(7)).to_text(), "7");
        let seq = Value::Sequence(vec![Value::some(Value::from("x")), Value::none()]);
        assert_eq!(seq.to_text(), r#"["x",nil]"#);
        assert_eq!(Value::some(Value::from("nil")).to_text(), "nil");
    }

    #[test]
    fn test_composite_text_is_json() {
        let v = Value::Composite(vec![
            ("x".to_string(), Value::Float(1.5)),
            ("y".to_string(), Value::Float(-2.0)),
        ]);
        assert_eq!(v.to_text(), r#"{"x":1.5,"y":-2.0}"#);
        assert_eq!(v.field("y"), Some(&Value::Float(-2.0)));
    }

    #[test]
    fn test_opaque_equality_ignores_payload() {
        let a = OpaqueValue::new("Color", "red", 1u8);
        let b = OpaqueValue::new("Color", "red", 2u8);
        assert_eq!(a, b);
        assert_eq!(a.downcast_ref::<u8>(), Some(&1));
        assert!(!OpaqueValue::unset("Color").is_set());
    }

    #[test]
    fn test_kind_mismatch_not_equal() {
        assert_ne!(Value::Int(1), Value::Uint(1));
    }
}
