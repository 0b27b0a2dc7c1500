//! Structural JSON decoding and JSON argument binding.
//!
//! JSON values already carry structure, so this path never goes through the
//! text scanners: strings, numbers, arrays and objects map directly onto the
//! target descriptor.

use serde_json::{Map, Value as Json};
use tracing::debug;

use callkit_core::errors::{InvocationError, ScanError};
use callkit_core::tracing::fields;
use callkit_core::types::temporal::{parse_duration, parse_instant};
use callkit_core::{PrimitiveKind, TypeDescriptor, Value};

use crate::description::FunctionDescription;
use crate::naming::exported_field_name;

/// Parse `text` as JSON and decode it into `target`.
pub fn decode_text(text: &str, target: &TypeDescriptor) -> Result<Value, ScanError> {
    let json: Json =
        serde_json::from_str(text).map_err(|e| ScanError::invalid(text, target, e))?;
    decode(&json, target)
}

/// Decode a JSON value into `target`. `null` yields the target's zero value.
pub fn decode(json: &Json, target: &TypeDescriptor) -> Result<Value, ScanError> {
    if json.is_null() {
        return Ok(target.zero_value());
    }
    let mismatch = |expected: &str| {
        ScanError::invalid(json.to_string(), target, format!("expected {expected}"))
    };

    match target {
        TypeDescriptor::Primitive(kind) => decode_primitive(json, target, *kind),
        TypeDescriptor::Optional(inner) => decode(json, inner).map(Value::some),
        TypeDescriptor::Sequence { element, len } => {
            let items = json.as_array().ok_or_else(|| mismatch("an array"))?;
            if let Some(expected) = len {
                if items.len() != *expected {
                    return Err(ScanError::LengthMismatch {
                        target: target.to_string(),
                        expected: *expected,
                        actual: items.len(),
                    });
                }
            }
            items
                .iter()
                .map(|item| {
                    decode(item, element)
                        .map_err(|cause| ScanError::nested(json.to_string(), target, cause))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence)
        }
        TypeDescriptor::Composite(composite) => {
            let object = json.as_object().ok_or_else(|| mismatch("an object"))?;
            composite
                .fields
                .iter()
                .map(|field| {
                    let value = match lookup_field(object, &field.name, false) {
                        Some(raw) => decode(raw, &field.ty)
                            .map_err(|cause| ScanError::nested(json.to_string(), target, cause))?,
                        None => field.ty.zero_value(),
                    };
                    Ok((field.name.clone(), value))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Composite)
        }
        TypeDescriptor::Opaque(opaque) => {
            let parse = opaque
                .parser()
                .ok_or_else(|| ScanError::type_not_supported(target))?;
            let text = json.as_str().ok_or_else(|| mismatch("a string"))?;
            parse(text).map_err(|cause| ScanError::invalid(text, target, cause))
        }
        TypeDescriptor::Context | TypeDescriptor::Error => {
            Err(ScanError::type_not_supported(target))
        }
    }
}

fn decode_primitive(
    json: &Json,
    target: &TypeDescriptor,
    kind: PrimitiveKind,
) -> Result<Value, ScanError> {
    let source = || json.to_string();
    let invalid = |message: String| ScanError::invalid(source(), target, message);

    match kind {
        PrimitiveKind::Text => json
            .as_str()
            .map(|s| Value::Text(s.to_string()))
            .ok_or_else(|| invalid("expected a string".to_string())),
        PrimitiveKind::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| invalid("expected a boolean".to_string())),
        PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64 => {
            let n = json
                .as_i64()
                .ok_or_else(|| invalid(format!("expected an integer fitting {kind}")))?;
            let (min, max) = match kind {
                PrimitiveKind::I8 => (i64::from(i8::MIN), i64::from(i8::MAX)),
                PrimitiveKind::I16 => (i64::from(i16::MIN), i64::from(i16::MAX)),
                PrimitiveKind::I32 => (i64::from(i32::MIN), i64::from(i32::MAX)),
                _ => (i64::MIN, i64::MAX),
            };
            if n < min || n > max {
                return Err(invalid(format!("{n} overflows {kind}")));
            }
            Ok(Value::Int(n))
        }
        PrimitiveKind::U8 | PrimitiveKind::U16 | PrimitiveKind::U32 | PrimitiveKind::U64 => {
            let n = json
                .as_u64()
                .ok_or_else(|| invalid(format!("expected an integer fitting {kind}")))?;
            let max = match kind {
                PrimitiveKind::U8 => u64::from(u8::MAX),
                PrimitiveKind::U16 => u64::from(u16::MAX),
                PrimitiveKind::U32 => u64::from(u32::MAX),
                _ => u64::MAX,
            };
            if n > max {
                return Err(invalid(format!("{n} overflows {kind}")));
            }
            Ok(Value::Uint(n))
        }
        PrimitiveKind::F32 => {
            let f = json
                .as_f64()
                .ok_or_else(|| invalid("expected a number".to_string()))?;
            let narrowed = f as f32;
            if narrowed.is_infinite() {
                return Err(invalid(format!("{f} overflows f32")));
            }
            Ok(Value::Float(f64::from(narrowed)))
        }
        PrimitiveKind::F64 => json
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| invalid("expected a number".to_string())),
        PrimitiveKind::Instant => {
            let s = json
                .as_str()
                .ok_or_else(|| invalid("expected an instant string".to_string()))?;
            parse_instant(s)
                .map(Value::Instant)
                .map_err(|e| ScanError::invalid(s, target, e))
        }
        PrimitiveKind::Duration => match json {
            Json::String(s) => parse_duration(s)
                .map(Value::Duration)
                .map_err(|e| ScanError::invalid(s.as_str(), target, e)),
            Json::Number(n) => n
                .as_i64()
                .map(|nanos| Value::Duration(chrono::TimeDelta::nanoseconds(nanos)))
                .ok_or_else(|| invalid("expected integer nanoseconds".to_string())),
            _ => Err(invalid("expected a duration string or nanoseconds".to_string())),
        },
    }
}

/// Find the field for an argument or composite field name.
///
/// Lookup order: the name itself, its exported field name (when
/// `exported` is set), then a case-insensitive match.
pub fn lookup_field<'a>(object: &'a Map<String, Json>, name: &str, exported: bool) -> Option<&'a Json> {
    if let Some(v) = object.get(name) {
        return Some(v);
    }
    if exported {
        if let Some(v) = object.get(&exported_field_name(name)) {
            return Some(v);
        }
    }
    object
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

/// Parse a JSON arguments payload. An empty payload is an empty object.
pub fn parse_arguments_object(
    function: &str,
    payload: &[u8],
) -> Result<Map<String, Json>, InvocationError> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    let json: Json =
        serde_json::from_slice(payload).map_err(|e| InvocationError::ParseArgumentsJson {
            function: function.to_string(),
            cause: e.into(),
        })?;
    match json {
        Json::Object(object) => Ok(object),
        other => Err(InvocationError::ParseArgumentsJson {
            function: function.to_string(),
            cause: format!("expected a JSON object, found {other}").into(),
        }),
    }
}

/// Decode one argument from a parsed arguments object. Absent fields are zero.
pub fn decode_argument(
    function: &str,
    object: &Map<String, Json>,
    name: &str,
    ty: &TypeDescriptor,
) -> Result<Value, InvocationError> {
    match lookup_field(object, name, true) {
        Some(raw) => decode(raw, ty).map_err(|cause| InvocationError::ParseArgumentJson {
            function: function.to_string(),
            argument: name.to_string(),
            cause,
        }),
        None => {
            debug!({ fields::ARGUMENT } = name, "argument absent, using zero value");
            Ok(ty.zero_value())
        }
    }
}

/// Bind a JSON arguments payload against a description.
///
/// Returns one value per non-context argument, in declaration order.
pub fn bind_arguments(
    payload: &[u8],
    description: &FunctionDescription,
) -> Result<Vec<Value>, InvocationError> {
    let object = parse_arguments_object(description.name(), payload)?;
    description
        .bindable_args()
        .map(|(_, arg)| decode_argument(description.name(), &object, &arg.name, &arg.ty))
        .collect()
}
