//! Primitive text parsing shared by the default scanner and the typed
//! scanning helpers that synthesized adapters inline.

use chrono::{DateTime, FixedOffset, TimeDelta};

use callkit_core::constants::NIL_LITERALS;
use callkit_core::errors::BoxError;
use callkit_core::types::temporal::{self, TemporalError};
use callkit_core::{PrimitiveKind, Value};

/// Errors from the sequence and boolean text grammars.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    #[error("invalid boolean {0:?}")]
    InvalidBool(String),

    #[error("sequence literal must be enclosed in [ and ]")]
    NotBracketed,

    #[error("unbalanced brackets, braces or quotes")]
    Unbalanced,
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(s: &str) -> Result<bool, TextError> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(TextError::InvalidBool(s.to_string())),
    }
}

/// True for the literals that coerce to the empty optional. Exact match.
pub fn is_nil_literal(s: &str) -> bool {
    NIL_LITERALS.contains(&s)
}

pub fn parse_instant(s: &str) -> Result<DateTime<FixedOffset>, TemporalError> {
    temporal::parse_instant(s)
}

pub fn parse_duration(s: &str) -> Result<TimeDelta, TemporalError> {
    temporal::parse_duration(s)
}

/// A primitive number parsed from text at its declared width.
pub trait NumberText: Sized + Copy + Send + 'static {
    const KIND: PrimitiveKind;

    /// Locale-independent parse; out-of-range input is an error.
    fn parse_text(s: &str) -> Result<Self, BoxError>;

    fn into_value(self) -> Value;
}

macro_rules! impl_number_text {
    ($($ty:ty => $kind:ident, $variant:ident($wide:ty);)*) => {
        $(
            impl NumberText for $ty {
                const KIND: PrimitiveKind = PrimitiveKind::$kind;

                fn parse_text(s: &str) -> Result<Self, BoxError> {
                    s.parse::<$ty>().map_err(Into::into)
                }

                fn into_value(self) -> Value {
                    Value::$variant(<$wide>::from(self))
                }
            }
        )*
    };
}

impl_number_text! {
    i8 => I8, Int(i64);
    i16 => I16, Int(i64);
    i32 => I32, Int(i64);
    i64 => I64, Int(i64);
    u8 => U8, Uint(u64);
    u16 => U16, Uint(u64);
    u32 => U32, Uint(u64);
    u64 => U64, Uint(u64);
    f32 => F32, Float(f64);
    f64 => F64, Float(f64);
}

/// Split a bracketed sequence literal into its element texts.
///
/// Commas separate elements only at bracket depth 1, brace depth 0 and
/// outside double-quoted strings (backslash escapes honoured). Elements are
/// trimmed; an element that is exactly one JSON string literal is unquoted.
/// `[]` yields no elements.
pub fn split_sequence(s: &str) -> Result<Vec<String>, TextError> {
    let text = s.trim();
    if text.len() < 2 || !text.starts_with('[') || !text.ends_with(']') {
        return Err(TextError::NotBracketed);
    }

    let last = text.len() - 1;
    let mut bracket_depth: i32 = 0;
    let mut brace_depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 1;
    let mut raw = Vec::new();

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => bracket_depth += 1,
            ']' => {
                bracket_depth -= 1;
                if bracket_depth < 0 || (bracket_depth == 0 && i != last) {
                    return Err(TextError::Unbalanced);
                }
            }
            '{' => brace_depth += 1,
            '}' => {
                brace_depth -= 1;
                if brace_depth < 0 {
                    return Err(TextError::Unbalanced);
                }
            }
            ',' if bracket_depth == 1 && brace_depth == 0 => {
                raw.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if bracket_depth != 0 || brace_depth != 0 || in_string {
        return Err(TextError::Unbalanced);
    }
    raw.push(&text[start..last]);

    if raw.len() == 1 && raw[0].trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(raw.into_iter().map(|el| unquote(el.trim())).collect())
}

fn unquote(element: &str) -> String {
    if element.len() >= 2 && element.starts_with('"') && element.ends_with('"') {
        if let Ok(s) = serde_json::from_str::<String>(element) {
            return s;
        }
    }
    element.to_string()
}
