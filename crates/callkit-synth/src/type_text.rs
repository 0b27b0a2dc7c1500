//! Parsing of manifest type texts into the type model the synthesizer renders.
//!
//! Generic arguments are split by angle- and square-bracket depth, so
//! `Option<Vec<[u8; 4]>>` nests as written.

use std::fmt;

use callkit_core::errors::SynthError;
use callkit_core::PrimitiveKind;

use crate::manifest::Manifest;

/// The Rust type of one argument or result, as the synthesizer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(PrimitiveKind),
    /// `DateTime<Utc>`; `Primitive(Instant)` is `DateTime<FixedOffset>`.
    UtcInstant,
    Optional(Box<TypeExpr>),
    Vec(Box<TypeExpr>),
    Array(Box<TypeExpr>, usize),
    Composite { name: String, path: String },
    Opaque { name: String, path: String },
    Context,
}

impl TypeExpr {
    /// Rust spelling for generated code. `rt` is the runtime crate path.
    pub fn rust_type(&self, rt: &str) -> String {
        match self {
            Self::Primitive(PrimitiveKind::Instant) => {
                format!("{rt}::chrono::DateTime<{rt}::chrono::FixedOffset>")
            }
            Self::Primitive(PrimitiveKind::Duration) => format!("{rt}::chrono::TimeDelta"),
            Self::Primitive(kind) => kind.name().to_string(),
            Self::UtcInstant => format!("{rt}::chrono::DateTime<{rt}::chrono::Utc>"),
            Self::Optional(inner) => format!("::std::option::Option<{}>", inner.rust_type(rt)),
            Self::Vec(inner) => format!("::std::vec::Vec<{}>", inner.rust_type(rt)),
            Self::Array(inner, n) => format!("[{}; {n}]", inner.rust_type(rt)),
            Self::Composite { path, .. } | Self::Opaque { path, .. } => path.clone(),
            Self::Context => format!("{rt}::Context"),
        }
    }

    /// Expression of a `Fn(&str) -> Result<T, ScanError>` that scans this type
    /// exactly as the default scanner would.
    pub fn scan_expr(&self, rt: &str) -> String {
        let typed = format!("{rt}::scan::typed");
        match self {
            Self::Primitive(PrimitiveKind::Text) => format!("{typed}::scan_text"),
            Self::Primitive(PrimitiveKind::Bool) => format!("{typed}::scan_bool"),
            Self::Primitive(PrimitiveKind::Duration) => format!("{typed}::scan_duration"),
            Self::Primitive(PrimitiveKind::Instant) | Self::UtcInstant => {
                format!("{typed}::scan_instant::<{}>", self.rust_type(rt))
            }
            Self::Primitive(kind) => format!("{typed}::scan_number::<{}>", kind.name()),
            Self::Optional(inner) => format!(
                "|s: &str| {typed}::scan_optional(s, {})",
                inner.scan_expr(rt)
            ),
            Self::Vec(inner) => format!(
                "|s: &str| {typed}::scan_vec(s, {:?}, {})",
                self.to_string(),
                inner.scan_expr(rt)
            ),
            Self::Array(inner, n) => format!(
                "|s: &str| {typed}::scan_array::<_, {n}>(s, {:?}, {})",
                self.to_string(),
                inner.scan_expr(rt)
            ),
            Self::Composite { path, .. } => format!("{typed}::scan_composite::<{path}>"),
            Self::Opaque { path, .. } => format!("{typed}::scan_opaque::<{path}>"),
            Self::Context => format!(
                "|_: &str| {typed}::unsupported::<{}>({:?})",
                self.rust_type(rt),
                self.to_string()
            ),
        }
    }

    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context)
    }
}

/// Descriptor text: the same spelling `TypeDescriptor` displays.
impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{kind}"),
            Self::UtcInstant => write!(f, "{}", PrimitiveKind::Instant),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
            Self::Vec(inner) => write!(f, "Vec<{inner}>"),
            Self::Array(inner, n) => write!(f, "[{inner}; {n}]"),
            Self::Composite { name, .. } | Self::Opaque { name, .. } => f.write_str(name),
            Self::Context => f.write_str("Context"),
        }
    }
}

/// One result slot: a value type or the error result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultExpr {
    Value(TypeExpr),
    Error,
}

fn invalid(text: &str, reason: impl Into<String>) -> SynthError {
    SynthError::InvalidTypeText {
        text: text.to_string(),
        reason: reason.into(),
    }
}

/// Parse an argument type text against the manifest's declared types.
pub fn parse_type_text(text: &str, manifest: &Manifest) -> Result<TypeExpr, SynthError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(invalid(text, "empty type"));
    }

    if let Some(body) = text.strip_prefix('[') {
        let body = body
            .strip_suffix(']')
            .ok_or_else(|| invalid(text, "unclosed array type"))?;
        let split = top_level_positions(body, ';')
            .last()
            .copied()
            .ok_or_else(|| invalid(text, "array type needs `; N`"))?;
        let len = body[split + 1..]
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(text, format!("array length: {e}")))?;
        let element = parse_type_text(&body[..split], manifest)?;
        return Ok(TypeExpr::Array(Box::new(element), len));
    }

    if let Some(open) = text.find('<') {
        let name = text[..open].trim();
        let inner = text[open + 1..]
            .strip_suffix('>')
            .ok_or_else(|| invalid(text, "unbalanced angle brackets"))?;
        let args = split_generic_args(inner).map_err(|reason| invalid(text, reason))?;
        let [arg] = args.as_slice() else {
            return Err(invalid(text, format!("{name} takes one type argument")));
        };
        return match name {
            "Option" => Ok(TypeExpr::Optional(Box::new(parse_type_text(arg, manifest)?))),
            "Vec" => Ok(TypeExpr::Vec(Box::new(parse_type_text(arg, manifest)?))),
            "DateTime" => match arg.trim() {
                "FixedOffset" => Ok(TypeExpr::Primitive(PrimitiveKind::Instant)),
                "Utc" => Ok(TypeExpr::UtcInstant),
                other => Err(SynthError::UnsupportedType {
                    type_text: text.to_string(),
                    reason: format!("time zone {other} is not supported"),
                }),
            },
            other => Err(SynthError::UnsupportedType {
                type_text: text.to_string(),
                reason: format!("generic type {other} is not supported"),
            }),
        };
    }

    if text.contains('>') {
        return Err(invalid(text, "unbalanced angle brackets"));
    }

    if let Some(kind) = primitive(text) {
        return Ok(TypeExpr::Primitive(kind));
    }
    if text == "Context" {
        return Ok(TypeExpr::Context);
    }
    if let Some(decl) = manifest.composite(text) {
        return Ok(TypeExpr::Composite {
            name: decl.name.clone(),
            path: decl.path.clone().unwrap_or_else(|| decl.name.clone()),
        });
    }
    if let Some(decl) = manifest.opaque(text) {
        return Ok(TypeExpr::Opaque {
            name: decl.name.clone(),
            path: decl.path.clone().unwrap_or_else(|| decl.name.clone()),
        });
    }
    Err(SynthError::UnknownType {
        name: text.to_string(),
    })
}

/// Parse a result type text. `Error` is the error result; a context is
/// not a valid result.
pub fn parse_result_text(text: &str, manifest: &Manifest) -> Result<ResultExpr, SynthError> {
    if text.trim() == "Error" {
        return Ok(ResultExpr::Error);
    }
    match parse_type_text(text, manifest)? {
        TypeExpr::Context => Err(SynthError::UnsupportedType {
            type_text: text.to_string(),
            reason: "a context cannot be a result".to_string(),
        }),
        ty => Ok(ResultExpr::Value(ty)),
    }
}

fn primitive(text: &str) -> Option<PrimitiveKind> {
    let kind = match text {
        "String" => PrimitiveKind::Text,
        "bool" => PrimitiveKind::Bool,
        "i8" => PrimitiveKind::I8,
        "i16" => PrimitiveKind::I16,
        "i32" => PrimitiveKind::I32,
        "i64" => PrimitiveKind::I64,
        "u8" => PrimitiveKind::U8,
        "u16" => PrimitiveKind::U16,
        "u32" => PrimitiveKind::U32,
        "u64" => PrimitiveKind::U64,
        "f32" => PrimitiveKind::F32,
        "f64" => PrimitiveKind::F64,
        "TimeDelta" | "Duration" => PrimitiveKind::Duration,
        _ => return None,
    };
    Some(kind)
}

/// Byte positions of `needle` outside any `<>` or `[]` nesting.
fn top_level_positions(text: &str, needle: char) -> Vec<usize> {
    let mut depth: i32 = 0;
    let mut positions = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => depth -= 1,
            c if c == needle && depth == 0 => positions.push(i),
            _ => {}
        }
    }
    positions
}

/// Split generic arguments on top-level commas.
pub fn split_generic_args(inner: &str) -> Result<Vec<&str>, String> {
    let mut depth: i32 = 0;
    for c in inner.chars() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err("unbalanced brackets".to_string());
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced brackets".to_string());
    }

    let mut args = Vec::new();
    let mut start = 0;
    for i in top_level_positions(inner, ',') {
        args.push(inner[start..i].trim());
        start = i + 1;
    }
    args.push(inner[start..].trim());
    if args.iter().any(|a| a.is_empty()) {
        return Err("empty type argument".to_string());
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{CompositeDecl, OpaqueDecl};

    fn manifest() -> Manifest {
        Manifest {
            composites: vec![CompositeDecl {
                name: "Point".to_string(),
                path: Some("crate::geo::Point".to_string()),
            }],
            opaques: vec![OpaqueDecl {
                name: "Level".to_string(),
                path: None,
            }],
            ..Manifest::default()
        }
    }

    #[test]
    fn test_nested_generics() {
        let ty = parse_type_text("Option<Vec<[u8; 4]>>", &manifest()).unwrap();
        assert_eq!(
            ty,
            TypeExpr::Optional(Box::new(TypeExpr::Vec(Box::new(TypeExpr::Array(
                Box::new(TypeExpr::Primitive(PrimitiveKind::U8)),
                4
            )))))
        );
        assert_eq!(ty.to_string(), "Option<Vec<[u8; 4]>>");
    }

    #[test]
    fn test_array_of_generic() {
        let ty = parse_type_text("[ Vec<i32> ; 2 ]", &manifest()).unwrap();
        assert_eq!(ty.to_string(), "[Vec<i32>; 2]");
    }

    #[test]
    fn test_declared_types() {
        let m = manifest();
        let point = parse_type_text("Point", &m).unwrap();
        assert_eq!(point.rust_type("::rt"), "crate::geo::Point");
        assert_eq!(point.to_string(), "Point");
        assert_eq!(parse_type_text("Level", &m).unwrap().rust_type("::rt"), "Level");
    }

    #[test]
    fn test_time_types() {
        let m = manifest();
        assert_eq!(
            parse_type_text("DateTime<Utc>", &m).unwrap(),
            TypeExpr::UtcInstant
        );
        assert_eq!(
            parse_type_text("TimeDelta", &m).unwrap().rust_type("::rt"),
            "::rt::chrono::TimeDelta"
        );
        assert!(matches!(
            parse_type_text("DateTime<Local>", &m),
            Err(SynthError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_errors() {
        let m = manifest();
        assert!(matches!(parse_type_text("Widget", &m), Err(SynthError::UnknownType { .. })));
        assert!(matches!(parse_type_text("Vec<i32", &m), Err(SynthError::InvalidTypeText { .. })));
        assert!(matches!(parse_type_text("[i32]", &m), Err(SynthError::InvalidTypeText { .. })));
        assert!(matches!(
            parse_type_text("HashMap<String, i32>", &m),
            Err(SynthError::InvalidTypeText { .. })
        ));
        assert!(matches!(
            parse_type_text("Box<i32>", &m),
            Err(SynthError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_results() {
        let m = manifest();
        assert_eq!(parse_result_text("Error", &m).unwrap(), ResultExpr::Error);
        assert!(parse_result_text("Context", &m).is_err());
    }

    #[test]
    fn test_split_generic_args() {
        assert_eq!(
            split_generic_args("A<B, C>, [D; 2]").unwrap(),
            ["A<B, C>", "[D; 2]"]
        );
        assert!(split_generic_args("A<").is_err());
        assert!(split_generic_args("A,").is_err());
    }

    #[test]
    fn test_scan_expr_mirrors_nesting() {
        let ty = parse_type_text("Vec<Option<i32>>", &manifest()).unwrap();
        assert_eq!(
            ty.scan_expr("::rt"),
            "|s: &str| ::rt::scan::typed::scan_vec(s, \"Vec<Option<i32>>\", \
             |s: &str| ::rt::scan::typed::scan_optional(s, ::rt::scan::typed::scan_number::<i32>))"
        );
    }
}
