//! Concrete-type scanning helpers.
//!
//! These are the building blocks of the default scanner and the code that
//! synthesized adapters inline per argument. Both paths call the same
//! functions, so a synthesized adapter accepts exactly what the reflective
//! wrapper accepts.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, TimeDelta};

use callkit_core::errors::ScanError;
use callkit_core::TypeDescriptor;

use super::json;
use super::text::{self, is_nil_literal, NumberText};
use crate::typed::Arg;

pub fn scan_text(s: &str) -> Result<String, ScanError> {
    Ok(s.to_string())
}

pub fn scan_bool(s: &str) -> Result<bool, ScanError> {
    text::parse_bool(s).map_err(|e| ScanError::invalid(s, "bool", e))
}

pub fn scan_number<T: NumberText>(s: &str) -> Result<T, ScanError> {
    T::parse_text(s).map_err(|e| ScanError::invalid(s, T::KIND, e))
}

pub fn scan_instant<T: From<DateTime<FixedOffset>>>(s: &str) -> Result<T, ScanError> {
    text::parse_instant(s)
        .map(T::from)
        .map_err(|e| ScanError::invalid(s, "DateTime", e))
}

pub fn scan_duration(s: &str) -> Result<TimeDelta, ScanError> {
    text::parse_duration(s).map_err(|e| ScanError::invalid(s, "Duration", e))
}

/// `nil` or `null` is the empty optional; anything else goes to `inner`.
pub fn scan_optional<T>(
    s: &str,
    inner: impl FnOnce(&str) -> Result<T, ScanError>,
) -> Result<Option<T>, ScanError> {
    if is_nil_literal(s) {
        Ok(None)
    } else {
        inner(s).map(Some)
    }
}

/// Split a sequence literal and check a fixed length before any element is scanned.
pub(crate) fn split_elements(
    s: &str,
    target: impl Display,
    len: Option<usize>,
) -> Result<Vec<String>, ScanError> {
    let parts = text::split_sequence(s).map_err(|e| ScanError::invalid(s, &target, e))?;
    if let Some(expected) = len {
        if parts.len() != expected {
            return Err(ScanError::LengthMismatch {
                target: target.to_string(),
                expected,
                actual: parts.len(),
            });
        }
    }
    Ok(parts)
}

pub fn scan_vec<T>(
    s: &str,
    target: &str,
    element: impl Fn(&str) -> Result<T, ScanError>,
) -> Result<Vec<T>, ScanError> {
    split_elements(s, target, None)?
        .iter()
        .map(|part| element(part).map_err(|cause| ScanError::nested(s, target, cause)))
        .collect()
}

pub fn scan_array<T, const N: usize>(
    s: &str,
    target: &str,
    element: impl Fn(&str) -> Result<T, ScanError>,
) -> Result<[T; N], ScanError> {
    let items = split_elements(s, target, Some(N))?
        .iter()
        .map(|part| element(part).map_err(|cause| ScanError::nested(s, target, cause)))
        .collect::<Result<Vec<T>, _>>()?;
    let actual = items.len();
    items.try_into().map_err(|_| ScanError::LengthMismatch {
        target: target.to_string(),
        expected: N,
        actual,
    })
}

/// Composite types are read as a JSON object.
pub fn scan_composite<T: Arg>(s: &str) -> Result<T, ScanError> {
    let target = T::descriptor();
    let value = json::decode_text(s, &target)?;
    T::from_value(value).map_err(|e| ScanError::invalid(s, &target, e))
}

/// Opaque types parse themselves; without a parse hook they are not supported.
pub fn scan_opaque<T: Arg>(s: &str) -> Result<T, ScanError> {
    let target = T::descriptor();
    let parse = match &target {
        TypeDescriptor::Opaque(opaque) => opaque.parser(),
        _ => None,
    };
    let parse = parse.ok_or_else(|| ScanError::type_not_supported(&target))?;
    let value = parse(s).map_err(|cause| ScanError::invalid(s, &target, cause))?;
    T::from_value(value).map_err(|e| ScanError::invalid(s, &target, e))
}

/// For argument types no text scanner accepts (e.g. a context in a
/// non-leading position).
pub fn unsupported<T>(target: &str) -> Result<T, ScanError> {
    Err(ScanError::type_not_supported(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_scan_array_checks_length_first() {
        let err = scan_array::<i32, 3>("[1,x]", "[i32; 3]", scan_number::<i32>).unwrap_err();
        assert!(matches!(err, ScanError::LengthMismatch { expected: 3, actual: 2, .. }));
        let ok: [i32; 2] = scan_array("[1, 2]", "[i32; 2]", scan_number::<i32>).unwrap();
        assert_eq!(ok, [1, 2]);
    }

    #[test]
    fn test_scan_vec_of_optionals() {
        let v = scan_vec("[1,nil,3]", "Vec<Option<u8>>", |s| {
            scan_optional(s, scan_number::<u8>)
        })
        .unwrap();
        assert_eq!(v, vec![Some(1), None, Some(3)]);
    }

    #[test]
    fn test_scan_instant_into_utc() {
        let t: DateTime<Utc> = scan_instant("2024-01-02T03:04:05+01:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2024-01-02T02:04:05+00:00");
    }

    #[test]
    fn test_unsupported() {
        assert!(unsupported::<()>("Context").unwrap_err().is_type_not_supported());
    }
}
