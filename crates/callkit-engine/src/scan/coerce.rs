//! The coercion algorithm and the default scanner.

use chrono::{DateTime, FixedOffset};
use tracing::trace;

use callkit_core::errors::ScanError;
use callkit_core::tracing::fields;
use callkit_core::{PrimitiveKind, TypeDescriptor, Value};

use super::registry::ScannerRegistry;
use super::text::{is_nil_literal, NumberText};
use super::{json, typed};

/// Coerce `text` into `target`.
///
/// Tiers are tried in order: exact type, capabilities (registration order),
/// kind, then the registry default. A scanner that answers with a top-level
/// `TypeNotSupported` declines, and the next tier is tried.
pub fn coerce(
    text: &str,
    target: &TypeDescriptor,
    registry: &ScannerRegistry,
) -> Result<Value, ScanError> {
    if let Some(scanner) = registry.exact(target) {
        match scanner(text, target, registry) {
            Err(e) if e.is_type_not_supported() => {
                trace!({ fields::SCANNER_TIER } = "exact", "scanner declined");
            }
            result => return result,
        }
    }

    for (capability, scanner) in registry.capabilities_for(target) {
        match scanner(text, target, registry) {
            Err(e) if e.is_type_not_supported() => {
                trace!(
                    { fields::SCANNER_TIER } = "capability",
                    capability = capability.name(),
                    "scanner declined"
                );
            }
            result => return result,
        }
    }

    if let Some(scanner) = registry.kind(target.kind()) {
        match scanner(text, target, registry) {
            Err(e) if e.is_type_not_supported() => {
                trace!({ fields::SCANNER_TIER } = "kind", "scanner declined");
            }
            result => return result,
        }
    }

    match registry.default_scanner() {
        Some(scanner) => scanner(text, target, registry),
        None => Err(ScanError::type_not_supported(target)),
    }
}

/// The reference scanner. Synthesized adapters reproduce it per concrete
/// type through the helpers in [`typed`].
pub fn default_scan(
    text: &str,
    target: &TypeDescriptor,
    registry: &ScannerRegistry,
) -> Result<Value, ScanError> {
    match target {
        TypeDescriptor::Primitive(kind) => scan_primitive(text, *kind),
        TypeDescriptor::Optional(inner) => {
            if is_nil_literal(text) {
                Ok(Value::none())
            } else {
                coerce(text, inner, registry).map(Value::some)
            }
        }
        TypeDescriptor::Sequence { element, len } => {
            let parts = typed::split_elements(text, target, *len)?;
            parts
                .iter()
                .map(|part| {
                    coerce(part, element, registry)
                        .map_err(|cause| ScanError::nested(text, target, cause))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence)
        }
        TypeDescriptor::Composite(_) => json::decode_text(text, target),
        TypeDescriptor::Opaque(_) | TypeDescriptor::Context | TypeDescriptor::Error => {
            Err(ScanError::type_not_supported(target))
        }
    }
}

fn scan_primitive(text: &str, kind: PrimitiveKind) -> Result<Value, ScanError> {
    fn number<T: NumberText>(text: &str) -> Result<Value, ScanError> {
        typed::scan_number::<T>(text).map(NumberText::into_value)
    }

    match kind {
        PrimitiveKind::Text => typed::scan_text(text).map(Value::Text),
        PrimitiveKind::Bool => typed::scan_bool(text).map(Value::Bool),
        PrimitiveKind::I8 => number::<i8>(text),
        PrimitiveKind::I16 => number::<i16>(text),
        PrimitiveKind::I32 => number::<i32>(text),
        PrimitiveKind::I64 => number::<i64>(text),
        PrimitiveKind::U8 => number::<u8>(text),
        PrimitiveKind::U16 => number::<u16>(text),
        PrimitiveKind::U32 => number::<u32>(text),
        PrimitiveKind::U64 => number::<u64>(text),
        PrimitiveKind::F32 => number::<f32>(text),
        PrimitiveKind::F64 => number::<f64>(text),
        PrimitiveKind::Instant => {
            typed::scan_instant::<DateTime<FixedOffset>>(text).map(Value::Instant)
        }
        PrimitiveKind::Duration => typed::scan_duration(text).map(Value::Duration),
    }
}
