//! Type-directed coercion: text and JSON into typed values.

pub mod coerce;
pub mod json;
pub mod registry;
pub mod text;
pub mod typed;

pub use coerce::{coerce, default_scan};
pub use json::{bind_arguments, decode, decode_text};
pub use registry::{standard_registry, Scanner, ScannerRegistry};
