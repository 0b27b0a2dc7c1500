//! # callkit-synth
//!
//! Renders `Wrapper` adapters for the functions listed in a manifest.
//!
//! Each adapter inlines the scanning helper for every argument's concrete
//! type, so calls never consult a scanner registry. The rendered file is
//! plain Rust meant to be `include!`d or checked in; [`validate`] reports
//! adapters that are missing, stale or orphaned without writing anything.

pub mod manifest;
pub mod synthesizer;
pub mod type_text;
pub mod validate;

pub use manifest::{ArgDecl, CompositeDecl, FunctionSpec, Manifest, OpaqueDecl};
pub use synthesizer::AdapterSynthesizer;
pub use type_text::{parse_result_text, parse_type_text, TypeExpr};
pub use validate::{check_file, validate, write_file, ValidationReport};
