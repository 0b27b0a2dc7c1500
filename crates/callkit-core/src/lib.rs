//! # callkit-core
//!
//! Foundation crate for callkit.
//! Defines the type descriptor and value models, the cancellation context,
//! errors, config, tracing setup, and constants. Every other crate in the
//! workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::CallkitConfig;
pub use errors::{CallError, CallkitErrorCode, FunctionError, InvocationError, ScanError};
pub use types::context::{Cancellable, Context};
pub use types::descriptor::{
    Capability, CompositeType, Field, Kind, OpaqueType, PrimitiveKind, TypeDescriptor,
};
pub use types::value::{OpaqueValue, Value};
