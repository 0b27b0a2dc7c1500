//! # callkit-engine
//!
//! The coercion engine and the invocation contract.
//!
//! A [`Wrapper`] exposes a function through four conventions: typed values,
//! positional text, named text and a JSON object. [`reflect::wrap`] builds one
//! from any Rust function whose argument and return types implement [`Arg`]
//! and [`Returns`]. `callkit-synth` renders adapters that implement the same
//! contract without a registry lookup at call time, using
//! [`scan::typed`] and [`adapter`].

pub mod adapter;
pub mod binding;
pub mod description;
mod macros;
pub mod naming;
pub mod reflect;
pub mod scan;
pub mod typed;
pub mod wrapper;

pub use callkit_core;
pub use chrono;

pub use callkit_core::errors::{
    BoxError, CallError, FunctionError, InvocationError, ScanError, ValueError,
};
pub use callkit_core::{
    Cancellable, Capability, CompositeType, Context, Field, Kind, OpaqueType, OpaqueValue,
    PrimitiveKind, TypeDescriptor, Value,
};
pub use description::{ArgSpec, FunctionDescription};
pub use naming::exported_field_name;
pub use reflect::{wrap, wrap_described, ReflectWrapper};
pub use scan::{coerce, ScannerRegistry};
pub use typed::{Arg, Callable, Returns};
pub use wrapper::{CallResult, Wrapper};
