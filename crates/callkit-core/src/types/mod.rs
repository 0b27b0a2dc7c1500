//! Value shapes and values for callkit.
//! `TypeDescriptor` drives coercion, `Value` carries the result,
//! `Context` is the cancellation signal passed through to functions.

pub mod collections;
pub mod context;
pub mod descriptor;
pub mod temporal;
pub mod value;

pub use collections::{ArgBuffer, FxHashMap, FxHashSet};
pub use context::{Cancellable, Context};
pub use descriptor::{
    Capability, CompositeType, Field, Kind, OpaqueType, ParseHook, PrimitiveKind, TypeDescriptor,
    ZeroHook,
};
pub use value::{OpaqueValue, Value};
