//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

use crate::constants::INLINE_ARGS;
use crate::types::value::Value;

/// Per-call argument buffer. Most functions take fewer than 8 arguments.
pub type ArgBuffer = SmallVec<[Value; INLINE_ARGS]>;
