//! Structured field names shared by callkit spans and events.
//!
//! Keeping the names in one place keeps log queries stable across crates.

/// Name of the wrapped function.
pub const FUNCTION: &str = "function";

/// Name of the argument being bound.
pub const ARGUMENT: &str = "argument";

/// Call convention: "typed", "strings", "named_strings" or "json".
pub const CONVENTION: &str = "convention";

/// Registry tier that resolved a scanner: "exact", "capability", "kind" or "default".
pub const SCANNER_TIER: &str = "scanner_tier";

/// Display form of a target type descriptor.
pub const TARGET_TYPE: &str = "target_type";

/// Number of adapters rendered or checked.
pub const ADAPTER_COUNT: &str = "adapter_count";

/// Dispatched command name.
pub const COMMAND: &str = "command";
