//! Shared constants for callkit.

/// callkit version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Argument name used when a function's only argument is the context.
pub const DEFAULT_CONTEXT_ARG_NAME: &str = "ctx";

/// Literals that coerce to the empty optional. Case-sensitive, exact match.
pub const NIL_LITERALS: [&str; 2] = ["nil", "null"];

/// Characters a command name may never contain, besides whitespace.
pub const FORBIDDEN_COMMAND_CHARS: [char; 7] = ['|', '&', ';', '(', ')', '<', '>'];

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "callkit.toml";

/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "CALLKIT_LOG";

/// Default tracing filter when `CALLKIT_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "callkit=info";

/// Default crate path synthesized adapters refer to.
pub const DEFAULT_RUNTIME_CRATE: &str = "::callkit_engine";

/// Default maximum accepted HTTP body size (default: 1MB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;

/// Default HTTP result format.
pub const DEFAULT_RESULT_FORMAT: &str = "json";

/// First line of every synthesized adapter file.
pub const GENERATED_HEADER: &str = "// Code generated by callkit-synth. DO NOT EDIT.";

/// Marker opening a synthesized adapter block. Followed by the function name.
pub const ADAPTER_BEGIN_MARKER: &str = "// callkit:adapter ";

/// Marker closing a synthesized adapter block. Followed by the function name.
pub const ADAPTER_END_MARKER: &str = "// callkit:end ";

/// Typical argument count; argument buffers up to this size stay on the stack.
pub const INLINE_ARGS: usize = 8;
