//! CallkitErrorCode trait for surface-level error reporting.

/// Trait giving every callkit error a stable code string.
/// Surfaces (CLI, HTTP) print `[ERROR_CODE] message` and the parity tests
/// compare codes rather than messages.
pub trait CallkitErrorCode {
    /// Returns the error code string (e.g., "TYPE_NOT_SUPPORTED").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Coercion
pub const TYPE_NOT_SUPPORTED: &str = "TYPE_NOT_SUPPORTED";
pub const LENGTH_MISMATCH: &str = "LENGTH_MISMATCH";
pub const SCAN_ERROR: &str = "SCAN_ERROR";

// Invocation
pub const PARSE_ARGUMENT_TEXT: &str = "PARSE_ARGUMENT_TEXT";
pub const PARSE_ARGUMENT_JSON: &str = "PARSE_ARGUMENT_JSON";
pub const PARSE_ARGUMENTS_JSON: &str = "PARSE_ARGUMENTS_JSON";
pub const ARGUMENT_TYPE: &str = "ARGUMENT_TYPE";
pub const ARITY_MISMATCH: &str = "ARITY_MISMATCH";
pub const DUPLICATE_REGISTRATION: &str = "DUPLICATE_REGISTRATION";
pub const FUNCTION_ERROR: &str = "FUNCTION_ERROR";

// Dispatch
pub const COMMAND_NOT_FOUND: &str = "COMMAND_NOT_FOUND";
pub const NAMESPACE_NOT_FOUND: &str = "NAMESPACE_NOT_FOUND";
pub const INVALID_COMMAND_NAME: &str = "INVALID_COMMAND_NAME";

// Tooling and surfaces
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SYNTH_ERROR: &str = "SYNTH_ERROR";
pub const ADAPTER_DRIFT: &str = "ADAPTER_DRIFT";
pub const HTTP_ERROR: &str = "HTTP_ERROR";
