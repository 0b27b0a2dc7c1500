//! Error handling for callkit.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod call_error;
pub mod config_error;
pub mod dispatch_error;
pub mod error_code;
pub mod http_error;
pub mod invocation_error;
pub mod scan_error;
pub mod synth_error;
pub mod value_error;

pub use call_error::{CallError, FunctionError};
pub use config_error::ConfigError;
pub use dispatch_error::DispatchError;
pub use error_code::CallkitErrorCode;
pub use http_error::HttpError;
pub use invocation_error::InvocationError;
pub use scan_error::ScanError;
pub use synth_error::SynthError;
pub use value_error::ValueError;

/// Boxed error carried as an underlying cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Walk `source()` to the innermost error.
pub fn root_cause<'a>(err: &'a (dyn std::error::Error + 'static)) -> &'a (dyn std::error::Error + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}
