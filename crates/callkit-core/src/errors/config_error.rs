//! Configuration errors.

use super::error_code::{self, CallkitErrorCode};

/// Failures loading `callkit.toml` layers or validating the merged result.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("{field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("{field} has an invalid value: {message}")]
    InvalidValue { field: String, message: String },

    #[error("cannot serialize config: {message}")]
    Serialize { message: String },
}

impl CallkitErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
