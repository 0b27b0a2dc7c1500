//! Adapter synthesis errors.

use super::error_code::{self, CallkitErrorCode};

/// Errors that can occur while reading a manifest or rendering adapters.
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("Unsupported type {type_text}: {reason}")]
    UnsupportedType { type_text: String, reason: String },

    #[error("Invalid type text {text:?}: {reason}")]
    InvalidTypeText { text: String, reason: String },

    #[error("Unknown type {name}")]
    UnknownType { name: String },

    #[error("Duplicate declaration: {name}")]
    DuplicateDeclaration { name: String },

    #[error("Manifest error in {path}: {message}")]
    Manifest { path: String, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid function description for {function}: {message}")]
    Description { function: String, message: String },

    #[error("Adapters in {path} are out of date: {summary}")]
    Drift { path: String, summary: String },
}

impl CallkitErrorCode for SynthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Drift { .. } => error_code::ADAPTER_DRIFT,
            _ => error_code::SYNTH_ERROR,
        }
    }
}
