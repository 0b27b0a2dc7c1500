//! Errors raised by the invocation layer before the wrapped function runs.

use super::error_code::{self, CallkitErrorCode};
use super::{BoxError, ScanError, ValueError};

/// Argument binding and wrapper construction errors.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("{function}: cannot parse argument {argument} from {text:?}: {cause}")]
    ParseArgumentText {
        function: String,
        argument: String,
        text: String,
        #[source]
        cause: ScanError,
    },

    #[error("{function}: cannot decode JSON argument {argument}: {cause}")]
    ParseArgumentJson {
        function: String,
        argument: String,
        #[source]
        cause: ScanError,
    },

    #[error("{function}: cannot decode JSON arguments: {cause}")]
    ParseArgumentsJson {
        function: String,
        #[source]
        cause: BoxError,
    },

    #[error("{function}: argument {index} has the wrong type: {cause}")]
    ArgumentType {
        function: String,
        index: usize,
        #[source]
        cause: ValueError,
    },

    #[error("{function}: {actual} argument names given for {expected} arguments")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("{function}: argument name {argument} is registered twice")]
    DuplicateRegistration { function: String, argument: String },
}

impl InvocationError {
    /// The coercion failure behind a text or JSON argument error.
    pub fn scan_error(&self) -> Option<&ScanError> {
        match self {
            Self::ParseArgumentText { cause, .. } | Self::ParseArgumentJson { cause, .. } => {
                Some(cause)
            }
            _ => None,
        }
    }

    /// The offending argument name, when one is known.
    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::ParseArgumentText { argument, .. }
            | Self::ParseArgumentJson { argument, .. }
            | Self::DuplicateRegistration { argument, .. } => Some(argument),
            _ => None,
        }
    }

    pub fn function(&self) -> &str {
        match self {
            Self::ParseArgumentText { function, .. }
            | Self::ParseArgumentJson { function, .. }
            | Self::ParseArgumentsJson { function, .. }
            | Self::ArgumentType { function, .. }
            | Self::ArityMismatch { function, .. }
            | Self::DuplicateRegistration { function, .. } => function,
        }
    }
}

impl CallkitErrorCode for InvocationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ParseArgumentText { .. } => error_code::PARSE_ARGUMENT_TEXT,
            Self::ParseArgumentJson { .. } => error_code::PARSE_ARGUMENT_JSON,
            Self::ParseArgumentsJson { .. } => error_code::PARSE_ARGUMENTS_JSON,
            Self::ArgumentType { .. } => error_code::ARGUMENT_TYPE,
            Self::ArityMismatch { .. } => error_code::ARITY_MISMATCH,
            Self::DuplicateRegistration { .. } => error_code::DUPLICATE_REGISTRATION,
        }
    }
}
