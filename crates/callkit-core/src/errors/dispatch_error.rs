//! Command dispatcher errors.

use super::error_code::{self, CallkitErrorCode};
use super::CallError;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("command not found: {name}")]
    CommandNotFound { name: String },

    #[error("namespace not found: {name}")]
    NamespaceNotFound { name: String },

    #[error("command {name} is already registered")]
    DuplicateRegistration { name: String },

    #[error("invalid command name {name:?}: {reason}")]
    InvalidCommandName { name: String, reason: String },

    #[error(transparent)]
    Call(#[from] CallError),
}

impl CallkitErrorCode for DispatchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandNotFound { .. } => error_code::COMMAND_NOT_FOUND,
            Self::NamespaceNotFound { .. } => error_code::NAMESPACE_NOT_FOUND,
            Self::DuplicateRegistration { .. } => error_code::DUPLICATE_REGISTRATION,
            Self::InvalidCommandName { .. } => error_code::INVALID_COMMAND_NAME,
            Self::Call(e) => e.error_code(),
        }
    }
}
