//! Errors returned from a wrapper call.

use std::error::Error;
use std::fmt;

use super::error_code::{self, CallkitErrorCode};
use super::{BoxError, InvocationError, ScanError};

/// The wrapped function's own error result, passed through untouched.
pub struct FunctionError(BoxError);

impl FunctionError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }

    pub fn into_inner(self) -> BoxError {
        self.0
    }

    pub fn get_ref(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.0.as_ref()
    }

    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    pub fn is<E: Error + 'static>(&self) -> bool {
        self.0.is::<E>()
    }
}

impl fmt::Debug for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FunctionError").field(&self.0).finish()
    }
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for FunctionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl CallkitErrorCode for FunctionError {
    fn error_code(&self) -> &'static str {
        error_code::FUNCTION_ERROR
    }
}

/// Result of any of the four call conventions.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// Argument binding failed; the function never ran.
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// The function ran and returned its error result.
    #[error(transparent)]
    Function(#[from] FunctionError),
}

impl CallError {
    pub fn is_function_error(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    pub fn function_error(&self) -> Option<&FunctionError> {
        match self {
            Self::Function(e) => Some(e),
            Self::Invocation(_) => None,
        }
    }

    pub fn invocation_error(&self) -> Option<&InvocationError> {
        match self {
            Self::Invocation(e) => Some(e),
            Self::Function(_) => None,
        }
    }

    /// The coercion failure behind this error, if any.
    pub fn scan_error(&self) -> Option<&ScanError> {
        self.invocation_error().and_then(InvocationError::scan_error)
    }
}

impl CallkitErrorCode for CallError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invocation(e) => e.error_code(),
            Self::Function(e) => e.error_code(),
        }
    }
}
