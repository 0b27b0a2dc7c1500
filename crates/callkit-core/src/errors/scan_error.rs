//! Coercion errors.

use super::error_code::{self, CallkitErrorCode};
use super::BoxError;

/// Errors produced while coercing text or JSON into a target type.
///
/// `target` is the display form of the attempted type descriptor.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("type {target} is not supported")]
    TypeNotSupported { target: String },

    #[error("{target} requires {expected} elements, got {actual}")]
    LengthMismatch {
        target: String,
        expected: usize,
        actual: usize,
    },

    #[error("cannot scan {source_text:?} into {target}: {cause}")]
    Invalid {
        source_text: String,
        target: String,
        #[source]
        cause: BoxError,
    },

    /// An element or field failed; `cause` is the inner failure.
    #[error("cannot scan {source_text:?} into {target}: {cause}")]
    Nested {
        source_text: String,
        target: String,
        #[source]
        cause: Box<ScanError>,
    },
}

impl ScanError {
    pub fn type_not_supported(target: impl ToString) -> Self {
        Self::TypeNotSupported {
            target: target.to_string(),
        }
    }

    pub fn invalid(
        source_text: impl Into<String>,
        target: impl ToString,
        cause: impl Into<BoxError>,
    ) -> Self {
        Self::Invalid {
            source_text: source_text.into(),
            target: target.to_string(),
            cause: cause.into(),
        }
    }

    pub fn nested(source_text: impl Into<String>, target: impl ToString, cause: ScanError) -> Self {
        Self::Nested {
            source_text: source_text.into(),
            target: target.to_string(),
            cause: Box::new(cause),
        }
    }

    /// The innermost failure, following `Nested` wrappers.
    pub fn root(&self) -> &ScanError {
        let mut current = self;
        while let Self::Nested { cause, .. } = current {
            current = cause;
        }
        current
    }

    /// True only for a top-level `TypeNotSupported`. A scanner returning this
    /// declines the target and lets the registry fall through to the next tier.
    pub fn is_type_not_supported(&self) -> bool {
        matches!(self, Self::TypeNotSupported { .. })
    }
}

impl CallkitErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TypeNotSupported { .. } => error_code::TYPE_NOT_SUPPORTED,
            Self::LengthMismatch { .. } => error_code::LENGTH_MISMATCH,
            Self::Invalid { .. } => error_code::SCAN_ERROR,
            Self::Nested { cause, .. } => cause.error_code(),
        }
    }
}
