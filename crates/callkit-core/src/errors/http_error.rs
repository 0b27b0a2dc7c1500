//! HTTP adapter errors raised outside the call itself.

use super::error_code::{self, CallkitErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Request body of {actual} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize, actual: usize },

    #[error("Invalid query string: {message}")]
    InvalidQuery { message: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    #[error("Unknown result format: {name}")]
    UnknownFormat { name: String },

    #[error("Cannot encode results as {format}: {message}")]
    Encode { format: String, message: String },
}

impl HttpError {
    /// Status code the adapter answers with.
    pub fn status(&self) -> u16 {
        match self {
            Self::BodyTooLarge { .. } => 413,
            Self::InvalidQuery { .. } | Self::InvalidBody { .. } => 400,
            Self::UnknownFormat { .. } | Self::Encode { .. } => 500,
        }
    }
}

impl CallkitErrorCode for HttpError {
    fn error_code(&self) -> &'static str {
        error_code::HTTP_ERROR
    }
}
