//! HTTP adapter configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_BODY_BYTES, DEFAULT_RESULT_FORMAT};

/// Result formats the HTTP adapter can write.
pub const RESULT_FORMATS: [&str; 4] = ["json", "xml", "text", "binary"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HttpConfig {
    /// Result format when a handler does not pick one. Default: "json".
    pub result_format: Option<String>,
    /// Maximum accepted request body. Default: 1MB.
    pub max_body_bytes: Option<usize>,
}

impl HttpConfig {
    pub fn effective_result_format(&self) -> &str {
        self.result_format.as_deref().unwrap_or(DEFAULT_RESULT_FORMAT)
    }

    pub fn effective_max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }
}
