//! Typed value mismatch.

/// A `Value` did not have the shape a typed argument expected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, found {found}")]
pub struct ValueError {
    pub expected: String,
    pub found: String,
}

impl ValueError {
    pub fn new(expected: impl ToString, found: impl Into<String>) -> Self {
        Self {
            expected: expected.to_string(),
            found: found.into(),
        }
    }
}
