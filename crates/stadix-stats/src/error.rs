//! Errors for chart point synthesis

use thiserror::Error;

/// Error type for synthesis operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Not enough points: {0}")]
    InsufficientData(String),
}

impl SynthError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        SynthError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for synthesis operations
pub type SynthResult<T> = Result<T, SynthError>;
