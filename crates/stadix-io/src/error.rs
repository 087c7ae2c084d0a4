//! Input validation errors

use thiserror::Error;

/// Errors detected locally, before any request is dispatched
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("No data entered for {0}")]
    Empty(String),

    #[error("{label} needs at least {min} values, got {found}")]
    TooFewValues {
        label: String,
        min: usize,
        found: usize,
    },

    #[error("Lists have different sizes: X has {x_len} values, Y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("Matrix is not rectangular: row {row} has {found} columns, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Matrix needs at least {min} rows, got {found}")]
    TooFewRows { min: usize, found: usize },

    #[error("Invalid number '{token}'")]
    InvalidNumber { token: String },

    #[error("Value out of range for {name}: {reason}")]
    OutOfRange { name: String, reason: String },

    #[error("Unsupported file type '{extension}' (expected csv, xls or xlsx)")]
    UnsupportedFile { extension: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {0}")]
    ReadFailed(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

/// Result type for input handling
pub type InputResult<T> = Result<T, InputError>;
