//! Error types for stadix-core
//!
//! Provides error handling for:
//! - Running requests from a screen
//! - Chart synthesis
//! - Report export

use std::path::PathBuf;

use stadix_client::ClientError;
use stadix_io::InputError;
use stadix_stats::SynthError;
use thiserror::Error;

use crate::panel::Screen;

/// Main error type for stadix-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Request failed locally or at the service
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Invalid input collected from a screen
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    /// Chart points could not be synthesized
    #[error("Chart synthesis failed: {0}")]
    Synth(#[from] SynthError),

    /// Report export failed
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    /// Request sent to a screen that does not own it
    #[error("{operation} requests belong to the {expected} screen, not {screen}")]
    WrongScreen {
        operation: String,
        expected: Screen,
        screen: Screen,
    },
}

impl CoreError {
    /// Message shown to the student
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Errors related to report export
#[derive(Error, Debug)]
pub enum ExportError {
    /// Nothing to export yet
    #[error("No result to export on the {screen} screen")]
    NoResult { screen: Screen },

    /// Chart must be captured before export
    #[error("Chart has not been captured for the {screen} screen")]
    NotCaptured { screen: Screen },

    /// Cannot write to output path
    #[error("Cannot write to {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// Result could not be serialized
    #[error("Serialization failed: {0}")]
    Serialize(String),

    /// Typst could not compile the report
    #[error("PDF compilation failed: {0}")]
    Pdf(String),
}

/// Result type for stadix-core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for export operations
pub type ExportOutcome<T> = Result<T, ExportError>;
