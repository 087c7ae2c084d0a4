//! Errors surfaced by the command line

use stadix_client::ClientError;
use stadix_core::{CoreError, ExportError};
use stadix_io::InputError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// The service answered with an error for this analysis
    #[error("{0}")]
    Analysis(String),

    /// Arguments that parse but do not make a request
    #[error("{0}")]
    Usage(String),

    #[error("Could not write JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Message printed before exiting
    pub fn user_message(&self) -> String {
        match self {
            CliError::Client(e) => e.user_message(),
            CliError::Core(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
