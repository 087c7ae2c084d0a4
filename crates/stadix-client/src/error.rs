//! Error types for the statistics client

use stadix_io::InputError;
use thiserror::Error;

use crate::operation::Operation;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the statistics service
#[derive(Error, Debug)]
pub enum ClientError {
    /// Input rejected locally; no request was sent
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    /// Service answered with a non-2xx status
    #[error("Service error ({status}): {detail}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Server-supplied detail, or the status reason
        detail: String,
    },

    /// Service answered 2xx with a body that does not match the contract
    #[error("Malformed {operation} response: field '{field}' {reason}")]
    MalformedResponse {
        operation: Operation,
        field: String,
        reason: String,
    },

    /// Could not reach the service
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Other HTTP-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Create a service error from status code and detail
    pub fn service(status: u16, detail: impl Into<String>) -> Self {
        ClientError::Service {
            status,
            detail: detail.into(),
        }
    }

    pub fn malformed(operation: Operation, field: impl Into<String>, reason: impl Into<String>) -> Self {
        ClientError::MalformedResponse {
            operation,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was detected before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(self, ClientError::Input(_) | ClientError::Config(_) | ClientError::InvalidUrl(_))
    }

    /// Message shown to the student for this failure
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Input(e) => e.to_string(),
            ClientError::Service { detail, .. } => detail.clone(),
            ClientError::Connection(_) | ClientError::Timeout | ClientError::Http(_) => {
                "Could not connect to the statistics service.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else {
            ClientError::Http(err)
        }
    }
}
