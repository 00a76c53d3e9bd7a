//! Error types for symbol analysis operations

use thiserror::Error;

/// Symbol analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Invalid or empty symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Backend answered with a non-success status
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
    },

    /// Network or HTTP transport error (no usable response)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response parsed but did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// A spawned fetch task panicked or was aborted
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl StockError {
    /// Build an API error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status attached to the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StockError {
    fn from(err: std::io::Error) -> Self {
        StockError::Storage(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StockError {
    fn from(err: tokio::task::JoinError) -> Self {
        StockError::TaskFailed(err.to_string())
    }
}

/// Result type alias for symbol analysis operations
pub type Result<T> = std::result::Result<T, StockError>;
