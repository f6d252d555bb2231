//! Error types for the EfficientIP DNS adapter
//!
//! Listing failures surface to the orchestrator as [`Error::Backend`].
//! Failures of a single add/delete are produced with the same variant by the
//! backend, but the provider logs and swallows them.

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the adapter
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend call failed: transport error, HTTP error status, or an
    /// envelope reporting `success: false`
    #[error("Backend error ({operation}): {message}")]
    Backend {
        /// Backend operation that failed (e.g. "dns_zone_list")
        operation: String,
        /// Error message
        message: String,
    },

    /// The caller's cancellation token fired before the call completed
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a backend error for the given operation
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// True for errors the orchestrator should treat as retryable on its
    /// next reconciliation cycle
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::Config(format!("invalid regular expression: {}", err))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
