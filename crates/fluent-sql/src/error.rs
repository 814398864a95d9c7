//! Error types for statement building and execution.

use crate::connection::DriverError;

/// Errors raised while building or executing a statement.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The builder was misused in a way that is detectable before execution
    /// (empty table name, mismatched INSERT rows, empty IN list).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A destructive statement was about to run without a filter.
    #[error("Safety error: {0}")]
    Safety(String),

    /// The connection rejected the statement.
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn safety(message: impl Into<String>) -> Self {
        Self::Safety(message.into())
    }
}

/// Result type for builder operations.
pub type Result<T> = std::result::Result<T, Error>;
