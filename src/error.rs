//! Error types for depot.

use thiserror::Error;

/// Common error type for process-level concerns (startup, config, logging).
///
/// Request-level failures use the narrower errors in [`crate::auth`] and
/// [`crate::storage`], which the web layer maps onto status codes.
#[derive(Error, Debug)]
pub enum DepotError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Logging setup error.
    #[error("logging error: {0}")]
    Logging(String),
}

/// Result type alias for depot operations.
pub type Result<T> = std::result::Result<T, DepotError>;
