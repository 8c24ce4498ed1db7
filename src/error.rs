//! Error types for EmDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using EmError
pub type Result<T> = std::result::Result<T, EmError>;

/// Unified error type for EmDB operations
///
/// Adapters pass I/O and parse failures upward unchanged; nothing in the
/// crate retries. Loss of the text/binary distinction in the file-per-key
/// adapters is not an error, see [`crate::adapter::TypeFidelity`].
#[derive(Debug, Error)]
pub enum EmError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Persisted Data Errors
    // -------------------------------------------------------------------------
    /// Persisted data could not be decompressed, parsed or decoded
    #[error("Format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Invalid state transition: {0}")]
    State(String),
}
