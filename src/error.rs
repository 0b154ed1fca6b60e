//! Error types for commitlog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LogError
pub type Result<T> = std::result::Result<T, LogError>;

/// Unified error type for commitlog operations
#[derive(Debug, Error)]
pub enum LogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // End of Data
    // -------------------------------------------------------------------------
    /// No more data: either a read past the logical end of a store/index,
    /// or a write that would exceed the configured capacity. Callers tell
    /// the two apart by call site.
    #[error("end of data")]
    Eof,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LogError {
    /// True if this is the end-of-data sentinel
    pub fn is_eof(&self) -> bool {
        matches!(self, LogError::Eof)
    }
}
