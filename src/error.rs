//! Crate-level error types
//!
//! Only faults that abort an entire run live here. Component-local failures
//! (tag parsing, captioning, a single delivery attempt) have their own error
//! enums next to the component and are contained by the pipeline.

use thiserror::Error;

/// Result type for run-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that terminate a run
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
