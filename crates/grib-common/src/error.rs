//! Error types for the common crate.

use thiserror::Error;

/// Errors raised by the shared header and level machinery.
#[derive(Debug, Error)]
pub enum CommonError {
    /// A vertical-level selection named a label missing from the closed table.
    #[error("Unknown vertical level type: {0}")]
    UnknownLevelType(String),
}

/// Result type alias using CommonError.
pub type Result<T> = std::result::Result<T, CommonError>;
