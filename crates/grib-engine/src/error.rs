//! Error types for the engine coordinator.

use thiserror::Error;

/// Errors raised by engine calls.
///
/// Pool exhaustion is a hard error: it means handles leaked or the caller is
/// holding too many concurrent reads. A [`EngineError::Backend`] failure is
/// local to one call and one file; readers treat it as a gap, not an abort.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No free buffers")]
    NoFreeBuffers,

    #[error("No free registers")]
    NoFreeRegisters,

    /// Engine-specific failure with the engine's diagnostic text.
    #[error("Decode engine error: {0}")]
    Backend(String),

    /// The engine returned fewer bytes than the request required.
    #[error("Short read from engine: expected {expected} values, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;
