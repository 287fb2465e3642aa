//! Error types for dataset construction and lazy reads.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while building templates, indexes and datasets.
///
/// Only structural invariant violations surface here. Recoverable
/// conditions (unknown variables, unresolved coordinates, per-file decode
/// failures) are logged and leave gaps instead of failing the operation.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A header's grid definition disagrees with the first one seen.
    #[error("Grids differ: {expected} != {found}")]
    ProjectionMismatch { expected: String, found: String },

    /// A header's reference time disagrees with the first one seen.
    #[error("Reference times differ: {expected} != {found}")]
    ReferenceTimeMismatch {
        expected: DateTime<Utc>,
        found: DateTime<Utc>,
    },

    /// The grid is thinned: the point count is not rows times columns.
    #[error("Thinned grids are not supported: {npts} points for {nx} x {ny}")]
    ThinnedGrid { npts: usize, nx: usize, ny: usize },

    /// No geometry provider handles this grid definition template.
    #[error("Unsupported grid definition template: {0}")]
    UnsupportedGrid(i32),

    /// A grid definition template the provider cannot make sense of.
    #[error("Invalid grid definition: {0}")]
    InvalidGridDefinition(String),

    /// A structurally invalid read request (wrong arity, bad slice,
    /// out-of-range position).
    #[error("Invalid index request: {0}")]
    InvalidRequest(String),

    /// A malformed inventory line.
    #[error("Invalid inventory record: {0}")]
    InvalidInventory(String),

    #[error(transparent)]
    Level(#[from] grib_common::CommonError),

    #[error(transparent)]
    Engine(#[from] grib_engine::EngineError),
}

/// Result type alias using DatasetError.
pub type Result<T> = std::result::Result<T, DatasetError>;
