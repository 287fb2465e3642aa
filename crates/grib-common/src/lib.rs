//! Common types shared across the grib-virtual-dataset crates.
//!
//! This crate carries the message-header model (the decoded identity of one
//! GRIB2 message), the closed table of vertical-level descriptors, forecast
//! period arithmetic, and the selection-predicate machinery used to pick
//! messages out of a scan.

pub mod error;
pub mod header;
pub mod level;
pub mod predicate;
pub mod time;

pub use error::{CommonError, Result};
pub use header::MessageHeader;
pub use level::{select_vert_levels, standard_vert_levels, VertLevel};
pub use predicate::{AllOf, AnyOf, Predicate};
pub use time::{period_label, period_seconds, TIME_MODIFIERS};

/// Missing data value used by the decode engine.
///
/// Grid points the engine could not decode carry this value; the lazy array
/// maps it to NaN on the way out.
pub const UNDEFINED: f32 = 9.999e20;
