//! Virtual datasets over scattered GRIB2 messages.
//!
//! Collections of self-describing binary weather messages (many files, many
//! forecast times, many vertical levels) are presented as one dense, named,
//! multi-dimensional structure without materializing anything up front:
//!
//! - a [`Template`] canonicalizes a representative scan into shared axes and
//!   per-variable shapes, once;
//! - [`build_file_index`] maps logical coordinates to (file, byte offset)
//!   locations for an arbitrary message stream, per open call;
//! - a [`LazyArray`] answers fancy-index reads by batching decode calls into
//!   the shared engine and filling unresolved cells with NaN;
//! - [`open_dataset`] assembles coordinates, lazy variables and attributes
//!   into a [`Dataset`].
//!
//! Payload decoding, projection math and header extraction stay with the
//! external engine behind the [`grib_engine`] coordinator.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use grib_dataset::{make_template, open_dataset_from_files, RegularLatLon, TemplateConfig};
//! use grib_engine::Engine;
//!
//! let engine = Arc::new(Engine::new(backend));
//! let config = TemplateConfig::new().with_vert_levels(&["isobaric"]);
//! let template = make_template(&engine, &files, config, &RegularLatLon)?
//!     .expect("no matching messages");
//! let dataset = open_dataset_from_files(&engine, &files, &template)?;
//! ```

pub mod array;
pub mod attrs;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod index;
pub mod inventory;
pub mod message;
pub mod template;
pub mod testdata;

pub use array::{IndexExpr, LazyArray};
pub use attrs::{DatasetAttrs, VarAttrs};
pub use dataset::{open_dataset, Dataset, Variable, VariableData};
pub use error::{DatasetError, Result};
pub use geometry::{GeometryProvider, Grid, GridCoord, RegularLatLon};
pub use index::{build_file_index, FileIndex, FileIndexes, HeaderCoord};
pub use inventory::{
    format_inventory_line, make_template, open_dataset_from_files, parse_inventory, scan_inventory,
};
pub use message::{decode_message, read_message_raw, write_message};
pub use template::{
    variable_name, CommonInfo, CoordValues, Coordinate, Template, TemplateConfig, VarSpec,
};
