//! Typed attribute records for variables and datasets.
//!
//! Attributes are fixed structs with optional named fields rather than open
//! string maps, so a misspelled key is a compile error while the external
//! attribute surface stays the same.

use serde::Serialize;

/// Descriptive attributes of one variable or coordinate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VarAttrs {
    /// Variable short name without level/period qualifiers (e.g. "TMP").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Descriptive name (e.g. "Temperature").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    /// Physical units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// CF standard name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_name: Option<String>,
    /// CF axis letter ("X", "Y", "Z", "T").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<String>,
    /// CF "positive" direction for vertical coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive: Option<String>,
    /// Name of the grid-mapping variable this variable refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_mapping: Option<String>,
    /// CF grid-mapping name, carried by the mapping variable itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_mapping_name: Option<String>,
}

/// Top-level dataset attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetAttrs {
    /// CF name of the shared grid projection.
    pub projection: String,
    /// Originating centre.
    pub centre: String,
    /// Originating subcentre.
    pub subcentre: String,
    /// Provenance note.
    pub history: String,
    /// Space-separated list of every coordinate variable, including the
    /// reference time and the grid-mapping marker.
    pub coordinates: String,
}
