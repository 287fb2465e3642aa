//! Vertical-level descriptors.
//!
//! A small closed set of level type codes can serve as a vertical dimension.
//! Each descriptor carries the label used in variable and axis names, the
//! natural sort direction of its values, and the physical units.

use std::collections::BTreeMap;

use crate::error::{CommonError, Result};

/// Descriptor for one vertical level type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertLevel {
    /// Label used in variable names and axis names (e.g. "isobaric").
    pub label: &'static str,
    /// True when values sort descending (greatest value nearest the ground).
    pub reverse: bool,
    /// Physical units of the level values.
    pub units: &'static str,
}

impl VertLevel {
    const fn new(label: &'static str, reverse: bool, units: &'static str) -> Self {
        Self {
            label,
            reverse,
            units,
        }
    }

    /// CF "positive" attribute for this level type.
    pub fn positive(&self) -> &'static str {
        if self.reverse {
            "down"
        } else {
            "up"
        }
    }
}

/// The closed table of level types that can form a vertical dimension,
/// keyed by GRIB2 fixed-surface type code.
pub fn standard_vert_levels() -> BTreeMap<u16, VertLevel> {
    BTreeMap::from([
        (100, VertLevel::new("isobaric", true, "Pa")),
        (102, VertLevel::new("height_asl", false, "m")),
        (103, VertLevel::new("height_agl", false, "m")),
        (104, VertLevel::new("sigma", true, "")),
        (105, VertLevel::new("hybrid", false, "")),
    ])
}

/// Subset of the standard table matching the requested labels.
///
/// An empty request yields an empty map, which means no variable gets a
/// vertical dimension. A label missing from the closed table is an error.
pub fn select_vert_levels(labels: &[String]) -> Result<BTreeMap<u16, VertLevel>> {
    let table = standard_vert_levels();
    for label in labels {
        if !table.values().any(|v| v.label == label) {
            return Err(CommonError::UnknownLevelType(label.clone()));
        }
    }
    Ok(table
        .into_iter()
        .filter(|(_, v)| labels.iter().any(|l| l == v.label))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table() {
        let levels = standard_vert_levels();
        assert_eq!(levels.len(), 5);

        let isobaric = &levels[&100];
        assert_eq!(isobaric.label, "isobaric");
        assert!(isobaric.reverse);
        assert_eq!(isobaric.units, "Pa");
        assert_eq!(isobaric.positive(), "down");

        let agl = &levels[&103];
        assert!(!agl.reverse);
        assert_eq!(agl.positive(), "up");
    }

    #[test]
    fn test_selection() {
        let selected =
            select_vert_levels(&["isobaric".to_string(), "hybrid".to_string()]).unwrap();
        assert_eq!(selected.len(), 2);
        assert!(selected.contains_key(&100));
        assert!(selected.contains_key(&105));

        assert!(select_vert_levels(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let err = select_vert_levels(&["no_such_level".to_string()]).unwrap_err();
        assert!(err.to_string().contains("no_such_level"));
    }
}
