//! Dataset assembly: coordinates, lazy variables and attributes.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ndarray::{Array1, ArrayD, IxDyn};
use tracing::warn;

use grib_common::MessageHeader;
use grib_engine::Engine;

use crate::array::LazyArray;
use crate::attrs::{DatasetAttrs, VarAttrs};
use crate::error::Result;
use crate::index::build_file_index;
use crate::template::{CoordValues, Coordinate, Template};

/// Data payload of one dataset variable.
pub enum VariableData {
    /// Decoded on read through the shared engine.
    Lazy(LazyArray),
    /// Materialized float values (levels, grid coordinates, markers).
    Float(ArrayD<f64>),
    /// Forecast periods as whole seconds.
    Seconds(ArrayD<i64>),
    /// A scalar timestamp.
    Time(DateTime<Utc>),
}

/// One dataset variable: dimension names, data, attributes.
pub struct Variable {
    pub dims: Vec<String>,
    pub data: VariableData,
    pub attrs: VarAttrs,
}

/// An assembled dataset.
///
/// The empty instance is a valid terminal state meaning "nothing matched";
/// it is distinct from a construction error.
pub struct Dataset {
    pub dims: BTreeMap<String, usize>,
    pub vars: BTreeMap<String, Variable>,
    pub attrs: DatasetAttrs,
}

impl Dataset {
    /// The designated empty dataset.
    pub fn empty() -> Self {
        Self {
            dims: BTreeMap::new(),
            vars: BTreeMap::new(),
            attrs: DatasetAttrs::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Assemble a dataset from a header stream and a template.
///
/// Builds the sparse index, binds one [`LazyArray`] per indexed variable,
/// and merges in the template's coordinate variables, the scalar reference
/// time and the grid-mapping marker. Zero matching headers yield the empty
/// dataset.
pub fn open_dataset(
    headers: &[MessageHeader],
    template: &Template,
    engine: Arc<Engine>,
) -> Result<Dataset> {
    let indexes = build_file_index(headers, template);
    if indexes.is_empty() {
        warn!("no matching data found");
        return Ok(Dataset::empty());
    }

    let mut dims = BTreeMap::new();
    let mut vars = BTreeMap::new();
    for (name, file_index) in indexes {
        let spec = &template.var_specs()[&name];
        let data = LazyArray::new(
            name.clone(),
            file_index,
            spec.shape.clone(),
            template.grid().geo_ndim(),
            Arc::clone(&engine),
        );
        for (dim, len) in spec.dims.iter().zip(&spec.shape) {
            dims.insert(dim.clone(), *len);
        }
        vars.insert(
            name,
            Variable {
                dims: spec.dims.clone(),
                data: VariableData::Lazy(data),
                attrs: spec.attrs.clone(),
            },
        );
    }

    for (name, coord) in template.coords() {
        vars.insert(name.clone(), coordinate_variable(coord));
    }
    vars.insert(
        "reftime".to_string(),
        Variable {
            dims: Vec::new(),
            data: VariableData::Time(template.common().reftime),
            attrs: VarAttrs {
                standard_name: Some("reference_time".to_string()),
                ..Default::default()
            },
        },
    );
    // Scalar marker carrying the grid's CRS description.
    vars.insert(
        template.grid().cfname().to_string(),
        Variable {
            dims: Vec::new(),
            data: VariableData::Float(ArrayD::from_elem(IxDyn(&[]), 0.0)),
            attrs: template.grid().crs_attrs().clone(),
        },
    );

    let mut attrs = template.dataset_attrs();
    let mut coordinates: Vec<&str> = template.coords().keys().map(String::as_str).collect();
    coordinates.push("reftime");
    coordinates.push(template.grid().cfname());
    attrs.coordinates = coordinates.join(" ");

    Ok(Dataset { dims, vars, attrs })
}

fn coordinate_variable(coord: &Coordinate) -> Variable {
    let data = match &coord.values {
        CoordValues::Float(values) => VariableData::Float(if coord.is_scalar() {
            ArrayD::from_elem(IxDyn(&[]), values[0])
        } else {
            Array1::from(values.clone()).into_dyn()
        }),
        CoordValues::Seconds(values) => VariableData::Seconds(if coord.is_scalar() {
            ArrayD::from_elem(IxDyn(&[]), values[0])
        } else {
            Array1::from(values.clone()).into_dyn()
        }),
    };
    Variable {
        dims: coord.dims.clone(),
        data,
        attrs: coord.attrs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateConfig;
    use crate::testdata::{test_backend_for, test_header, TestGeometry};

    #[test]
    fn test_nothing_matched_yields_the_empty_dataset() {
        let scan = vec![test_header("TMP", 1, 0.0, 3, "a.grib2", 0)];
        let template = Template::scan(&scan, TemplateConfig::new(), &TestGeometry)
            .unwrap()
            .unwrap();
        let engine = Arc::new(Engine::new(Box::new(test_backend_for(&[]))));

        // None of these headers belong to the template's grid.
        let mut foreign = test_header("TMP", 1, 0.0, 3, "a.grib2", 0);
        foreign.gdtmpl[7] = 99;
        let dataset = open_dataset(&[foreign], &template, engine).unwrap();

        assert!(dataset.is_empty());
        assert!(dataset.dims.is_empty());
        assert_eq!(dataset.attrs, DatasetAttrs::default());
    }

    #[test]
    fn test_coordinates_attribute_lists_every_coordinate() {
        let scan = vec![
            test_header("TMP", 1, 0.0, 3, "a.grib2", 0),
            test_header("TMP", 1, 0.0, 6, "a.grib2", 100),
        ];
        let template = Template::scan(&scan, TemplateConfig::new(), &TestGeometry)
            .unwrap()
            .unwrap();
        let engine = Arc::new(Engine::new(Box::new(test_backend_for(&scan))));
        let dataset = open_dataset(&scan, &template, engine).unwrap();

        assert_eq!(
            dataset.attrs.coordinates,
            "time1 x y reftime test_projection"
        );
        assert!(dataset.vars.contains_key("reftime"));
        assert!(dataset.vars.contains_key("test_projection"));
        assert_eq!(dataset.dims["time1"], 2);
        assert_eq!(dataset.dims["y"], 2);
        assert_eq!(dataset.dims["x"], 3);
    }
}
