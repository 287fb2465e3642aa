//! Lazy array reads over the sparse file index.
//!
//! A [`LazyArray`] answers arbitrary fancy-index requests by batching one
//! decode call per contributing file, scattering the returned fields into a
//! dense NaN-filled buffer, and applying the spatial part of the request at
//! the end. Files whose stored coordinates do not intersect the request are
//! never presented to the engine; files whose decode fails leave NaN gaps.

use std::sync::Arc;

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use tracing::error;

use grib_common::UNDEFINED;
use grib_engine::{Engine, EngineError};

use crate::error::{DatasetError, Result};
use crate::index::FileIndex;

/// One entry of a read request, per declared dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexExpr {
    /// A single position; the axis is dropped from the result.
    Index(usize),
    /// A half-open range with optional bounds and step.
    Slice {
        start: Option<usize>,
        stop: Option<usize>,
        step: Option<usize>,
    },
    /// An explicit list of positions.
    List(Vec<usize>),
}

impl IndexExpr {
    /// The whole axis.
    pub fn full() -> Self {
        IndexExpr::Slice {
            start: None,
            stop: None,
            step: None,
        }
    }

    /// `start..stop`.
    pub fn range(start: usize, stop: usize) -> Self {
        IndexExpr::Slice {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    fn is_index(&self) -> bool {
        matches!(self, IndexExpr::Index(_))
    }

    /// Expand to an explicit position list against an axis of `len`.
    fn expand(&self, len: usize) -> Result<Vec<usize>> {
        match self {
            IndexExpr::Index(i) => {
                if *i >= len {
                    return Err(DatasetError::InvalidRequest(format!(
                        "position {i} out of range for axis of length {len}"
                    )));
                }
                Ok(vec![*i])
            }
            IndexExpr::Slice { start, stop, step } => {
                let start = start.unwrap_or(0);
                let stop = stop.unwrap_or(len);
                let step = step.unwrap_or(1);
                if step == 0 {
                    return Err(DatasetError::InvalidRequest(
                        "slice step must be positive".to_string(),
                    ));
                }
                if start > stop || stop > len {
                    return Err(DatasetError::InvalidRequest(format!(
                        "slice {start}..{stop} invalid for axis of length {len}"
                    )));
                }
                Ok((start..stop).step_by(step).collect())
            }
            IndexExpr::List(list) => {
                for i in list {
                    if *i >= len {
                        return Err(DatasetError::InvalidRequest(format!(
                            "position {i} out of range for axis of length {len}"
                        )));
                    }
                }
                Ok(list.clone())
            }
        }
    }
}

impl From<usize> for IndexExpr {
    fn from(i: usize) -> Self {
        IndexExpr::Index(i)
    }
}

impl From<Vec<usize>> for IndexExpr {
    fn from(list: Vec<usize>) -> Self {
        IndexExpr::List(list)
    }
}

/// Lazily decoded variable data bound to one sparse file index.
///
/// Stateless between reads apart from the index it was built with; safe to
/// read concurrently, since every engine call serializes through the shared
/// coordinator.
pub struct LazyArray {
    varname: String,
    index: FileIndex,
    shape: Vec<usize>,
    geo_ndim: usize,
    npts: usize,
    missing_value: f32,
    engine: Arc<Engine>,
}

impl LazyArray {
    pub fn new(
        varname: impl Into<String>,
        index: FileIndex,
        shape: Vec<usize>,
        geo_ndim: usize,
        engine: Arc<Engine>,
    ) -> Self {
        let npts = shape[shape.len() - geo_ndim..].iter().product();
        Self {
            varname: varname.into(),
            index,
            shape,
            geo_ndim,
            npts,
            missing_value: UNDEFINED,
            engine,
        }
    }

    /// Declared dense shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Read a fancy-index request, one entry per declared dimension.
    ///
    /// Structural problems (wrong arity, bad slice, out-of-range position)
    /// fail before any engine call. Cells no message maps to, and cells of
    /// files whose decode failed, come back NaN; axes requested as bare
    /// integers are dropped.
    pub fn read(&self, request: &[IndexExpr]) -> Result<ArrayD<f32>> {
        if request.len() != self.shape.len() {
            return Err(DatasetError::InvalidRequest(format!(
                "request for {} has {} entries, variable has {} dimensions",
                self.varname,
                request.len(),
                self.shape.len()
            )));
        }
        let header_len = self.shape.len() - self.geo_ndim;
        let header_lists = request[..header_len]
            .iter()
            .zip(&self.shape[..header_len])
            .map(|(expr, len)| expr.expand(*len))
            .collect::<Result<Vec<_>>>()?;
        let geo_lists = request[header_len..]
            .iter()
            .zip(&self.shape[header_len..])
            .map(|(expr, len)| expr.expand(*len))
            .collect::<Result<Vec<_>>>()?;

        let spatial = &self.shape[header_len..];
        let mut out_shape: Vec<usize> = header_lists.iter().map(Vec::len).collect();
        out_shape.extend_from_slice(spatial);
        let mut out = ArrayD::from_elem(IxDyn(&out_shape), f32::NAN);

        for (file, entries) in &self.index {
            let mut positions: Vec<Vec<usize>> = Vec::new();
            let mut offsets: Vec<u64> = Vec::new();
            for (coord, offset) in entries {
                let mut pos = Vec::with_capacity(coord.len());
                let mut found = true;
                for (k, c) in coord.iter().enumerate() {
                    match header_lists[k].iter().position(|x| x == c) {
                        Some(p) => pos.push(p),
                        None => {
                            found = false;
                            break;
                        }
                    }
                }
                if found {
                    positions.push(pos);
                    offsets.push(*offset);
                }
            }
            // Nothing requested from this file; never contact the engine.
            if offsets.is_empty() {
                continue;
            }

            let values = match self.engine.decode_batch(file, &offsets, self.npts) {
                Ok(values) => values,
                Err(err @ (EngineError::Backend(_) | EngineError::ShortRead { .. })) => {
                    error!(
                        var = %self.varname,
                        file = %file.display(),
                        error = %err,
                        "decode failed, leaving gap"
                    );
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            for (chunk, pos) in values.chunks_exact(self.npts).zip(&positions) {
                let mut view = out.view_mut();
                for &p in pos {
                    view = view.index_axis_move(Axis(0), p);
                }
                let field = ArrayViewD::from_shape(IxDyn(spatial), chunk)
                    .map_err(|e| DatasetError::InvalidRequest(e.to_string()))?;
                view.assign(&field);
            }
        }

        // The spatial part of the request applies to the assembled buffer.
        for (k, list) in geo_lists.iter().enumerate() {
            out = out.select(Axis(header_len + k), list);
        }
        let missing = self.missing_value;
        out.mapv_inplace(|v| if v == missing { f32::NAN } else { v });
        for (k, expr) in request.iter().enumerate().rev() {
            if expr.is_index() {
                out = out.index_axis_move(Axis(k), 0);
            }
        }
        Ok(out)
    }
}
