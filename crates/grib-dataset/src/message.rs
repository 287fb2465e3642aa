//! Single-message operations through the shared engine.

use ndarray::Array2;

use grib_common::{MessageHeader, UNDEFINED};
use grib_engine::{Engine, WriteRequest};

use crate::error::{DatasetError, Result};

/// Return the undecoded bytes of the message a header points at.
pub fn read_message_raw(engine: &Engine, header: &MessageHeader) -> Result<Vec<u8>> {
    Ok(engine.read_raw(&header.file, header.offset)?)
}

/// Decode one message into a (rows, columns) field with NaN for missing
/// points.
pub fn decode_message(engine: &Engine, header: &MessageHeader) -> Result<Array2<f32>> {
    if header.npts != header.nx * header.ny {
        return Err(DatasetError::ThinnedGrid {
            npts: header.npts,
            nx: header.nx,
            ny: header.ny,
        });
    }
    let values = engine.decode_batch(&header.file, &[header.offset], header.npts)?;
    let mut field = Array2::from_shape_vec((header.ny, header.nx), values)
        .map_err(|e| DatasetError::InvalidRequest(e.to_string()))?;
    field.mapv_inplace(|v| if v == UNDEFINED { f32::NAN } else { v });
    Ok(field)
}

/// Re-encode one message from a template message, optionally with
/// replacement data and metadata edits.
pub fn write_message(engine: &Engine, request: &WriteRequest) -> Result<()> {
    Ok(engine.write_message(request)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{test_field, test_header, TestBackend};

    #[test]
    fn test_decode_message_reshapes_and_maps_missing() {
        let header = test_header("TMP", 1, 0.0, 3, "a.grib2", 0);
        let mut field = test_field(header.npts, 1.0);
        field[2] = UNDEFINED;
        let mut backend = TestBackend::new();
        backend.insert_field("a.grib2", 0, field);
        let engine = Engine::new(Box::new(backend));

        let out = decode_message(&engine, &header).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out[[0, 0]], 1000.0);
        assert!(out[[0, 2]].is_nan());
        assert_eq!(out[[1, 0]], 1003.0);
    }

    #[test]
    fn test_read_raw_returns_message_bytes() {
        let header = test_header("TMP", 1, 0.0, 3, "a.grib2", 42);
        let mut backend = TestBackend::new();
        backend.insert_field("a.grib2", 42, test_field(header.npts, 1.0));
        let engine = Engine::new(Box::new(backend));

        let bytes = read_message_raw(&engine, &header).unwrap();
        assert!(bytes.starts_with(b"GRIB"));
    }
}
