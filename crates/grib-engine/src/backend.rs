//! The external decode engine's call surface.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// One message re-encode request.
///
/// The engine copies an existing message's sections from `template_file` at
/// `template_offset`, optionally replaces the field data, applies the
/// metadata edits, and appends or writes the result to `file`.
#[derive(Debug, Clone, Default)]
pub struct WriteRequest {
    /// Destination file.
    pub file: PathBuf,
    /// File holding the message to copy sections from.
    pub template_file: PathBuf,
    /// Byte offset of the template message.
    pub template_offset: u64,
    /// Replacement field values; None keeps the template's data.
    pub data: Option<Vec<f32>>,
    /// Append to `file` instead of truncating it.
    pub append: bool,
    /// Replacement variable name, if any.
    pub set_varname: Option<String>,
    /// Replacement level text, if any.
    pub set_level: Option<String>,
    /// Replacement forecast-time text, if any.
    pub set_ftime: Option<String>,
}

/// The external, stateful, non-reentrant decode engine.
///
/// Implementations keep their own open-file table: a call against a file
/// leaves it open until [`DecodeBackend::free_file`] is invoked. The
/// [`Engine`](crate::Engine) coordinator guarantees that call happens after
/// every operation, on the failure path included, so implementations never
/// need to defend against leaked entries.
///
/// All methods take `&mut self`: the engine is not reentrant and the
/// coordinator serializes access behind one lock.
pub trait DecodeBackend: Send {
    /// Scan a file and return its inventory text, one line per message.
    ///
    /// Line format: `<offset>:<varname>:<level>:<time> meta=<json>` where
    /// the JSON document carries the remaining header fields.
    fn scan_inventory(&mut self, file: &Path) -> Result<String>;

    /// Decode the messages at `offsets` and return one concatenated buffer
    /// of float32 fields, in request order.
    fn decode_batch(&mut self, file: &Path, offsets: &[u64]) -> Result<Vec<f32>>;

    /// Return the undecoded bytes of one message.
    fn read_raw(&mut self, file: &Path, offset: u64) -> Result<Vec<u8>>;

    /// Re-encode one message per `request`.
    fn write_message(&mut self, request: &WriteRequest) -> Result<()>;

    /// Drop the engine's open-file table entry for `file`.
    fn free_file(&mut self, file: &Path);
}
