//! The process-wide engine coordinator.

use std::path::Path;

use parking_lot::Mutex;
use tracing::debug;

use crate::backend::{DecodeBackend, WriteRequest};
use crate::error::{EngineError, Result};
use crate::pool::{PoolKind, SlotPool};
use crate::{N_MEM_BUFFERS, N_REGISTERS};

/// Coordinator owning the shared decode engine.
///
/// One instance per process is shared (behind an `Arc`) by every dataset and
/// lazy array. Each operation claims the pool handles it needs, takes the
/// engine lock for exactly one backend call, and releases the engine's
/// open-file entry before returning, on the error path too. A dataset can
/// span thousands of messages across many files, so a leaked file-table
/// entry would accumulate for the process lifetime.
pub struct Engine {
    backend: Mutex<Box<dyn DecodeBackend>>,
    buffers: SlotPool,
    registers: SlotPool,
}

impl Engine {
    /// Wrap a backend with the standard pool sizes.
    pub fn new(backend: Box<dyn DecodeBackend>) -> Self {
        Self::with_pool_sizes(backend, N_MEM_BUFFERS, N_REGISTERS)
    }

    /// Wrap a backend with explicit pool sizes.
    pub fn with_pool_sizes(backend: Box<dyn DecodeBackend>, buffers: usize, registers: usize) -> Self {
        Self {
            backend: Mutex::new(backend),
            buffers: SlotPool::new(PoolKind::Buffers, buffers),
            registers: SlotPool::new(PoolKind::Registers, registers),
        }
    }

    /// Scan a file and return its inventory text.
    pub fn scan_inventory(&self, file: &Path) -> Result<String> {
        let _out = self.buffers.acquire()?;
        let mut backend = self.backend.lock();
        let result = backend.scan_inventory(file);
        backend.free_file(file);
        result
    }

    /// Decode the messages at `offsets` as one batched call.
    ///
    /// `npts` is the per-field point count; the concatenated result must hold
    /// exactly `offsets.len() * npts` values or the call reports a short
    /// read.
    pub fn decode_batch(&self, file: &Path, offsets: &[u64], npts: usize) -> Result<Vec<f32>> {
        // One buffer stages the offset list, one receives the fields.
        let _inv = self.buffers.acquire()?;
        let _out = self.buffers.acquire()?;
        debug!(
            file = %file.display(),
            messages = offsets.len(),
            "batched decode"
        );
        let mut backend = self.backend.lock();
        let result = backend.decode_batch(file, offsets);
        backend.free_file(file);
        let values = result?;

        let expected = offsets.len() * npts;
        if values.len() != expected {
            return Err(EngineError::ShortRead {
                expected,
                actual: values.len(),
            });
        }
        Ok(values)
    }

    /// Return the undecoded bytes of one message.
    pub fn read_raw(&self, file: &Path, offset: u64) -> Result<Vec<u8>> {
        let _out = self.buffers.acquire()?;
        let mut backend = self.backend.lock();
        let result = backend.read_raw(file, offset);
        backend.free_file(file);
        result
    }

    /// Re-encode one message per `request`.
    ///
    /// Replacement field data is staged through a register handle.
    pub fn write_message(&self, request: &WriteRequest) -> Result<()> {
        let _reg = match request.data {
            Some(_) => Some(self.registers.acquire()?),
            None => None,
        };
        let mut backend = self.backend.lock();
        let result = backend.write_message(request);
        backend.free_file(&request.template_file);
        backend.free_file(&request.file);
        result
    }

    /// Buffers currently claimed. Intended for leak diagnostics.
    pub fn buffers_in_use(&self) -> usize {
        self.buffers.in_use()
    }

    /// Registers currently claimed. Intended for leak diagnostics.
    pub fn registers_in_use(&self) -> usize {
        self.registers.in_use()
    }
}
