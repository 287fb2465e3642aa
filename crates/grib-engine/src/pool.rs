//! Bounded slot pools for engine-side buffers and registers.
//!
//! The engine reuses a fixed number of memory buffers and field registers.
//! Slots are found by a first-fit scan and must be returned on every exit
//! path; a saturated pool is a hard error. [`SlotGuard`] ties the release to
//! Drop so early returns and panics cannot leak a slot.

use parking_lot::Mutex;

use crate::error::EngineError;

/// Which engine resource a pool tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Buffers,
    Registers,
}

/// A fixed-size pool of reusable slots.
pub struct SlotPool {
    kind: PoolKind,
    slots: Mutex<Vec<bool>>,
}

impl SlotPool {
    /// Create a pool with `len` slots.
    pub fn new(kind: PoolKind, len: usize) -> Self {
        Self {
            kind,
            slots: Mutex::new(vec![false; len]),
        }
    }

    /// Claim the first free slot.
    pub fn acquire(&self) -> Result<SlotGuard<'_>, EngineError> {
        let mut slots = self.slots.lock();
        for (n, used) in slots.iter_mut().enumerate() {
            if !*used {
                *used = true;
                return Ok(SlotGuard { pool: self, n });
            }
        }
        Err(match self.kind {
            PoolKind::Buffers => EngineError::NoFreeBuffers,
            PoolKind::Registers => EngineError::NoFreeRegisters,
        })
    }

    /// Number of slots currently claimed. Intended for leak diagnostics.
    pub fn in_use(&self) -> usize {
        self.slots.lock().iter().filter(|u| **u).count()
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, n: usize) {
        self.slots.lock()[n] = false;
    }
}

/// A claimed pool slot, released when dropped.
pub struct SlotGuard<'a> {
    pool: &'a SlotPool,
    n: usize,
}

impl SlotGuard<'_> {
    /// Slot number within the pool.
    pub fn slot(&self) -> usize {
        self.n
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.pool.release(self.n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fit_reuses_lowest_slot() {
        let pool = SlotPool::new(PoolKind::Buffers, 4);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!((a.slot(), b.slot()), (0, 1));

        drop(a);
        let c = pool.acquire().unwrap();
        assert_eq!(c.slot(), 0);
        assert_eq!(pool.in_use(), 2);
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let pool = SlotPool::new(PoolKind::Buffers, 2);
        let _a = pool.acquire().unwrap();
        let _b = pool.acquire().unwrap();
        assert!(matches!(pool.acquire(), Err(EngineError::NoFreeBuffers)));
    }

    #[test]
    fn test_register_pool_reports_registers() {
        let pool = SlotPool::new(PoolKind::Registers, 1);
        let _a = pool.acquire().unwrap();
        assert!(matches!(pool.acquire(), Err(EngineError::NoFreeRegisters)));
    }

    #[test]
    fn test_guard_releases_on_early_exit() {
        let pool = SlotPool::new(PoolKind::Buffers, 1);
        let attempt = || -> Result<(), EngineError> {
            let _guard = pool.acquire()?;
            Err(EngineError::Backend("induced".to_string()))
        };
        assert!(attempt().is_err());
        assert_eq!(pool.in_use(), 0);
        assert!(pool.acquire().is_ok());
    }
}
