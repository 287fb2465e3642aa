//! Coordinator for the shared, non-reentrant decode engine.
//!
//! The engine that decodes message payloads is a single process-wide resource
//! with internal global state: a bounded pool of reusable memory buffers, a
//! smaller pool of field registers, and a table of open files. This crate
//! wraps it in an [`Engine`] coordinator that serializes every call through
//! one lock, hands out pool slots as RAII guards so they are returned on
//! every exit path, and closes the engine's file-table entry after each call
//! whether it succeeded or failed.
//!
//! The engine itself stays external: callers plug in a [`DecodeBackend`]
//! implementation and the coordinator never inspects message bytes.

pub mod backend;
pub mod engine;
pub mod error;
pub mod pool;

pub use backend::{DecodeBackend, WriteRequest};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use pool::{PoolKind, SlotGuard, SlotPool};

/// Number of reusable memory buffers the engine exposes.
pub const N_MEM_BUFFERS: usize = 30;

/// Number of reusable field registers the engine exposes.
pub const N_REGISTERS: usize = 20;
