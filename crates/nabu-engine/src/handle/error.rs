use std::collections::TryReserveError;

use thiserror::Error;

use super::Handle;

/// Why a handle failed validation.
///
/// Control flow only needs the boolean outcome (`HandleTable::owns`); the
/// variants exist for diagnostics.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum HandleError {
    #[error("handle {handle} is out of range (table has {len} slots)")]
    OutOfRange { handle: Handle, len: usize },

    #[error("handle {handle} refers to a destroyed slot")]
    Tombstoned { handle: Handle },

    #[error("handle {handle} is stale (slot is at generation {current})")]
    StaleGeneration { handle: Handle, current: u32 },
}

/// Failure to grow a `HandleTable`.
///
/// Unlike `HandleError` this is not a routine outcome; callers propagate it.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("handle table exhausted at {slots} slots")]
    Exhausted { slots: usize },

    #[error("failed to grow handle table")]
    Alloc(#[from] TryReserveError),
}
