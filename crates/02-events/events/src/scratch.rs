//! Fixed-capacity bump arena for short-lived reducer buffers.
//!
//! The backing storage is allocated once. Allocations only move a cursor, and
//! [`ScratchArena::reset`] rewinds it, so nothing handed out survives past the
//! dispatch cycle that requested it.

use std::collections::TryReserveError;
use thiserror::Error;

/// Raised when an allocation does not fit in the remaining arena space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scratch arena exhausted: requested {requested} bytes, {available} available")]
pub struct ScratchError {
    pub requested: usize,
    pub available: usize,
}

pub type ScratchResult<T> = Result<T, ScratchError>;

/// Bump allocator reset at the top of every dispatch cycle.
#[derive(Debug)]
pub struct ScratchArena {
    storage: Box<[u8]>,
    cursor: usize,
    high_water: usize,
}

impl ScratchArena {
    /// Allocates an arena of `capacity` bytes up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_storage(vec![0u8; capacity])
    }

    /// Like [`ScratchArena::with_capacity`], but reports allocation failure
    /// instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut storage = Vec::new();
        storage.try_reserve_exact(capacity)?;
        storage.resize(capacity, 0);
        Ok(Self::from_storage(storage))
    }

    fn from_storage(storage: Vec<u8>) -> Self {
        Self {
            storage: storage.into_boxed_slice(),
            cursor: 0,
            high_water: 0,
        }
    }

    /// Hands out `len` zeroed bytes valid until the next [`ScratchArena::reset`].
    pub fn alloc(&mut self, len: usize) -> ScratchResult<&mut [u8]> {
        let available = self.storage.len() - self.cursor;
        if len > available {
            return Err(ScratchError {
                requested: len,
                available,
            });
        }
        let start = self.cursor;
        self.cursor += len;
        self.high_water = self.high_water.max(self.cursor);
        let slice = &mut self.storage[start..self.cursor];
        slice.fill(0);
        Ok(slice)
    }

    /// Releases every outstanding allocation.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn used(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Largest cursor position observed since creation.
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}
