//! Synchronous event dispatch: decode, reduce, commit once.

use crate::reduce_event::{EventReducer, ReduceError};
use crate::scratch::ScratchArena;
use crate::types::{DecodeError, Event};
use log::{debug, trace};
use std::collections::TryReserveError;
use store::{Diff, Store, StoreError};
use thiserror::Error;

/// Status reported to hosts for a single dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum DispatchResult {
    /// The reducer ran and the store committed (possibly as a no-op).
    Ok = 0,
    /// The store has not been initialized.
    NotInitialized = 1,
    /// No reducer handles the event type; state untouched.
    UnknownEvent = 2,
    /// The payload was too short or malformed; state untouched.
    InvalidPayload = 3,
    /// A transient buffer could not be allocated; state untouched.
    OutOfMemory = 4,
}

/// Why a dispatch did not commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("store not initialized")]
    NotInitialized,

    #[error("unknown event type {0:#06x}")]
    UnknownEvent(u32),

    #[error("invalid payload: {0}")]
    InvalidPayload(DecodeError),

    #[error("reducer failed: {0}")]
    Reduce(#[from] ReduceError),
}

impl DispatchError {
    /// Maps the error onto the host-facing status.
    pub fn status(&self) -> DispatchResult {
        match self {
            DispatchError::NotInitialized => DispatchResult::NotInitialized,
            DispatchError::UnknownEvent(_) => DispatchResult::UnknownEvent,
            DispatchError::InvalidPayload(_) => DispatchResult::InvalidPayload,
            DispatchError::Reduce(ReduceError::Scratch(_)) => DispatchResult::OutOfMemory,
        }
    }
}

impl From<DecodeError> for DispatchError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Unknown(code) => DispatchError::UnknownEvent(code),
            other => DispatchError::InvalidPayload(other),
        }
    }
}

// update/commit only fail before init.
impl From<StoreError> for DispatchError {
    fn from(_: StoreError) -> Self {
        DispatchError::NotInitialized
    }
}

impl DispatchResult {
    /// Collapses a dispatch outcome into its status.
    pub fn of(outcome: &Result<Diff, DispatchError>) -> Self {
        match outcome {
            Ok(_) => DispatchResult::Ok,
            Err(err) => err.status(),
        }
    }
}

/// Maps `(event_type, payload)` pairs onto reducer calls against a [`Store`].
///
/// Owns the scratch arena reducers borrow transient buffers from; the arena is
/// rewound at the top of every dispatch.
#[derive(Debug)]
pub struct Dispatcher {
    scratch: ScratchArena,
}

impl Dispatcher {
    /// Creates a dispatcher whose scratch arena holds `scratch_capacity` bytes.
    pub fn new(scratch_capacity: usize) -> Self {
        Self {
            scratch: ScratchArena::with_capacity(scratch_capacity),
        }
    }

    /// Fallible [`Dispatcher::new`] for capacities chosen by a host.
    pub fn try_new(scratch_capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            scratch: ScratchArena::try_with_capacity(scratch_capacity)?,
        })
    }

    /// Decodes and reduces one event, committing exactly once on success.
    ///
    /// Every error path leaves the committed state and version untouched.
    pub fn dispatch(
        &mut self,
        store: &mut Store,
        event_type: u32,
        payload: &[u8],
    ) -> Result<Diff, DispatchError> {
        self.scratch.reset();
        if !store.is_initialized() {
            return Err(DispatchError::NotInitialized);
        }

        let event = Event::decode(event_type, payload).map_err(|err| {
            debug!("dispatch {event_type:#06x} rejected: {err}");
            DispatchError::from(err)
        })?;

        let scratch = &mut self.scratch;
        if let Err(err) = store.update(|model| model.reduce_event(&event, scratch))? {
            store.discard()?;
            debug!("dispatch {:?} failed: {err}", event.kind());
            return Err(err.into());
        }

        let diff = store.commit()?;
        trace!(
            "dispatch {:?} -> version {} ({} changes)",
            event.kind(),
            diff.version,
            diff.change_count
        );
        Ok(diff)
    }

    /// Rewinds the scratch arena.
    pub fn reset_scratch(&mut self) {
        self.scratch.reset();
    }

    pub fn scratch(&self) -> &ScratchArena {
        &self.scratch
    }
}
