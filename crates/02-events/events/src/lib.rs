//! Event catalog, reducers, and the synchronous dispatcher.
//!
//! Hosts hand the core an opaque `(event_type, payload)` pair. This crate
//! decodes it into a typed [`Event`], runs the matching reducer against the
//! store's working copy, and commits exactly once.

/// Synchronous dispatcher and its result taxonomy.
pub mod dispatch;
/// Pure event reducer for the application model.
pub mod reduce_event;
/// Bump arena for transient per-dispatch buffers.
pub mod scratch;
/// Event codes and payload decoding.
pub mod types;

pub use crate::dispatch::{DispatchError, DispatchResult, Dispatcher};
pub use crate::reduce_event::{EventReducer, ReduceError};
pub use crate::scratch::{ScratchArena, ScratchError};
pub use crate::types::{event_type, DecodeError, Event, EventKind, MAX_TEXT_PAYLOAD};
