//! Core handle tying the store, dispatcher, queue, and published snapshots together.
//!
//! This crate has no process-wide state. The ABI crate owns the single
//! instance hosts talk to; everything else builds [`Core`] values directly.

mod config;
mod context;
mod error;
pub mod snapshot;

pub use crate::config::{CoreConfig, MAX_QUEUE_CAPACITY, MAX_SCRATCH_CAPACITY};
pub use crate::context::Core;
pub use crate::error::{CoreError, CoreResult, ResultCode};
pub use crate::snapshot::{SnapshotToken, ZylixAppState, ZylixDiff, ZylixState};

pub use events::{event_type, DispatchResult};
pub use queue::{Priority, MAX_PAYLOAD};
pub use store::{field, Diff, FieldId, Screen, StateRef, FIELD_COUNT};
