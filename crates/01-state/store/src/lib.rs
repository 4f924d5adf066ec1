//! Versioned application state and the field bitmask that describes each commit.
//!
//! A [`Store`] starts empty and, once initialized, holds a committed [`Model`]
//! next to a working copy. Reducers edit the working copy through
//! [`Store::update`]. [`Store::commit`] compares the two, bumps the version
//! only when some field differs, and returns the [`Diff`] naming those fields.

/// Field-level diff engine and changed-field bitmask.
pub mod diff;
/// Versioned store with update-then-commit semantics.
pub mod store;
/// Application and presentation state types.
pub mod types;

pub use crate::diff::{diff_models, field, Diff, DiffBuilder, Diffable, FieldId, FIELD_COUNT};
pub use crate::store::{StateRef, Store, StoreError, StoreResult};
pub use crate::types::{AppState, InputBuffer, Model, Screen, UiState, INPUT_CAPACITY};
