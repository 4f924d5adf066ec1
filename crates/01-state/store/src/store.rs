//! Versioned state container with update-then-commit semantics.

use crate::diff::{diff_models, Diff};
use crate::types::{AppState, Model, UiState};
use log::trace;
use thiserror::Error;

/// Convenience result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the store lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store not initialized")]
    NotInitialized,

    #[error("store already initialized")]
    AlreadyInitialized,
}

/// Read-only view of the committed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRef<'a> {
    /// Committed version; increments once per committed change.
    pub version: u64,
    pub app: &'a AppState,
    pub ui: &'a UiState,
    /// Message recorded by the most recent failed operation.
    pub last_error: Option<&'a str>,
}

#[derive(Debug)]
struct Live {
    committed: Model,
    working: Model,
    version: u64,
    diff: Diff,
    last_error: Option<String>,
}

/// Owns the canonical state and its version counter.
///
/// Mutations land in a working copy via [`Store::update`]; [`Store::commit`]
/// promotes them and bumps the version only when at least one field differs.
#[derive(Debug, Default)]
pub struct Store {
    live: Option<Live>,
}

impl Store {
    /// Creates an uninitialized store. Every accessor fails until [`Store::init`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes the store with the default model at version 0.
    pub fn init(&mut self) -> StoreResult<()> {
        self.init_with(Model::default())
    }

    /// Initializes the store with `model` at version 0.
    pub fn init_with(&mut self, model: Model) -> StoreResult<()> {
        if self.live.is_some() {
            return Err(StoreError::AlreadyInitialized);
        }
        self.live = Some(Live {
            committed: model,
            working: model,
            version: 0,
            diff: Diff::empty(0),
            last_error: None,
        });
        Ok(())
    }

    /// Drops all state. The store can be initialized again afterwards.
    pub fn deinit(&mut self) {
        self.live = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.live.is_some()
    }

    fn live(&self) -> StoreResult<&Live> {
        self.live.as_ref().ok_or(StoreError::NotInitialized)
    }

    fn live_mut(&mut self) -> StoreResult<&mut Live> {
        self.live.as_mut().ok_or(StoreError::NotInitialized)
    }

    /// Applies `mutator` to the working copy. Nothing is visible until [`Store::commit`].
    pub fn update<R>(&mut self, mutator: impl FnOnce(&mut Model) -> R) -> StoreResult<R> {
        let live = self.live_mut()?;
        Ok(mutator(&mut live.working))
    }

    /// Throws away uncommitted changes in the working copy.
    pub fn discard(&mut self) -> StoreResult<()> {
        let live = self.live_mut()?;
        live.working = live.committed;
        Ok(())
    }

    /// Compares the working copy against the committed copy.
    ///
    /// With at least one changed field the working copy is promoted, the
    /// version increments by one, and the resulting diff is retained. With no
    /// changes the version is left alone and an empty diff for the current
    /// version is retained and returned.
    pub fn commit(&mut self) -> StoreResult<Diff> {
        let live = self.live_mut()?;
        let next = live.version + 1;
        let diff = diff_models(&live.committed, &live.working, next);
        if diff.is_empty() {
            live.diff = Diff::empty(live.version);
            trace!("commit: no changes at version {}", live.version);
            return Ok(live.diff);
        }

        live.committed = live.working;
        live.version = next;
        live.diff = diff;
        trace!(
            "commit: version {} mask {:#x} ({} fields)",
            next,
            diff.changed_mask,
            diff.change_count
        );
        Ok(diff)
    }

    /// Current committed version, or 0 when uninitialized.
    pub fn version(&self) -> u64 {
        self.live.as_ref().map_or(0, |live| live.version)
    }

    /// Borrowed view of the committed state.
    pub fn state(&self) -> StoreResult<StateRef<'_>> {
        let live = self.live()?;
        Ok(StateRef {
            version: live.version,
            app: &live.committed.app,
            ui: &live.committed.ui,
            last_error: live.last_error.as_deref(),
        })
    }

    /// Committed model.
    pub fn model(&self) -> StoreResult<&Model> {
        Ok(&self.live()?.committed)
    }

    /// Diff retained by the most recent commit.
    pub fn diff(&self) -> StoreResult<Diff> {
        Ok(self.live()?.diff)
    }

    /// Replaces the retained diff, e.g. with one accumulated over a batch.
    pub fn set_diff(&mut self, diff: Diff) -> StoreResult<()> {
        self.live_mut()?.diff = diff;
        Ok(())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.live.as_ref().and_then(|live| live.last_error.as_deref())
    }

    /// Records a failure message. Ignored when uninitialized.
    pub fn set_last_error(&mut self, msg: impl Into<String>) {
        if let Some(live) = self.live.as_mut() {
            live.last_error = Some(msg.into());
        }
    }

    pub fn clear_last_error(&mut self) {
        if let Some(live) = self.live.as_mut() {
            live.last_error = None;
        }
    }
}
