//! The core context: one store, one dispatcher, one queue, one snapshot arena.
//!
//! Everything here runs on the caller's thread and to completion. The handle
//! is an ordinary value so tests can build as many as they like; the ABI layer
//! decides that the process gets exactly one.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, ResultCode};
use crate::snapshot::{SnapshotArena, SnapshotToken, ZylixAppState, ZylixDiff, ZylixState};
use events::{DispatchError, DispatchResult, Dispatcher};
use log::{debug, warn};
use queue::EventQueue;
use std::ffi::CStr;
use store::{Diff, FieldId, StateRef, Store};

/// Owner of all application state and the machinery that mutates it.
pub struct Core {
    store: Store,
    dispatcher: Dispatcher,
    queue: EventQueue,
    snapshots: Box<SnapshotArena>,
    last_status: DispatchResult,
}

impl Core {
    /// Builds an initialized core at version 0.
    pub fn new(config: CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        let mut store = Store::new();
        store
            .init()
            .map_err(|_| CoreError::AlreadyInitialized)?;
        let model = *store.model().map_err(|_| CoreError::NotInitialized)?;
        let diff = store.diff().map_err(|_| CoreError::NotInitialized)?;
        debug!(
            "core initialized (queue {} events, scratch {} bytes)",
            config.queue_capacity, config.scratch_capacity
        );
        Ok(Self {
            store,
            dispatcher: Dispatcher::try_new(config.scratch_capacity)?,
            queue: EventQueue::try_with_capacity(config.queue_capacity)?,
            snapshots: SnapshotArena::new(&model, &diff, 0),
            last_status: DispatchResult::Ok,
        })
    }

    /// Dispatches one event synchronously and publishes a new snapshot generation.
    pub fn dispatch(&mut self, event_type: u32, payload: &[u8]) -> DispatchResult {
        self.dispatcher.reset_scratch();
        let status = self.apply(event_type, payload);
        self.publish();
        status
    }

    // Shared by `dispatch` and `process_events` so queued events behave exactly
    // like direct ones.
    fn apply(&mut self, event_type: u32, payload: &[u8]) -> DispatchResult {
        let outcome = self
            .dispatcher
            .dispatch(&mut self.store, event_type, payload);
        let status = DispatchResult::of(&outcome);
        match outcome {
            Ok(_) => self.clear_error(),
            // Forward-compatible hosts may send codes this core predates.
            Err(DispatchError::UnknownEvent(code)) => {
                debug!("ignoring unknown event {code:#06x}");
            }
            Err(err) => self.record_error(&CoreError::from(err)),
        }
        self.last_status = status;
        status
    }

    /// Copies an event into the priority queue.
    ///
    /// Returns the enqueue sequence number.
    pub fn queue_event(&mut self, event_type: u32, payload: &[u8], priority: u8) -> CoreResult<u64> {
        match self.queue.push(event_type, payload, priority) {
            Ok(seq) => {
                self.clear_error();
                Ok(seq)
            }
            Err(err) => {
                let err = CoreError::from(err);
                self.record_error(&err);
                Err(err)
            }
        }
    }

    /// Processes up to `max_events` queued events (`0` drains the queue).
    ///
    /// The retained diff becomes the union of every commit in the batch: masks
    /// OR'd, counts summed. Returns how many events were consumed.
    pub fn process_events(&mut self, max_events: u32) -> u32 {
        self.dispatcher.reset_scratch();
        let limit = if max_events == 0 {
            u32::MAX
        } else {
            max_events
        };

        let mut batch = Diff::empty(self.store.version());
        let mut processed = 0u32;
        while processed < limit {
            let Some(event) = self.queue.pop_next() else {
                break;
            };
            processed += 1;
            if self.apply(event.event_type, &event.payload) == DispatchResult::Ok {
                if let Ok(diff) = self.store.diff() {
                    batch.merge(&diff);
                }
            }
        }

        if processed > 0 {
            batch.version = self.store.version();
            if let Err(err) = self.store.set_diff(batch) {
                warn!("could not retain batch diff: {err}");
            }
            debug!(
                "processed {processed} events -> version {} ({} changes)",
                batch.version, batch.change_count
            );
        }
        self.publish();
        processed
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.depth()
    }

    /// Drops every queued event without running any reducer.
    pub fn queue_clear(&mut self) -> usize {
        let dropped = self.queue.clear();
        if dropped > 0 {
            debug!("queue cleared ({dropped} events dropped)");
        }
        dropped
    }

    pub fn reset_scratch(&mut self) {
        self.dispatcher.reset_scratch();
    }

    pub fn version(&self) -> u64 {
        self.store.version()
    }

    /// Borrowed view of the committed state.
    pub fn state(&self) -> CoreResult<StateRef<'_>> {
        self.store.state().map_err(|_| CoreError::NotInitialized)
    }

    pub fn diff(&self) -> Diff {
        self.store.diff().unwrap_or_default()
    }

    pub fn field_changed(&self, id: FieldId) -> bool {
        self.diff().field_changed(id)
    }

    pub fn last_status(&self) -> DispatchResult {
        self.last_status
    }

    /// Published C-layout state for the current generation.
    pub fn abi_state(&self) -> &ZylixState {
        self.snapshots.state()
    }

    pub fn abi_diff(&self) -> &ZylixDiff {
        self.snapshots.diff()
    }

    pub fn abi_app(&self) -> &ZylixAppState {
        self.snapshots.app()
    }

    /// Last error message, or an empty string.
    pub fn last_error(&self) -> &CStr {
        self.snapshots.error()
    }

    /// Published state read under `token`. Debug builds panic when the token
    /// predates the current generation.
    pub fn abi_state_at(&self, token: SnapshotToken) -> &ZylixState {
        self.assert_fresh(token);
        self.snapshots.state()
    }

    /// Token identifying the snapshot generation currently published.
    pub fn token(&self) -> SnapshotToken {
        self.snapshots.token()
    }

    /// Returns whether `token` still refers to the current generation.
    pub fn is_fresh(&self, token: SnapshotToken) -> bool {
        token.generation() == self.snapshots.generation()
    }

    /// Flags reads against a stale generation. Panics in debug builds only.
    pub fn assert_fresh(&self, token: SnapshotToken) -> bool {
        let fresh = self.is_fresh(token);
        debug_assert!(
            fresh,
            "snapshot generation {} read after generation {} was published",
            token.generation(),
            self.snapshots.generation()
        );
        fresh
    }

    /// Records an error detected before reaching the core (bad pointers,
    /// oversized lengths) and returns its result code.
    pub fn reject(&mut self, err: CoreError) -> ResultCode {
        self.record_error(&err);
        err.code()
    }

    fn publish(&mut self) {
        let version = self.store.version();
        let diff = self.diff();
        if let Ok(model) = self.store.model() {
            self.snapshots.publish(model, &diff, version);
        }
    }

    fn record_error(&mut self, err: &CoreError) {
        let msg = err.to_string();
        warn!("{msg}");
        self.snapshots.set_error(Some(&msg));
        self.store.set_last_error(msg);
    }

    fn clear_error(&mut self) {
        self.snapshots.set_error(None);
        self.store.clear_last_error();
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        debug!(
            "core shutting down at version {} ({} events dropped)",
            self.store.version(),
            self.queue.depth()
        );
    }
}
