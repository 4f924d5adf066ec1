//! C-layout snapshots published to host shells.
//!
//! The arena owns every buffer a host pointer may reference. Each mutating
//! call publishes a new generation in place; pointers handed out for an older
//! generation are no longer valid once the next generation is published.

use log::trace;
use std::ffi::{c_char, c_void, CStr, CString};
use std::mem::{offset_of, size_of};
use store::{Diff, Model, INPUT_CAPACITY};

/// ABI-compatible state snapshot.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ZylixState {
    /// State version (monotonic).
    pub version: u64,
    /// Current screen identifier.
    pub screen: u32,
    /// Loading indicator.
    pub loading: bool,
    pub _reserved: [u8; 3],
    /// NUL-terminated error message, or NULL when no error is recorded.
    pub error_message: *const c_char,
    /// Points at a [`ZylixAppState`].
    pub view_data: *const c_void,
    pub view_data_size: usize,
}

/// ABI-compatible diff descriptor.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZylixDiff {
    pub changed_mask: u64,
    pub change_count: u32,
    pub _reserved: u32,
    pub version: u64,
}

/// ABI-compatible application view data (the first three fields match the v1 layout).
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ZylixAppState {
    pub counter: i64,
    pub input_text: [u8; INPUT_CAPACITY],
    pub input_len: usize,
    pub selection: u32,
    pub last_button: u32,
}

const _: () = {
    assert!(offset_of!(ZylixState, screen) == 8);
    assert!(offset_of!(ZylixState, loading) == 12);
    assert!(offset_of!(ZylixState, error_message) == 16);
    assert!(size_of::<ZylixDiff>() == 24);
    assert!(offset_of!(ZylixDiff, version) == 16);
    assert!(offset_of!(ZylixAppState, input_text) == 8);
};

impl From<Diff> for ZylixDiff {
    fn from(diff: Diff) -> Self {
        Self {
            changed_mask: diff.changed_mask,
            change_count: diff.change_count,
            _reserved: 0,
            version: diff.version,
        }
    }
}

impl ZylixAppState {
    fn from_model(model: &Model) -> Self {
        Self {
            counter: model.app.counter,
            input_text: *model.app.input.raw(),
            input_len: model.app.input.len(),
            selection: model.app.selection,
            last_button: model.app.last_button,
        }
    }
}

/// Proof that a snapshot was read during a particular generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotToken {
    generation: u64,
}

impl SnapshotToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Owner of every buffer a published snapshot points into.
///
/// Must stay boxed: published structs hold pointers into the arena itself.
#[derive(Debug)]
pub struct SnapshotArena {
    state: ZylixState,
    diff: ZylixDiff,
    app: ZylixAppState,
    error: Option<CString>,
    // Errors replaced mid-generation; freed on the next publish.
    retired: Vec<CString>,
    generation: u64,
}

impl SnapshotArena {
    pub fn new(model: &Model, diff: &Diff, version: u64) -> Box<Self> {
        let mut arena = Box::new(Self {
            state: ZylixState {
                version,
                screen: 0,
                loading: false,
                _reserved: [0; 3],
                error_message: std::ptr::null(),
                view_data: std::ptr::null(),
                view_data_size: 0,
            },
            diff: ZylixDiff::default(),
            app: ZylixAppState::from_model(model),
            error: None,
            retired: Vec::new(),
            generation: 0,
        });
        arena.fill(model, diff, version);
        arena
    }

    /// Starts a new generation and regenerates every published struct in place.
    pub fn publish(&mut self, model: &Model, diff: &Diff, version: u64) {
        self.generation += 1;
        self.retired.clear();
        self.fill(model, diff, version);
        trace!("snapshot generation {} at version {version}", self.generation);
    }

    fn fill(&mut self, model: &Model, diff: &Diff, version: u64) {
        self.app = ZylixAppState::from_model(model);
        self.diff = ZylixDiff::from(*diff);
        self.state.version = version;
        self.state.screen = model.ui.screen.as_u32();
        self.state.loading = model.ui.loading;
        self.state.view_data = (&self.app as *const ZylixAppState).cast();
        self.state.view_data_size = size_of::<ZylixAppState>();
        self.state.error_message = self.error_ptr_or_null();
    }

    /// Replaces the recorded error. The previous string stays alive until the next publish.
    pub fn set_error(&mut self, msg: Option<&str>) {
        let unchanged = match (&self.error, msg) {
            (Some(current), Some(next)) => current.as_bytes() == next.as_bytes(),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        if let Some(old) = self.error.take() {
            self.retired.push(old);
        }
        self.error = match msg {
            Some(msg) => Some(self.error_string(msg)),
            None => None,
        };
        self.state.error_message = self.error_ptr_or_null();
    }

    /// Takes back a retired copy of `msg` when there is one, so alternating
    /// errors within one generation keep one string per distinct message.
    fn error_string(&mut self, msg: &str) -> CString {
        let wanted = to_cstring(msg);
        match self.retired.iter().position(|old| *old == wanted) {
            Some(index) => self.retired.swap_remove(index),
            None => wanted,
        }
    }

    fn error_ptr_or_null(&self) -> *const c_char {
        self.error.as_deref().map_or(std::ptr::null(), CStr::as_ptr)
    }

    /// Recorded error, or an empty string.
    pub fn error(&self) -> &CStr {
        self.error.as_deref().unwrap_or(c"")
    }

    pub fn state(&self) -> &ZylixState {
        &self.state
    }

    pub fn diff(&self) -> &ZylixDiff {
        &self.diff
    }

    pub fn app(&self) -> &ZylixAppState {
        &self.app
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> SnapshotToken {
        SnapshotToken {
            generation: self.generation,
        }
    }
}

fn to_cstring(msg: &str) -> CString {
    let bytes: Vec<u8> = msg.bytes().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default()
}
