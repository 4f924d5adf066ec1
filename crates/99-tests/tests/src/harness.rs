//! Serialized access to the process-wide core.
//!
//! The ABI is single-threaded while the test runner is not, so every test
//! holds [`Session`] for its whole body.

use abi::{ZylixAppState, ZylixDiff, ZylixState};
use parking_lot::{Mutex, MutexGuard};
use std::ffi::{c_char, CStr};

static ABI_LOCK: Mutex<()> = Mutex::new(());

pub(crate) struct Session {
    _guard: MutexGuard<'static, ()>,
}

impl Session {
    /// Locks the ABI with no core running.
    pub(crate) fn uninitialized() -> Self {
        let guard = ABI_LOCK.lock();
        let _ = env_logger::builder().is_test(true).try_init();
        // A failed test may have left a core behind.
        abi::zylix_deinit();
        Self { _guard: guard }
    }

    /// Locks the ABI and starts a core with default configuration.
    pub(crate) fn start() -> Self {
        let session = Self::uninitialized();
        assert_eq!(abi::zylix_init(), abi::ZYLIX_OK);
        session
    }

    pub(crate) fn dispatch(&self, event_type: u32, payload: &[u8]) -> i32 {
        unsafe { abi::zylix_dispatch(event_type, payload.as_ptr().cast(), payload.len()) }
    }

    pub(crate) fn queue(&self, event_type: u32, payload: &[u8], priority: u8) -> i32 {
        unsafe {
            abi::zylix_queue_event(
                event_type,
                payload.as_ptr().cast(),
                payload.len(),
                priority,
            )
        }
    }

    /// Copies the published state out before the next mutating call.
    pub(crate) fn state(&self) -> ZylixState {
        let ptr = abi::zylix_get_state();
        assert!(!ptr.is_null(), "state requested without a running core");
        unsafe { *ptr }
    }

    pub(crate) fn app(&self) -> ZylixAppState {
        let state = self.state();
        assert_eq!(state.view_data_size, std::mem::size_of::<ZylixAppState>());
        unsafe { *state.view_data.cast::<ZylixAppState>() }
    }

    pub(crate) fn diff(&self) -> ZylixDiff {
        let ptr = abi::zylix_get_diff();
        assert!(!ptr.is_null(), "diff requested without a running core");
        unsafe { *ptr }
    }

    pub(crate) fn last_error(&self) -> String {
        let ptr: *const c_char = abi::zylix_get_last_error();
        assert!(!ptr.is_null());
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        abi::zylix_deinit();
    }
}
