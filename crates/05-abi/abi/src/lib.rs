//! C ABI exported to host shells.
//!
//! None of these functions are thread-safe: hosts call them from one logical
//! thread (conventionally the UI thread). Pointers returned by
//! [`zylix_get_state`], [`zylix_get_diff`] and [`zylix_get_last_error`] stay
//! valid only until the next [`zylix_dispatch`] or [`zylix_process_events`];
//! use [`zylix_copy_string`] to keep a string longer than that.

mod cell;
mod guard;

use crate::cell::SingleThreadCell;
use crate::guard::guarded;
use log::{debug, warn};
use runtime::{Core, CoreConfig, CoreError, DispatchResult, ResultCode, MAX_PAYLOAD};
use std::ffi::{c_char, c_void};
use std::ptr;

pub use runtime::{ZylixAppState, ZylixDiff, ZylixState};

/// Bumped on every breaking change to exported signatures or struct layouts.
pub const ZYLIX_ABI_VERSION: u32 = 2;

pub const ZYLIX_OK: i32 = ResultCode::Ok as i32;
pub const ZYLIX_ERR_INVALID_ARG: i32 = ResultCode::InvalidArg as i32;
pub const ZYLIX_ERR_OUT_OF_MEMORY: i32 = ResultCode::OutOfMemory as i32;
pub const ZYLIX_ERR_INVALID_STATE: i32 = ResultCode::InvalidState as i32;
pub const ZYLIX_ERR_NOT_INITIALIZED: i32 = ResultCode::NotInitialized as i32;

/// Host-supplied construction parameters.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZylixConfig {
    pub queue_capacity: u32,
    pub scratch_capacity: u32,
}

impl Default for ZylixConfig {
    fn default() -> Self {
        let defaults = CoreConfig::default();
        Self {
            queue_capacity: defaults.queue_capacity as u32,
            scratch_capacity: defaults.scratch_capacity as u32,
        }
    }
}

impl From<ZylixConfig> for CoreConfig {
    fn from(config: ZylixConfig) -> Self {
        Self {
            queue_capacity: config.queue_capacity as usize,
            scratch_capacity: config.scratch_capacity as usize,
        }
    }
}

static CORE: SingleThreadCell<Option<Core>> = SingleThreadCell::new(None);

static NOT_INITIALIZED_MSG: &std::ffi::CStr = c"core not initialized";

fn with_core<R>(f: impl FnOnce(&mut Core) -> R) -> Option<R> {
    CORE.with_mut(|slot| slot.as_mut().map(f))
}

fn read_core<R>(f: impl FnOnce(&Core) -> R) -> Option<R> {
    CORE.with(|slot| slot.as_ref().map(f))
}

fn init_core(config: CoreConfig) -> i32 {
    CORE.with_mut(|slot| {
        if slot.is_some() {
            warn!("init called while the core is already running");
            return ZYLIX_ERR_INVALID_STATE;
        }
        match Core::new(config) {
            Ok(core) => {
                *slot = Some(core);
                ZYLIX_OK
            }
            Err(err) => {
                warn!("init rejected: {err}");
                err.code().as_i32()
            }
        }
    })
}

/// Borrows a host payload. `None` means a NULL pointer with a non-zero length.
///
/// # Safety
/// A non-NULL `ptr` must be valid for `len` bytes for the duration of the call.
unsafe fn borrow_payload<'a>(ptr: *const c_void, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if ptr.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts(ptr.cast::<u8>(), len))
    }
}

/// Initializes the core with default configuration.
#[no_mangle]
pub extern "C" fn zylix_init() -> i32 {
    guarded("zylix_init", ZYLIX_ERR_INVALID_STATE, || {
        init_core(CoreConfig::default())
    })
}

/// Initializes the core with host-supplied capacities. Out-of-range values
/// are `ZYLIX_ERR_INVALID_ARG`; a failed reservation is `ZYLIX_ERR_OUT_OF_MEMORY`.
///
/// # Safety
/// `config` must be NULL or point to a valid [`ZylixConfig`].
#[no_mangle]
pub unsafe extern "C" fn zylix_init_with_config(config: *const ZylixConfig) -> i32 {
    guarded("zylix_init_with_config", ZYLIX_ERR_INVALID_STATE, || {
        match config.as_ref() {
            Some(config) => init_core(CoreConfig::from(*config)),
            None => ZYLIX_ERR_INVALID_ARG,
        }
    })
}

/// Tears the core down. Every pointer handed out before this call is invalid.
#[no_mangle]
pub extern "C" fn zylix_deinit() -> i32 {
    guarded("zylix_deinit", ZYLIX_ERR_INVALID_STATE, || {
        match CORE.with_mut(Option::take) {
            Some(core) => {
                drop(core);
                ZYLIX_OK
            }
            None => ZYLIX_ERR_NOT_INITIALIZED,
        }
    })
}

/// Callable before [`zylix_init`].
#[no_mangle]
pub extern "C" fn zylix_get_abi_version() -> u32 {
    ZYLIX_ABI_VERSION
}

/// Current state snapshot, or NULL before init.
#[no_mangle]
pub extern "C" fn zylix_get_state() -> *const ZylixState {
    guarded("zylix_get_state", ptr::null(), || {
        read_core(|core| core.abi_state() as *const ZylixState).unwrap_or(ptr::null())
    })
}

/// State version, or 0 before init.
#[no_mangle]
pub extern "C" fn zylix_get_state_version() -> u64 {
    guarded("zylix_get_state_version", 0, || {
        read_core(Core::version).unwrap_or(0)
    })
}

#[no_mangle]
pub extern "C" fn zylix_get_counter() -> i64 {
    guarded("zylix_get_counter", 0, || {
        read_core(|core| core.state().map_or(0, |state| state.app.counter)).unwrap_or(0)
    })
}

/// Dispatches one event synchronously.
///
/// Unknown event types are a silent no-op and return `ZYLIX_OK`; see
/// [`zylix_get_dispatch_status`] for the detailed outcome.
///
/// # Safety
/// A non-NULL `payload` must be valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn zylix_dispatch(event_type: u32, payload: *const c_void, len: usize) -> i32 {
    guarded("zylix_dispatch", ZYLIX_ERR_INVALID_STATE, || {
        with_core(|core| match borrow_payload(payload, len) {
            Some(bytes) => ResultCode::from(core.dispatch(event_type, bytes)).as_i32(),
            None => core
                .reject(CoreError::InvalidArg("null payload with non-zero length"))
                .as_i32(),
        })
        .unwrap_or(ZYLIX_ERR_NOT_INITIALIZED)
    })
}

/// Outcome of the most recent dispatched event (`DispatchResult` as `u32`).
#[no_mangle]
pub extern "C" fn zylix_get_dispatch_status() -> u32 {
    guarded(
        "zylix_get_dispatch_status",
        DispatchResult::NotInitialized as u32,
        || {
            read_core(|core| core.last_status() as u32)
                .unwrap_or(DispatchResult::NotInitialized as u32)
        },
    )
}

/// Copies an event into the priority queue (`priority` 0..=3).
///
/// # Safety
/// A non-NULL `payload` must be valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn zylix_queue_event(
    event_type: u32,
    payload: *const c_void,
    len: usize,
    priority: u8,
) -> i32 {
    guarded("zylix_queue_event", ZYLIX_ERR_INVALID_STATE, || {
        with_core(|core| {
            if len > MAX_PAYLOAD {
                return core
                    .reject(CoreError::InvalidArg("payload larger than 256 bytes"))
                    .as_i32();
            }
            let Some(bytes) = borrow_payload(payload, len) else {
                return core
                    .reject(CoreError::InvalidArg("null payload with non-zero length"))
                    .as_i32();
            };
            match core.queue_event(event_type, bytes, priority) {
                Ok(_) => ZYLIX_OK,
                Err(err) => err.code().as_i32(),
            }
        })
        .unwrap_or(ZYLIX_ERR_NOT_INITIALIZED)
    })
}

/// Processes up to `max_events` queued events; `0` drains the queue.
#[no_mangle]
pub extern "C" fn zylix_process_events(max_events: u32) -> u32 {
    guarded("zylix_process_events", 0, || {
        with_core(|core| core.process_events(max_events)).unwrap_or(0)
    })
}

#[no_mangle]
pub extern "C" fn zylix_queue_depth() -> u32 {
    guarded("zylix_queue_depth", 0, || {
        read_core(|core| core.queue_depth() as u32).unwrap_or(0)
    })
}

#[no_mangle]
pub extern "C" fn zylix_queue_clear() {
    guarded("zylix_queue_clear", (), || {
        with_core(Core::queue_clear);
    })
}

/// Diff of the last commit (or batch), or NULL before init.
#[no_mangle]
pub extern "C" fn zylix_get_diff() -> *const ZylixDiff {
    guarded("zylix_get_diff", ptr::null(), || {
        read_core(|core| core.abi_diff() as *const ZylixDiff).unwrap_or(ptr::null())
    })
}

#[no_mangle]
pub extern "C" fn zylix_field_changed(field_id: u16) -> bool {
    guarded("zylix_field_changed", false, || {
        read_core(|core| core.field_changed(field_id)).unwrap_or(false)
    })
}

/// Most recent error message. Never NULL.
#[no_mangle]
pub extern "C" fn zylix_get_last_error() -> *const c_char {
    guarded("zylix_get_last_error", NOT_INITIALIZED_MSG.as_ptr(), || {
        read_core(|core| core.last_error().as_ptr()).unwrap_or(NOT_INITIALIZED_MSG.as_ptr())
    })
}

/// Copies at most `dst_len - 1` bytes of `src` into `dst` and NUL-terminates.
///
/// Returns the number of bytes copied, excluding the terminator.
///
/// # Safety
/// `src` must be valid for `src_len` bytes and `dst` for `dst_len` bytes, and
/// the two regions must not overlap.
#[no_mangle]
pub unsafe extern "C" fn zylix_copy_string(
    src: *const c_char,
    src_len: usize,
    dst: *mut c_char,
    dst_len: usize,
) -> usize {
    if src.is_null() || dst.is_null() || dst_len == 0 {
        return 0;
    }
    let n = src_len.min(dst_len - 1);
    ptr::copy_nonoverlapping(src, dst, n);
    *dst.add(n) = 0;
    n
}

#[no_mangle]
pub extern "C" fn zylix_reset_scratch_arena() {
    guarded("zylix_reset_scratch_arena", (), || {
        if with_core(Core::reset_scratch).is_none() {
            debug!("scratch reset ignored before init");
        }
    })
}
