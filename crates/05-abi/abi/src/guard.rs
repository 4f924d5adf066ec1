use log::error;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Runs an entry point body, converting a panic into `fallback`.
///
/// Unwinding into a foreign runtime is undefined behavior, so every exported
/// function goes through here.
pub(crate) fn guarded<R>(entry: &'static str, fallback: R, body: impl FnOnce() -> R) -> R {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(payload) => {
            error!("panic in {entry}: {}", panic_message(payload.as_ref()));
            fallback
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
