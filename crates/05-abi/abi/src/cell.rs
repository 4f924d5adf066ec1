use std::cell::UnsafeCell;

/// Process-wide slot for state that is only ever touched from the host's UI thread.
pub(crate) struct SingleThreadCell<T> {
    value: UnsafeCell<T>,
}

// SAFETY: The exported API is documented as not thread-safe; hosts call every entry
// point from one logical thread, so the cell is never accessed concurrently.
unsafe impl<T> Send for SingleThreadCell<T> {}
// SAFETY: Same as Send. Sharing the static is sound as long as only one thread calls
// `with` or `with_mut` at a time, which the single-thread contract guarantees.
unsafe impl<T> Sync for SingleThreadCell<T> {}

impl<T> SingleThreadCell<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        // SAFETY: No mutable borrow is live; entry points do not re-enter each other.
        unsafe { f(&*self.value.get()) }
    }

    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        // SAFETY: Single-threaded access and no re-entrancy mean this is the only
        // borrow of the value for the duration of `f`.
        unsafe { f(&mut *self.value.get()) }
    }
}
