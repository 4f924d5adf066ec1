use crate::error::{CoreError, CoreResult};
use queue::MAX_PAYLOAD;

/// Largest accepted queue capacity, in events.
pub const MAX_QUEUE_CAPACITY: usize = 65_536;
/// Largest accepted scratch arena, in bytes.
pub const MAX_SCRATCH_CAPACITY: usize = 1 << 20;

/// Construction-time parameters for a [`crate::Core`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    /// Maximum number of events waiting in the priority queue.
    pub queue_capacity: usize,
    /// Bytes reserved for the per-dispatch scratch arena.
    pub scratch_capacity: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            scratch_capacity: 4096,
        }
    }
}

impl CoreConfig {
    /// Rejects configurations the core cannot run with.
    ///
    /// The scratch arena must fit one maximal payload so text input never
    /// fails on a fresh cycle.
    pub fn validate(&self) -> CoreResult<()> {
        if self.queue_capacity == 0 {
            return Err(CoreError::InvalidConfig("queue_capacity must be non-zero"));
        }
        if self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(CoreError::InvalidConfig("queue_capacity exceeds 65536 events"));
        }
        if self.scratch_capacity > MAX_SCRATCH_CAPACITY {
            return Err(CoreError::InvalidConfig("scratch_capacity exceeds 1 MiB"));
        }
        if self.scratch_capacity < MAX_PAYLOAD {
            return Err(CoreError::InvalidConfig(
                "scratch_capacity must hold one maximal payload",
            ));
        }
        Ok(())
    }
}
