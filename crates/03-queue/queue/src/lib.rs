//! Priority event queue buffering host events in front of the dispatcher.

/// Priority classes and the per-class FIFO buckets.
pub mod priority;
/// Bounded queue of payload-owning events.
pub mod queue;

pub use crate::priority::{PQueues, Priority, PRIORITY_LEVELS};
pub use crate::queue::{EventQueue, Payload, QueueError, QueueResult, QueuedEvent, MAX_PAYLOAD};
