//! Bounded priority event queue.
//!
//! Payloads are copied into queue-owned storage on push, so callers may reuse
//! their buffers as soon as [`EventQueue::push`] returns. A full queue rejects
//! the newcomer; queued events are never evicted.

use crate::priority::{PQueues, Priority};
use log::warn;
use smallvec::SmallVec;
use std::collections::TryReserveError;
use thiserror::Error;

/// Largest payload accepted per queued event, in bytes.
pub const MAX_PAYLOAD: usize = 256;

/// Queue-owned payload copy. Small payloads stay inline.
pub type Payload = SmallVec<[u8; 32]>;

/// Convenience result alias for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Reasons an event was not accepted into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("payload of {len} bytes exceeds the {max}-byte limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("invalid priority {0} (expected 0-3)")]
    InvalidPriority(u8),

    #[error("event queue full ({capacity} events)")]
    Full { capacity: usize },
}

/// An event waiting in the queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedEvent {
    pub event_type: u32,
    pub priority: Priority,
    pub payload: Payload,
    /// Position in global enqueue order; breaks ties within a priority class.
    pub sequence: u64,
}

/// Fixed-capacity queue draining highest priority first, FIFO within a class.
#[derive(Debug)]
pub struct EventQueue {
    queues: PQueues<QueuedEvent>,
    capacity: usize,
    next_sequence: u64,
}

impl EventQueue {
    /// Creates a queue holding at most `capacity` events across all classes.
    ///
    /// Storage grows as events arrive.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queues: PQueues::new(),
            capacity,
            next_sequence: 0,
        }
    }

    /// Creates a queue and reserves storage for `capacity` events up front,
    /// reporting allocation failure instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            queues: PQueues::try_with_capacity(capacity)?,
            capacity,
            next_sequence: 0,
        })
    }

    /// Copies `payload` into the queue under `priority`.
    ///
    /// Returns the event's enqueue sequence number.
    pub fn push(&mut self, event_type: u32, payload: &[u8], priority: u8) -> QueueResult<u64> {
        if payload.len() > MAX_PAYLOAD {
            return Err(QueueError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD,
            });
        }
        let priority = Priority::from_u8(priority).ok_or(QueueError::InvalidPriority(priority))?;
        if self.is_full() {
            warn!(
                "event queue full ({} events); rejecting {event_type:#06x}",
                self.capacity
            );
            return Err(QueueError::Full {
                capacity: self.capacity,
            });
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queues.enqueue(
            priority,
            QueuedEvent {
                event_type,
                priority,
                payload: Payload::from_slice(payload),
                sequence,
            },
        );
        Ok(sequence)
    }

    /// Removes the next event in drain order.
    pub fn pop_next(&mut self) -> Option<QueuedEvent> {
        self.queues.pop_next()
    }

    /// Number of events waiting.
    pub fn depth(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.depth() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every waiting event without processing it. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        self.queues.clear()
    }
}
