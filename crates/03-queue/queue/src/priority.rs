use std::collections::{TryReserveError, VecDeque};

/// Number of priority classes.
pub const PRIORITY_LEVELS: usize = 4;

/// Priority class for queued events (`Immediate` drains first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    /// Processed last.
    Low = 0,
    /// Default class for ordinary input.
    Normal = 1,
    High = 2,
    /// Processed before everything else in the batch.
    Immediate = 3,
}

impl Priority {
    /// Classes in drain order.
    pub const DESCENDING: [Priority; PRIORITY_LEVELS] = [
        Priority::Immediate,
        Priority::High,
        Priority::Normal,
        Priority::Low,
    ];

    /// Decodes a wire priority; values above 3 are rejected.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Priority::Low),
            1 => Some(Priority::Normal),
            2 => Some(Priority::High),
            3 => Some(Priority::Immediate),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Fixed set of priority queues (Immediate ≻ High ≻ Normal ≻ Low) with O(1) enqueue/dequeue.
#[derive(Debug)]
pub struct PQueues<T> {
    buckets: [VecDeque<T>; PRIORITY_LEVELS],
}

impl<T> Default for PQueues<T> {
    fn default() -> Self {
        Self {
            buckets: std::array::from_fn(|_| VecDeque::new()),
        }
    }
}

impl<T> PQueues<T> {
    /// Creates empty priority queues with default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates empty priority queues with room for `total` items spread
    /// evenly across the buckets. Buckets still grow on demand.
    pub fn try_with_capacity(total: usize) -> Result<Self, TryReserveError> {
        let mut queues = Self::new();
        let share = total.div_ceil(PRIORITY_LEVELS);
        for bucket in &mut queues.buckets {
            bucket.try_reserve(share)?;
        }
        Ok(queues)
    }

    /// Returns `true` when all priority queues are empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(VecDeque::is_empty)
    }

    /// Total number of queued items.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(VecDeque::len).sum()
    }

    /// Returns the number of items in each bucket ordered as [Low, Normal, High, Immediate].
    pub fn len_per_priority(&self) -> [usize; PRIORITY_LEVELS] {
        std::array::from_fn(|i| self.buckets[i].len())
    }

    /// Enqueues `item` at the back of the queue matching `priority`.
    pub fn enqueue(&mut self, priority: Priority, item: T) {
        self.buckets[priority.index()].push_back(item);
    }

    /// Pops the next item, highest class first and FIFO within a class.
    pub fn pop_next(&mut self) -> Option<T> {
        let priority = self.current_priority()?;
        self.buckets[priority.index()].pop_front()
    }

    /// Returns the highest priority bucket that currently has items.
    pub fn current_priority(&self) -> Option<Priority> {
        Priority::DESCENDING
            .into_iter()
            .find(|p| !self.buckets[p.index()].is_empty())
    }

    /// Removes every queued item, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.len();
        self.buckets.iter_mut().for_each(VecDeque::clear);
        dropped
    }
}
