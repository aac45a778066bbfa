//! Single-clock FIFO with first-word-fall-through reads.

use std::collections::VecDeque;

use crate::QueueError;

/// Bounded FIFO whose producer and consumer share one clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFifo<T> {
    entries: VecDeque<T>,
    depth: usize,
}

impl<T> SyncFifo<T> {
    /// Creates an empty FIFO holding at most `depth` entries.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(depth),
            depth,
        }
    }

    /// Capacity.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Entries currently held.
    #[must_use]
    pub fn level(&self) -> usize {
        self.entries.len()
    }

    /// Free slots.
    #[must_use]
    pub fn free(&self) -> usize {
        self.depth - self.entries.len()
    }

    /// At least one free slot.
    #[must_use]
    pub fn writable(&self) -> bool {
        self.entries.len() < self.depth
    }

    /// At least one entry.
    #[must_use]
    pub fn readable(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Head entry without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Appends `value`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] when no slot is free; `value` is dropped.
    pub fn push(&mut self, value: T) -> Result<(), QueueError> {
        if !self.writable() {
            return Err(QueueError::Full { depth: self.depth });
        }
        self.entries.push_back(value);
        Ok(())
    }

    /// Removes the head entry.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] when nothing is readable.
    pub fn pop(&mut self) -> Result<T, QueueError> {
        self.entries.pop_front().ok_or(QueueError::Empty)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
