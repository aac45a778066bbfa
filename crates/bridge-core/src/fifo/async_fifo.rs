//! Dual-clock FIFO.
//!
//! Both pointers are binary counters one bit wider than the index, so
//! full and empty are told apart without a spare slot. Each pointer crosses
//! to the other domain gray coded through a [`Synchronizer`], which means a
//! side only learns about the other side's progress two of its own edges
//! later. Status is therefore conservative: the writer may see the queue
//! fuller than it is and the reader may see it emptier, never the reverse.

use super::cdc::{gray_decode, gray_encode, Synchronizer};
use crate::QueueError;

/// FIFO with a write-clock side and a read-clock side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncFifo<T> {
    slots: Vec<Option<T>>,
    pointer_mask: usize,
    write_ptr: usize,
    read_ptr: usize,
    read_ptr_in_write_domain: Synchronizer<usize>,
    write_ptr_in_read_domain: Synchronizer<usize>,
}

impl<T> AsyncFifo<T> {
    /// Creates an empty FIFO.
    ///
    /// Gray-coded pointers need a power-of-two depth, so `depth` is rounded
    /// up to one; zero becomes a single slot.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1).next_power_of_two();
        let mut slots = Vec::with_capacity(depth);
        slots.resize_with(depth, || None);
        Self {
            slots,
            pointer_mask: depth * 2 - 1,
            write_ptr: 0,
            read_ptr: 0,
            read_ptr_in_write_domain: Synchronizer::new(0),
            write_ptr_in_read_domain: Synchronizer::new(0),
        }
    }

    /// Capacity.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    const fn index(&self, ptr: usize) -> usize {
        ptr & (self.pointer_mask >> 1)
    }

    const fn distance(&self, from: usize, to: usize) -> usize {
        to.wrapping_sub(from) & self.pointer_mask
    }

    fn synced_read_ptr(&self) -> usize {
        gray_decode(self.read_ptr_in_write_domain.output())
    }

    fn synced_write_ptr(&self) -> usize {
        gray_decode(self.write_ptr_in_read_domain.output())
    }

    // Write domain.

    /// Entries the writer believes are held.
    #[must_use]
    pub fn write_level(&self) -> usize {
        self.distance(self.synced_read_ptr(), self.write_ptr)
    }

    /// Writer-side view of at least one free slot.
    #[must_use]
    pub fn writable(&self) -> bool {
        self.write_level() < self.depth()
    }

    /// Writer-side view of any entry not yet retired by the reader.
    #[must_use]
    pub fn pending(&self) -> bool {
        self.write_level() != 0
    }

    /// Stores `value` at the write pointer.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] when the writer sees no free slot.
    pub fn push(&mut self, value: T) -> Result<(), QueueError> {
        if !self.writable() {
            return Err(QueueError::Full {
                depth: self.depth(),
            });
        }
        let index = self.index(self.write_ptr);
        self.slots[index] = Some(value);
        self.write_ptr = (self.write_ptr + 1) & self.pointer_mask;
        Ok(())
    }

    /// Write-clock edge: samples the gray read pointer.
    pub fn tick_write_clock(&mut self) {
        self.read_ptr_in_write_domain
            .tick(gray_encode(self.read_ptr));
    }

    // Read domain.

    /// Entries the reader believes are held.
    #[must_use]
    pub fn read_level(&self) -> usize {
        self.distance(self.read_ptr, self.synced_write_ptr())
    }

    /// Reader-side view of at least one entry.
    #[must_use]
    pub fn readable(&self) -> bool {
        self.read_level() != 0
    }

    /// Head entry, if the reader can see one.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        if self.readable() {
            self.slots[self.index(self.read_ptr)].as_ref()
        } else {
            None
        }
    }

    /// Removes the head entry.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] when the reader sees nothing.
    pub fn pop(&mut self) -> Result<T, QueueError> {
        if !self.readable() {
            return Err(QueueError::Empty);
        }
        let index = self.index(self.read_ptr);
        let value = self.slots[index].take().ok_or(QueueError::Empty)?;
        self.read_ptr = (self.read_ptr + 1) & self.pointer_mask;
        Ok(value)
    }

    /// Read-clock edge: samples the gray write pointer.
    pub fn tick_read_clock(&mut self) {
        self.write_ptr_in_read_domain
            .tick(gray_encode(self.write_ptr));
    }

    /// Entries physically stored, regardless of either side's view.
    #[must_use]
    pub fn occupancy(&self) -> usize {
        self.distance(self.read_ptr, self.write_ptr)
    }

    /// Empties the FIFO and both synchronizers.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.write_ptr = 0;
        self.read_ptr = 0;
        self.read_ptr_in_write_domain.reset(0);
        self.write_ptr_in_read_domain.reset(0);
    }
}
