//! Register-bus write path: a processor-clock front FIFO chained to a
//! dual-clock back FIFO drained by the register-bus write side.

use crate::fifo::{AsyncFifo, SyncFifo};
use crate::ports::{RegisterWritePort, WriteRequest};
use crate::QueueError;

/// One queued register-bus write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WriteEntry {
    /// Translated byte address.
    pub address: u32,
    /// Data in downstream byte order.
    pub data: u32,
    /// Byte-lane enables.
    pub byte_enable: u8,
}

impl WriteEntry {
    /// Register-bus request for this entry.
    #[must_use]
    pub const fn request(&self) -> WriteRequest {
        WriteRequest {
            word_address: self.address >> 2,
            data: self.data,
            byte_enable: self.byte_enable,
        }
    }

    const fn inverted(self) -> Self {
        Self {
            address: !self.address,
            data: !self.data,
            byte_enable: self.byte_enable,
        }
    }
}

/// Front and back write stages with the straight-through coupling between
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossDomainWriteQueue {
    front: SyncFifo<WriteEntry>,
    back: AsyncFifo<WriteEntry>,
    invert_crossing_data: bool,
}

impl CrossDomainWriteQueue {
    /// Creates empty stages. `back_depth` is rounded up as by
    /// [`AsyncFifo::new`].
    #[must_use]
    pub fn new(front_depth: usize, back_depth: usize, invert_crossing_data: bool) -> Self {
        Self {
            front: SyncFifo::new(front_depth),
            back: AsyncFifo::new(back_depth),
            invert_crossing_data,
        }
    }

    /// Free front slots, as seen by the processor domain.
    #[must_use]
    pub fn front_free(&self) -> usize {
        self.front.free()
    }

    /// Any entry the register bus has not yet acknowledged, as far as the
    /// processor domain can tell.
    #[must_use]
    pub fn pending(&self) -> bool {
        self.front.readable() || self.back.pending()
    }

    /// Entries physically held by both stages.
    #[must_use]
    pub fn occupancy(&self) -> usize {
        self.front.level() + self.back.occupancy()
    }

    /// Processor-clock edge: moves the front head across when the back stage
    /// has room, then stores `push` in the front stage.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] when `push` finds the front stage full.
    pub fn clock_cpu(&mut self, push: Option<WriteEntry>) -> Result<(), QueueError> {
        if self.front.readable() && self.back.writable() {
            let stored = self.front.pop()?;
            let entry = if self.invert_crossing_data {
                stored.inverted()
            } else {
                stored
            };
            self.back.push(entry)?;
        }
        self.back.tick_write_clock();

        if let Some(entry) = push {
            let stored = if self.invert_crossing_data {
                entry.inverted()
            } else {
                entry
            };
            self.front.push(stored)?;
        }
        Ok(())
    }

    /// System-clock edge: holds a write cycle for the back head and retires
    /// it on acknowledge.
    ///
    /// # Errors
    ///
    /// Propagates a [`QueueError`] from the back stage, which only a
    /// sequencing bug can produce.
    pub fn clock_sys(
        &mut self,
        port: &mut dyn RegisterWritePort,
    ) -> Result<Option<WriteEntry>, QueueError> {
        let mut retired = None;
        if let Some(&entry) = self.back.peek() {
            if port.write_cycle(entry.request()) {
                retired = Some(self.back.pop()?);
            }
        }
        self.back.tick_read_clock();
        Ok(retired)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.front.clear();
        self.back.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{CrossDomainWriteQueue, WriteEntry};
    use crate::ports::{RegisterWritePort, WriteRequest};
    use crate::QueueError;

    #[derive(Default)]
    struct Recorder {
        accepted: Vec<WriteRequest>,
        refuse: bool,
    }

    impl RegisterWritePort for Recorder {
        fn write_cycle(&mut self, request: WriteRequest) -> bool {
            if self.refuse {
                return false;
            }
            self.accepted.push(request);
            true
        }
    }

    fn entry(n: u32) -> WriteEntry {
        WriteEntry {
            address: 0x8F80_0000 + n * 4,
            data: n,
            byte_enable: 0xF,
        }
    }

    fn run(queue: &mut CrossDomainWriteQueue, port: &mut Recorder, cycles: usize) {
        for _ in 0..cycles {
            queue.clock_cpu(None).expect("cpu edge");
            queue.clock_sys(port).expect("sys edge");
        }
    }

    #[test]
    fn entries_retire_in_order() {
        for invert in [false, true] {
            let mut queue = CrossDomainWriteQueue::new(8, 32, invert);
            let mut port = Recorder::default();
            for n in 0..4 {
                queue.clock_cpu(Some(entry(n))).expect("push");
            }
            run(&mut queue, &mut port, 16);

            let expected: Vec<_> = (0..4).map(|n| entry(n).request()).collect();
            assert_eq!(port.accepted, expected, "invert={invert}");
            assert!(!queue.pending());
            assert_eq!(queue.occupancy(), 0);
        }
    }

    #[test]
    fn zero_back_depth_still_carries_writes() {
        let mut queue = CrossDomainWriteQueue::new(4, 0, false);
        let mut port = Recorder::default();
        for n in 0..3 {
            queue.clock_cpu(Some(entry(n))).expect("push");
        }
        run(&mut queue, &mut port, 24);

        let expected: Vec<_> = (0..3).map(|n| entry(n).request()).collect();
        assert_eq!(port.accepted, expected);
        assert!(!queue.pending());
    }

    #[test]
    fn pending_holds_until_acknowledge_crosses_back() {
        let mut queue = CrossDomainWriteQueue::new(8, 32, false);
        let mut port = Recorder {
            refuse: true,
            ..Recorder::default()
        };
        queue.clock_cpu(Some(entry(1))).expect("push");
        run(&mut queue, &mut port, 10);
        assert!(queue.pending());
        assert_eq!(queue.front_free(), 8);

        port.refuse = false;
        queue.clock_sys(&mut port).expect("ack");
        assert_eq!(queue.occupancy(), 0);
        assert!(queue.pending());
        run(&mut queue, &mut port, 2);
        assert!(!queue.pending());
    }

    #[test]
    fn full_front_refuses_push() {
        let mut queue = CrossDomainWriteQueue::new(4, 2, false);
        for n in 0..4 {
            queue.clock_cpu(Some(entry(n))).expect("push");
        }
        // Two entries moved into the back stage along the way.
        assert_eq!(queue.front_free(), 2);
        queue.clock_cpu(Some(entry(4))).expect("push");
        queue.clock_cpu(Some(entry(5))).expect("push");
        assert_eq!(queue.front_free(), 0);
        assert_eq!(
            queue.clock_cpu(Some(entry(6))),
            Err(QueueError::Full { depth: 4 })
        );
    }
}
