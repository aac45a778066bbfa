//! Downstream target models over one shared sparse backing store.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use bridge_core::{
    MemoryReadPort, MemoryWritePort, ReadRequest, RegisterReadPort, RegisterWritePort,
    WriteRequest,
};
use log::{trace, warn};

/// Word-addressed sparse store. Unwritten words read as zero.
///
/// Line `n` is words `4n..4n+4`, word `k` of a line in bits `[32k, 32k+32)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseMemory {
    words: BTreeMap<u32, u32>,
}

/// Handle shared by both targets and the testbench.
pub type SharedMemory = Rc<RefCell<SparseMemory>>;

const fn lane_mask(byte_enable: u8) -> u32 {
    let mut mask = 0;
    let mut lane = 0;
    while lane < 4 {
        if byte_enable & (1 << lane) != 0 {
            mask |= 0xFF << (lane * 8);
        }
        lane += 1;
    }
    mask
}

impl SparseMemory {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a new store in a shareable handle.
    #[must_use]
    pub fn shared() -> SharedMemory {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Word at `word_address`.
    #[must_use]
    pub fn read_word(&self, word_address: u32) -> u32 {
        self.words.get(&word_address).copied().unwrap_or(0)
    }

    /// Merges `data` into the lanes enabled by `byte_enable`.
    pub fn write_word(&mut self, word_address: u32, data: u32, byte_enable: u8) {
        let mask = lane_mask(byte_enable);
        let merged = (self.read_word(word_address) & !mask) | (data & mask);
        self.words.insert(word_address, merged);
    }

    /// Line at `line_address`.
    #[must_use]
    pub fn read_line(&self, line_address: u32) -> u128 {
        let base = line_address.wrapping_mul(4);
        (0..4u32).fold(0u128, |line, k| {
            line | (u128::from(self.read_word(base.wrapping_add(k))) << (32 * k))
        })
    }

    /// Merges `data` into the bytes enabled by `byte_enable`.
    pub fn write_line(&mut self, line_address: u32, data: u128, byte_enable: u16) {
        let base = line_address.wrapping_mul(4);
        for k in 0..4u32 {
            let lanes = ((byte_enable >> (4 * k)) & 0xF) as u8;
            if lanes != 0 {
                let word = u32::try_from((data >> (32 * k)) & 0xFFFF_FFFF).unwrap_or(0);
                self.write_word(base.wrapping_add(k), word, lanes);
            }
        }
    }

    /// Number of words ever written.
    #[must_use]
    pub fn populated_words(&self) -> usize {
        self.words.len()
    }
}

/// Register-bus target with fixed acknowledge latencies.
#[derive(Debug, Clone)]
pub struct RegisterTarget {
    memory: SharedMemory,
    read_latency: u32,
    write_latency: u32,
    read_wait: u32,
    write_wait: u32,
    reads_served: u64,
    writes_retired: u64,
}

impl RegisterTarget {
    /// Creates a target acknowledging after the given number of extra edges.
    #[must_use]
    pub const fn new(memory: SharedMemory, read_latency: u32, write_latency: u32) -> Self {
        Self {
            memory,
            read_latency,
            write_latency,
            read_wait: 0,
            write_wait: 0,
            reads_served: 0,
            writes_retired: 0,
        }
    }

    /// Reads acknowledged so far.
    #[must_use]
    pub const fn reads_served(&self) -> u64 {
        self.reads_served
    }

    /// Writes acknowledged so far.
    #[must_use]
    pub const fn writes_retired(&self) -> u64 {
        self.writes_retired
    }
}

impl RegisterReadPort for RegisterTarget {
    fn read_cycle(&mut self, request: ReadRequest) -> Option<u32> {
        if self.read_wait < self.read_latency {
            self.read_wait += 1;
            return None;
        }
        self.read_wait = 0;
        self.reads_served += 1;
        let data = self.memory.borrow().read_word(request.word_address);
        trace!(
            "register read {:#010x} -> {data:#010x}",
            request.word_address
        );
        Some(data)
    }
}

impl RegisterWritePort for RegisterTarget {
    fn write_cycle(&mut self, request: WriteRequest) -> bool {
        if self.write_wait < self.write_latency {
            self.write_wait += 1;
            return false;
        }
        self.write_wait = 0;
        self.writes_retired += 1;
        self.memory
            .borrow_mut()
            .write_word(request.word_address, request.data, request.byte_enable);
        trace!(
            "register write {:#010x} <- {:#010x} sel {:#x}",
            request.word_address,
            request.data,
            request.byte_enable
        );
        true
    }
}

/// Wide memory port target: one outstanding command per port.
#[derive(Debug, Clone)]
pub struct MemoryTarget {
    memory: SharedMemory,
    read_latency: u32,
    write_latency: u32,
    pending_read: Option<(u32, u32)>,
    open_write: Option<u32>,
    write_wait: u32,
    lines_read: u64,
    lines_written: u64,
}

impl MemoryTarget {
    /// Creates a target whose read data arrives `read_latency` edges after
    /// the command and whose write data is accepted after `write_latency`
    /// extra edges.
    #[must_use]
    pub const fn new(memory: SharedMemory, read_latency: u32, write_latency: u32) -> Self {
        Self {
            memory,
            read_latency,
            write_latency,
            pending_read: None,
            open_write: None,
            write_wait: 0,
            lines_read: 0,
            lines_written: 0,
        }
    }

    /// Lines returned on the read port.
    #[must_use]
    pub const fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Lines stored through the write port.
    #[must_use]
    pub const fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// No command outstanding on either port.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.pending_read.is_none() && self.open_write.is_none()
    }
}

impl MemoryReadPort for MemoryTarget {
    fn read_command_ready(&self) -> bool {
        self.pending_read.is_none()
    }

    fn issue_read(&mut self, line_address: u32) {
        if self.pending_read.is_some() {
            warn!("read command {line_address:#010x} issued while another is outstanding");
        }
        self.pending_read = Some((line_address, self.read_latency));
    }

    fn read_data(&mut self) -> Option<u128> {
        match self.pending_read {
            Some((line_address, 0)) => {
                self.pending_read = None;
                self.lines_read += 1;
                Some(self.memory.borrow().read_line(line_address))
            }
            Some((line_address, remaining)) => {
                self.pending_read = Some((line_address, remaining - 1));
                None
            }
            None => None,
        }
    }
}

impl MemoryWritePort for MemoryTarget {
    fn write_command_ready(&self) -> bool {
        self.open_write.is_none()
    }

    fn issue_write(&mut self, line_address: u32) {
        if self.open_write.is_some() {
            warn!("write command {line_address:#010x} issued while another is open");
        }
        self.open_write = Some(line_address);
    }

    fn write_data(&mut self, data: u128, byte_enable: u16) -> bool {
        let Some(line_address) = self.open_write else {
            warn!("write data presented without a command");
            return false;
        };
        if self.write_wait < self.write_latency {
            self.write_wait += 1;
            return false;
        }
        self.write_wait = 0;
        self.open_write = None;
        self.lines_written += 1;
        self.memory
            .borrow_mut()
            .write_line(line_address, data, byte_enable);
        trace!("memory line {line_address:#010x} <- {data:#034x}");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryTarget, RegisterTarget, SparseMemory};
    use bridge_core::{
        MemoryReadPort, MemoryWritePort, ReadRequest, RegisterReadPort, RegisterWritePort,
        WriteRequest,
    };

    #[test]
    fn partial_writes_merge_lanes() {
        let mut memory = SparseMemory::new();
        memory.write_word(4, 0xAABB_CCDD, 0xF);
        memory.write_word(4, 0x1122_3344, 0b0101);
        assert_eq!(memory.read_word(4), 0xAA22_CC44);
        assert_eq!(memory.read_word(5), 0);
    }

    #[test]
    fn lines_and_words_share_storage() {
        let mut memory = SparseMemory::new();
        memory.write_line(2, (4u128 << 96) | 1, 0xFFFF);
        assert_eq!(memory.read_word(8), 1);
        assert_eq!(memory.read_word(11), 4);
        memory.write_word(9, 7, 0xF);
        assert_eq!((memory.read_line(2) >> 32) & 0xFFFF_FFFF, 7);
    }

    #[test]
    fn register_target_honours_latency() {
        let memory = SparseMemory::shared();
        let mut target = RegisterTarget::new(memory.clone(), 1, 2);
        let write = WriteRequest {
            word_address: 3,
            data: 9,
            byte_enable: 0xF,
        };
        assert!(!target.write_cycle(write));
        assert!(!target.write_cycle(write));
        assert!(target.write_cycle(write));
        assert_eq!(memory.borrow().read_word(3), 9);

        let read = ReadRequest {
            word_address: 3,
            byte_enable: 0xF,
        };
        assert_eq!(target.read_cycle(read), None);
        assert_eq!(target.read_cycle(read), Some(9));
        assert_eq!(target.reads_served(), 1);
        assert_eq!(target.writes_retired(), 1);
    }

    #[test]
    fn memory_target_serialises_commands() {
        let memory = SparseMemory::shared();
        let mut target = MemoryTarget::new(memory, 1, 0);
        assert!(target.write_command_ready());
        target.issue_write(5);
        assert!(!target.write_command_ready());
        assert!(target.write_data(0xABCD, 0xFFFF));
        assert!(target.is_idle());

        target.issue_read(5);
        assert!(!target.read_command_ready());
        assert_eq!(target.read_data(), None);
        assert_eq!(target.read_data(), Some(0xABCD));
        assert_eq!(target.lines_read(), 1);
        assert_eq!(target.lines_written(), 1);
    }
}
