//! Frame-buffer burst lines, their queue, and the commit state machine that
//! drains the queue into the wide memory write port.

use log::{debug, trace};

use crate::bus::reverse_lanes;
use crate::config::BURST_BEATS;
use crate::fifo::SyncFifo;
use crate::ports::MemoryWritePort;
use crate::QueueError;

/// Per-byte write enables for a whole 128-bit line.
pub const LINE_BYTE_ENABLE: u16 = 0xFFFF;

/// One assembled 128-bit burst-write payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BurstLine {
    /// Translated byte address of the line.
    pub address: u32,
    /// Downstream-order words; word `k` in bits `[32k, 32k+32)`.
    pub data: u128,
}

impl BurstLine {
    /// Memory-port line address.
    #[must_use]
    pub const fn line_address(&self) -> u32 {
        self.address >> 4
    }
}

#[allow(clippy::cast_possible_truncation)]
const BEATS_PER_LINE: u32 = BURST_BEATS as u32;

const BEAT_MASK: u128 = 0xFFFF_FFFF;

fn beat_shift(beat: u8) -> u32 {
    (u32::from(beat) % BEATS_PER_LINE) * 32
}

/// Stores processor beat `beat` into `line` in downstream byte order.
#[must_use]
pub fn insert_beat(line: u128, beat: u8, processor_data: u32) -> u128 {
    let shift = beat_shift(beat);
    let cleared = line & !(BEAT_MASK << shift);
    cleared | (u128::from(reverse_lanes(processor_data)) << shift)
}

/// Extracts processor beat `beat` from a downstream-order `line`.
#[must_use]
pub fn extract_beat(line: u128, beat: u8) -> u32 {
    let word = (line >> beat_shift(beat)) & BEAT_MASK;
    reverse_lanes(u32::try_from(word).unwrap_or(0))
}

/// Queue of assembled lines waiting for the memory port.
pub type BurstWriteQueue = SyncFifo<BurstLine>;

/// States of the burst commit machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CommitState {
    /// Waiting for a queued line and command acceptance.
    #[default]
    Idle,
    /// Command accepted; presenting write data until the port is ready.
    Data,
}

/// Two-state consumer of the [`BurstWriteQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BurstCommitFsm {
    state: CommitState,
}

impl BurstCommitFsm {
    /// Creates the machine in [`CommitState::Idle`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CommitState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CommitState {
        self.state
    }

    /// One system-clock edge. Returns the line retired on this edge.
    ///
    /// # Errors
    ///
    /// Propagates [`QueueError::Empty`] if the queue lost its head while a
    /// command was outstanding.
    pub fn tick(
        &mut self,
        queue: &mut BurstWriteQueue,
        port: &mut dyn MemoryWritePort,
    ) -> Result<Option<BurstLine>, QueueError> {
        match self.state {
            CommitState::Idle => {
                if let Some(line) = queue.peek() {
                    if port.write_command_ready() {
                        port.issue_write(line.line_address());
                        trace!("burst commit: Idle -> Data at {:#010x}", line.address);
                        self.state = CommitState::Data;
                    }
                }
                Ok(None)
            }
            CommitState::Data => {
                let line = *queue.peek().ok_or(QueueError::Empty)?;
                if !port.write_data(line.data, LINE_BYTE_ENABLE) {
                    return Ok(None);
                }
                queue.pop()?;
                trace!("burst commit: Data -> Idle");
                debug!("committed burst line at {:#010x}", line.address);
                self.state = CommitState::Idle;
                Ok(Some(line))
            }
        }
    }

    /// Returns to [`CommitState::Idle`].
    pub fn reset(&mut self) {
        self.state = CommitState::Idle;
    }
}
