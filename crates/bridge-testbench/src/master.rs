//! MC68040 bus master model.
//!
//! The master drives one transfer at a time: transfer start for a single
//! cycle, transfer-in-progress for the whole transfer, address, size and
//! direction held stable, and write beat `k` on the data bus until the
//! `k`-th acknowledge. A line transfer whose first acknowledge carries
//! burst inhibit is finished as three further long-word transfers.

use std::collections::VecDeque;

use bridge_core::{BusResponse, BusSample, Direction, TransferSize, BURST_BEATS};
use log::debug;
use thiserror::Error;

/// `TT` value for a normal access.
pub const TT_NORMAL: u8 = 0b00;
/// `TM` value for supervisor data space.
pub const TM_SUPERVISOR_DATA: u8 = 0b101;

/// One transfer requested from the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transfer {
    /// Byte, word or long-word read.
    Read {
        /// Byte address.
        address: u32,
        /// Operand size; [`TransferSize::Line`] behaves as a line read.
        size: TransferSize,
    },
    /// Byte, word or long-word write. `data` is positioned on the lanes the
    /// processor would use for `address`.
    Write {
        /// Byte address.
        address: u32,
        /// Operand size.
        size: TransferSize,
        /// Data bus value.
        data: u32,
    },
    /// Four-beat line read.
    LineRead {
        /// Line address; the low four bits are ignored.
        address: u32,
    },
    /// Four-beat line write.
    LineWrite {
        /// Line address; the low four bits are ignored.
        address: u32,
        /// Beats in bus order.
        data: [u32; BURST_BEATS],
    },
}

impl Transfer {
    const fn direction(&self) -> Direction {
        match self {
            Self::Read { .. } | Self::LineRead { .. } => Direction::Read,
            Self::Write { .. } | Self::LineWrite { .. } => Direction::Write,
        }
    }

    const fn size(&self) -> TransferSize {
        match self {
            Self::Read { size, .. } | Self::Write { size, .. } => *size,
            Self::LineRead { .. } | Self::LineWrite { .. } => TransferSize::Line,
        }
    }

    /// Address presented with transfer start.
    #[must_use]
    pub const fn address(&self) -> u32 {
        match self {
            Self::Read { address, size } => {
                if matches!(size, TransferSize::Line) {
                    *address & !0xF
                } else {
                    *address
                }
            }
            Self::Write { address, .. } => *address,
            Self::LineRead { address } | Self::LineWrite { address, .. } => *address & !0xF,
        }
    }

    /// Acknowledged beats needed to finish.
    #[must_use]
    pub const fn beats(&self) -> usize {
        if matches!(self.size(), TransferSize::Line) {
            BURST_BEATS
        } else {
            1
        }
    }

    const fn beat_data(&self, beat: usize) -> u32 {
        match self {
            Self::Write { data, .. } => *data,
            Self::LineWrite { data, .. } => data[beat % BURST_BEATS],
            Self::Read { .. } | Self::LineRead { .. } => 0,
        }
    }
}

/// A finished transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Completion {
    /// The transfer as submitted.
    pub transfer: Transfer,
    /// Data bus value at each read acknowledge; empty for writes.
    pub data: Vec<u32>,
    /// The line was finished as long-word transfers after burst inhibit.
    pub burst_inhibited: bool,
    /// Processor cycles from transfer start to the last acknowledge.
    pub cycles: u64,
}

/// Bus errors seen by the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MasterError {
    /// Transfer error acknowledge terminated a transfer.
    #[error("bus error at {address:#010x}")]
    BusError {
        /// Address of the failed transfer.
        address: u32,
    },
    /// Transfer acknowledge arrived with no transfer in progress.
    #[error("acknowledge with no transfer in progress")]
    UnexpectedAcknowledge,
    /// A read acknowledge left the data bus floating.
    #[error("read acknowledge at {address:#010x} without data")]
    MissingReadData {
        /// Address of the read.
        address: u32,
    },
}

#[derive(Debug, Clone)]
struct Active {
    transfer: Transfer,
    beat: usize,
    start_pending: bool,
    inhibited: bool,
    data: Vec<u32>,
    cycles: u64,
}

impl Active {
    fn address(&self) -> u32 {
        let base = self.transfer.address();
        if self.inhibited {
            let beat = u32::try_from(self.beat).unwrap_or(0);
            base.wrapping_add(4 * beat)
        } else {
            base
        }
    }

    const fn size(&self) -> TransferSize {
        if self.inhibited {
            TransferSize::Long
        } else {
            self.transfer.size()
        }
    }
}

/// Cycle-level processor bus master.
#[derive(Debug, Clone, Default)]
pub struct BusMaster {
    queue: VecDeque<Transfer>,
    active: Option<Active>,
}

impl BusMaster {
    /// Creates an idle master.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `transfer` behind any already submitted.
    pub fn submit(&mut self, transfer: Transfer) {
        self.queue.push_back(transfer);
    }

    /// No transfer active or queued.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    /// Bus lines for the coming processor edge. Starts the next queued
    /// transfer when idle.
    pub fn drive(&mut self) -> BusSample {
        if self.active.is_none() {
            self.active = self.queue.pop_front().map(|transfer| Active {
                transfer,
                beat: 0,
                start_pending: true,
                inhibited: false,
                data: Vec::with_capacity(transfer.beats()),
                cycles: 0,
            });
        }
        let Some(active) = &self.active else {
            return BusSample::default();
        };
        BusSample {
            address: active.address(),
            data: active.transfer.beat_data(active.beat),
            direction: active.transfer.direction(),
            size: active.size().code(),
            transfer_start: active.start_pending,
            transfer_type: TT_NORMAL,
            transfer_modifier: TM_SUPERVISOR_DATA,
            memory_inhibit: false,
            transfer_in_progress: true,
        }
    }

    /// Samples the bridge response at the end of the cycle.
    ///
    /// # Errors
    ///
    /// Returns [`MasterError`] on error acknowledge, on an acknowledge with no
    /// transfer in progress, or on a read acknowledge without data.
    pub fn observe(&mut self, response: &BusResponse) -> Result<Option<Completion>, MasterError> {
        let acknowledged = response.transfer_ack.is_asserted();
        let Some(active) = self.active.as_mut() else {
            if acknowledged {
                return Err(MasterError::UnexpectedAcknowledge);
            }
            return Ok(None);
        };
        active.cycles += 1;
        active.start_pending = false;

        if response.error_ack.is_asserted() {
            let address = active.address();
            self.active = None;
            return Err(MasterError::BusError { address });
        }
        if !acknowledged {
            return Ok(None);
        }

        if matches!(active.transfer.direction(), Direction::Read) {
            let data = response.data.ok_or(MasterError::MissingReadData {
                address: active.address(),
            })?;
            active.data.push(data);
        }
        if active.beat == 0
            && active.transfer.beats() > 1
            && response.burst_inhibit.is_asserted()
        {
            active.inhibited = true;
        }
        active.beat += 1;
        if active.inhibited {
            active.start_pending = true;
        }

        if active.beat < active.transfer.beats() {
            return Ok(None);
        }
        let Some(done) = self.active.take() else {
            return Ok(None);
        };
        debug!(
            "master completed {:?} in {} cycles",
            done.transfer, done.cycles
        );
        Ok(Some(Completion {
            transfer: done.transfer,
            data: done.data,
            burst_inhibited: done.inhibited,
            cycles: done.cycles,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{BusMaster, MasterError, Transfer};
    use bridge_core::{BusResponse, Direction, Line, TransferSize};

    #[test]
    fn transfer_start_lasts_one_cycle() {
        let mut master = BusMaster::new();
        master.submit(Transfer::Write {
            address: 0xFE00_0004,
            size: TransferSize::Long,
            data: 5,
        });
        let first = master.drive();
        assert!(first.transfer_start);
        assert!(first.transfer_in_progress);
        assert_eq!(first.direction, Direction::Write);
        assert_eq!(master.observe(&BusResponse::released()), Ok(None));

        let second = master.drive();
        assert!(!second.transfer_start);
        assert_eq!(second.address, first.address);
        assert_eq!(second.data, 5);

        let done = master
            .observe(&BusResponse::acknowledge(None, false))
            .expect("no error")
            .expect("completed");
        assert_eq!(done.cycles, 2);
        assert!(master.is_idle());
        assert!(!master.drive().transfer_in_progress);
    }

    #[test]
    fn burst_inhibit_splits_line_into_long_words() {
        let mut master = BusMaster::new();
        master.submit(Transfer::LineRead {
            address: 0xFE80_0013,
        });
        let first = master.drive();
        assert_eq!(first.address, 0xFE80_0010);
        assert_eq!(first.size, 3);
        master
            .observe(&BusResponse::acknowledge(Some(1), true))
            .expect("first beat");

        for beat in 1..4u32 {
            let sample = master.drive();
            assert!(sample.transfer_start);
            assert_eq!(sample.size, 0);
            assert_eq!(sample.address, 0xFE80_0010 + 4 * beat);
            let done = master
                .observe(&BusResponse::acknowledge(Some(beat + 1), false))
                .expect("beat");
            assert_eq!(done.is_some(), beat == 3);
            if let Some(done) = done {
                assert!(done.burst_inhibited);
                assert_eq!(done.data, vec![1, 2, 3, 4]);
            }
        }
    }

    #[test]
    fn acknowledge_while_idle_is_a_protocol_error() {
        let mut master = BusMaster::new();
        let _ = master.drive();
        assert_eq!(
            master.observe(&BusResponse::acknowledge(None, false)),
            Err(MasterError::UnexpectedAcknowledge)
        );
    }

    #[test]
    fn error_acknowledge_aborts_transfer() {
        let mut master = BusMaster::new();
        master.submit(Transfer::Read {
            address: 0xFE00_0000,
            size: TransferSize::Byte,
        });
        let _ = master.drive();
        let response = BusResponse {
            error_ack: Line::Asserted,
            ..BusResponse::negated()
        };
        assert_eq!(
            master.observe(&response),
            Err(MasterError::BusError {
                address: 0xFE00_0000
            })
        );
        assert!(master.is_idle());
    }
}
