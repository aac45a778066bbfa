//! Transaction state machine.
//!
//! The machine is a register set plus one pure transition function. Each
//! processor edge the bridge gathers [`SlaveInputs`] from pre-edge queue
//! status and this edge's downstream responses, calls
//! [`SlaveFsm::transition`], then applies the returned [`SlaveStep`].
//!
//! Transfer start is only sampled in [`SlaveState::Idle`]. Everything a
//! later state needs about the transfer is captured in an [`Admission`];
//! the only line still read after admission is the processor data bus on
//! write beats.

mod state;

pub use state::{Admission, AdmissionKind, SlaveState};

use crate::address::{byte_enable, AddressDecode, ALL_LANES};
use crate::burst::{extract_beat, insert_beat, BurstLine};
use crate::bus::{reverse_lanes, BusResponse, BusSample};
use crate::config::BURST_BEATS;
use crate::ports::ReadRequest;
use crate::write_queue::WriteEntry;

#[allow(clippy::cast_possible_truncation)]
const LAST_BEAT: u8 = BURST_BEATS as u8 - 1;

/// Registers held by the transaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SlaveRegisters {
    /// Current state.
    pub state: SlaveState,
    /// Transaction in progress; `None` only in [`SlaveState::Idle`].
    pub admission: Option<Admission>,
    /// Two-bit beat counter.
    pub beat: u8,
    /// Line buffer for burst assembly and burst read-out, downstream order.
    pub buffer: u128,
    /// A transaction completed on the previous edge; the handshake lines
    /// stay driven inactive for one more cycle.
    pub finishing: bool,
}

/// Everything the transition function may look at for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlaveInputs {
    /// Processor bus lines at this edge.
    pub sample: BusSample,
    /// Decode of `sample.address`.
    pub decode: AddressDecode,
    /// Free slots in the front write queue.
    pub front_free: usize,
    /// The burst write queue can take a line.
    pub burst_queue_writable: bool,
    /// Ordering guard: a write is still in flight somewhere downstream.
    pub writes_pending: bool,
    /// Memory read port command-ready level.
    pub memory_command_ready: bool,
    /// Register-bus read acknowledge with data, when one arrived this edge.
    pub register_read_data: Option<u32>,
    /// Memory read port data, when a line arrived this edge.
    pub memory_read_data: Option<u128>,
}

/// Result of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlaveStep {
    /// Registers after the edge.
    pub next: SlaveRegisters,
    /// Processor-facing lines for this cycle.
    pub response: BusResponse,
    /// Entry to push into the front write queue.
    pub write_entry: Option<WriteEntry>,
    /// Line to push into the burst write queue.
    pub burst_line: Option<BurstLine>,
    /// Memory-port line address whose read command fires on this edge.
    pub memory_read: Option<u32>,
    /// Transaction admitted on this edge.
    pub admitted: Option<AdmissionKind>,
    /// Transaction completed on this edge.
    pub completed: Option<AdmissionKind>,
    /// A delay state could not make progress.
    pub stalled: bool,
}

impl SlaveStep {
    const fn hold(registers: SlaveRegisters) -> Self {
        Self {
            next: registers,
            response: BusResponse::negated(),
            write_entry: None,
            burst_line: None,
            memory_read: None,
            admitted: None,
            completed: None,
            stalled: false,
        }
    }

    fn acknowledge(&mut self, data: Option<u32>, inhibit_burst: bool) {
        self.response = BusResponse::acknowledge(data, inhibit_burst);
    }

    fn advance_beat(&mut self, kind: AdmissionKind) {
        if self.next.beat >= LAST_BEAT {
            self.complete(kind);
        } else {
            self.next.beat += 1;
        }
    }

    fn complete(&mut self, kind: AdmissionKind) {
        self.next.state = SlaveState::Idle;
        self.next.admission = None;
        self.next.beat = 0;
        self.next.finishing = true;
        self.completed = Some(kind);
    }
}

/// MC68040 slave-side transaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlaveFsm {
    registers: SlaveRegisters,
}

impl SlaveFsm {
    /// Creates the machine in [`SlaveState::Idle`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current registers.
    #[must_use]
    pub const fn registers(&self) -> &SlaveRegisters {
        &self.registers
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SlaveState {
        self.registers.state
    }

    /// Register-bus read request held during this edge, if any.
    #[must_use]
    pub const fn register_read_request(&self) -> Option<ReadRequest> {
        match (self.registers.state, self.registers.admission) {
            (SlaveState::Read, Some(admission)) => Some(ReadRequest {
                word_address: admission.address >> 2,
                byte_enable: ALL_LANES,
            }),
            _ => None,
        }
    }

    /// Read-data ready towards the memory read port during this edge.
    #[must_use]
    pub const fn awaiting_memory_data(&self) -> bool {
        matches!(self.registers.state, SlaveState::FrameBurstReadWait)
    }

    /// Latches `next` as the post-edge registers.
    pub fn apply(&mut self, next: SlaveRegisters) {
        self.registers = next;
    }

    /// Returns to reset.
    pub fn reset(&mut self) {
        self.registers = SlaveRegisters::default();
    }

    /// Computes one processor-clock edge without touching `self`.
    #[must_use]
    pub fn transition(&self, inputs: &SlaveInputs) -> SlaveStep {
        let registers = self.registers;
        match (registers.state, registers.admission) {
            (SlaveState::Idle, _) => Self::idle(registers, inputs),
            (state, Some(admission)) => Self::serve(state, admission, registers, inputs),
            (_, None) => {
                let mut step = SlaveStep::hold(SlaveRegisters::default());
                step.response = BusResponse::released();
                step
            }
        }
    }

    fn idle(registers: SlaveRegisters, inputs: &SlaveInputs) -> SlaveStep {
        let mut step = SlaveStep::hold(SlaveRegisters {
            finishing: false,
            ..registers
        });
        if !registers.finishing {
            step.response = BusResponse::released();
        }

        let Some(kind) = AdmissionKind::classify(&inputs.sample, &inputs.decode) else {
            return step;
        };
        let admission = Admission {
            kind,
            address: inputs.decode.translated,
            size: inputs.sample.size,
            byte_enable: byte_enable(inputs.sample.size, inputs.sample.address),
        };
        // Claimed transfers drive the handshake lines from the admission edge.
        step.response = BusResponse::negated();
        step.admitted = Some(kind);
        step.next.admission = Some(admission);
        step.next.beat = 0;
        step.next.state = if kind == AdmissionKind::Write {
            SlaveState::DelayWrite
        } else {
            Self::admit(admission, inputs, &mut step)
        };
        step
    }

    /// Admission test shared by `Idle` and the delay states.
    fn admit(admission: Admission, inputs: &SlaveInputs, step: &mut SlaveStep) -> SlaveState {
        let kind = admission.kind;
        match kind {
            AdmissionKind::FrameBurstWrite if inputs.burst_queue_writable => {
                SlaveState::FrameBurstWrite
            }
            AdmissionKind::FrameBurstRead
                if !inputs.writes_pending && inputs.memory_command_ready =>
            {
                step.memory_read = Some(admission.address >> 4);
                SlaveState::FrameBurstReadWait
            }
            AdmissionKind::BurstWrite if inputs.front_free >= BURST_BEATS => {
                SlaveState::BurstWrite
            }
            AdmissionKind::Read if !inputs.writes_pending => SlaveState::Read,
            _ => kind.delay_state(),
        }
    }

    fn serve(
        state: SlaveState,
        admission: Admission,
        registers: SlaveRegisters,
        inputs: &SlaveInputs,
    ) -> SlaveStep {
        let mut step = SlaveStep::hold(registers);
        let kind = admission.kind;
        let beat_data = reverse_lanes(inputs.sample.data);

        match state {
            SlaveState::DelayRead
            | SlaveState::DelayBurstWrite
            | SlaveState::DelayFrameBurstWrite
            | SlaveState::DelayFrameBurstReadWait => {
                step.next.state = Self::admit(admission, inputs, &mut step);
                step.stalled = step.next.state == state;
            }
            SlaveState::DelayWrite => {
                if inputs.front_free == 0 {
                    step.stalled = true;
                } else {
                    step.write_entry = Some(WriteEntry {
                        address: admission.address,
                        data: beat_data,
                        byte_enable: admission.byte_enable,
                    });
                    step.acknowledge(None, admission.inhibits_burst());
                    step.complete(kind);
                }
            }
            SlaveState::Read => {
                if let Some(data) = inputs.register_read_data {
                    step.acknowledge(Some(reverse_lanes(data)), admission.inhibits_burst());
                    step.complete(kind);
                }
            }
            SlaveState::BurstWrite => {
                if inputs.front_free > 0 {
                    let offset = u32::from(registers.beat) << 2;
                    step.write_entry = Some(WriteEntry {
                        address: admission.address.wrapping_add(offset),
                        data: beat_data,
                        byte_enable: ALL_LANES,
                    });
                    step.acknowledge(None, false);
                    step.advance_beat(kind);
                }
            }
            SlaveState::FrameBurstWrite => {
                let line = insert_beat(registers.buffer, registers.beat, inputs.sample.data);
                step.next.buffer = line;
                step.acknowledge(None, false);
                if registers.beat >= LAST_BEAT {
                    step.burst_line = Some(BurstLine {
                        address: admission.address,
                        data: line,
                    });
                }
                step.advance_beat(kind);
            }
            SlaveState::FrameBurstReadWait => {
                if let Some(line) = inputs.memory_read_data {
                    step.next.buffer = line;
                    step.next.beat = 1;
                    step.next.state = SlaveState::FrameBurstRead;
                    step.acknowledge(Some(extract_beat(line, 0)), false);
                }
            }
            SlaveState::FrameBurstRead => {
                step.acknowledge(Some(extract_beat(registers.buffer, registers.beat)), false);
                step.advance_beat(kind);
            }
            SlaveState::Idle => {}
        }
        step
    }
}
