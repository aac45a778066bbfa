//! Top-level bridge: owns every stateful block and exposes one tick per
//! clock domain.

use log::{debug, error, trace};

use crate::address::AddressDecoder;
use crate::burst::{BurstCommitFsm, BurstWriteQueue, CommitState};
use crate::bus::{BusResponse, BusSample};
use crate::config::BridgeConfig;
use crate::ports::{MemoryReadPort, MemoryWritePort, RegisterReadPort, RegisterWritePort};
use crate::slave::{SlaveFsm, SlaveInputs, SlaveRegisters, SlaveState, SlaveStep};
use crate::stats::BridgeStats;
use crate::write_queue::CrossDomainWriteQueue;
use crate::ConfigError;

/// MC68040 to register bus and wide memory port bridge.
///
/// [`Bridge::tick_cpu`] and [`Bridge::tick_sys`] each model one rising edge
/// of their clock. Callers interleave them in edge order; the two domains
/// only observe each other through the queues and their synchronizers.
#[derive(Debug, Clone)]
pub struct Bridge {
    config: BridgeConfig,
    decoder: AddressDecoder,
    slave: SlaveFsm,
    write_queue: CrossDomainWriteQueue,
    burst_queue: BurstWriteQueue,
    commit: BurstCommitFsm,
    stats: BridgeStats,
}

impl Bridge {
    /// Builds a bridge in its reset state.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`BridgeConfig::validate`].
    pub fn new(config: BridgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            decoder: AddressDecoder::new(config.memory_window_enabled),
            slave: SlaveFsm::new(),
            write_queue: CrossDomainWriteQueue::new(
                config.front_queue_depth,
                config.back_queue_depth,
                config.invert_crossing_data,
            ),
            burst_queue: BurstWriteQueue::new(config.burst_queue_depth),
            commit: BurstCommitFsm::new(),
            stats: BridgeStats::default(),
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Activity counters.
    #[must_use]
    pub const fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Transaction state machine state.
    #[must_use]
    pub const fn slave_state(&self) -> SlaveState {
        self.slave.state()
    }

    /// Transaction state machine registers.
    #[must_use]
    pub const fn slave_registers(&self) -> &SlaveRegisters {
        self.slave.registers()
    }

    /// Burst commit state machine state.
    #[must_use]
    pub const fn commit_state(&self) -> CommitState {
        self.commit.state()
    }

    /// Ordering guard as seen by the processor domain: a register write or
    /// a burst line has not retired yet.
    #[must_use]
    pub fn writes_pending(&self) -> bool {
        self.write_queue.pending() || self.burst_queue.readable()
    }

    /// Register-bus writes physically queued in either stage.
    #[must_use]
    pub fn queued_writes(&self) -> usize {
        self.write_queue.occupancy()
    }

    /// Burst lines waiting for the memory port.
    #[must_use]
    pub fn queued_lines(&self) -> usize {
        self.burst_queue.level()
    }

    /// No transaction in progress and nothing left to retire downstream.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.slave.state() == SlaveState::Idle
            && !self.slave.registers().finishing
            && !self.writes_pending()
            && self.commit.state() == CommitState::Idle
    }

    /// Returns every block to reset and clears the counters.
    pub fn reset(&mut self) {
        self.slave.reset();
        self.write_queue.clear();
        self.burst_queue.clear();
        self.commit.reset();
        self.stats = BridgeStats::default();
    }

    /// One processor-clock edge.
    pub fn tick_cpu(
        &mut self,
        sample: &BusSample,
        register_read: &mut dyn RegisterReadPort,
        memory_read: &mut dyn MemoryReadPort,
    ) -> BusResponse {
        let register_read_data = self
            .slave
            .register_read_request()
            .and_then(|request| register_read.read_cycle(request));
        let memory_read_data = if self.slave.awaiting_memory_data() {
            memory_read.read_data()
        } else {
            None
        };

        let inputs = SlaveInputs {
            sample: *sample,
            decode: self.decoder.decode(sample),
            front_free: self.write_queue.front_free(),
            burst_queue_writable: self.burst_queue.writable(),
            writes_pending: self.writes_pending(),
            memory_command_ready: memory_read.read_command_ready(),
            register_read_data,
            memory_read_data,
        };
        let step = self.slave.transition(&inputs);

        if let Some(line_address) = step.memory_read {
            memory_read.issue_read(line_address);
            self.stats.record_memory_read();
        }
        self.commit_step(&step);
        step.response
    }

    fn commit_step(&mut self, step: &SlaveStep) {
        if let Some(kind) = step.admitted {
            debug!(
                "admitted {kind:?} at {:#010x}",
                step.next.admission.map_or(0, |admission| admission.address)
            );
            self.stats.record_admission(kind);
        }
        if step.stalled {
            self.stats.record_stall();
        }

        if let Err(err) = self.write_queue.clock_cpu(step.write_entry) {
            error!("write entry {:?} lost: {err}", step.write_entry);
            self.stats.record_overflow();
        } else if step.write_entry.is_some() {
            self.stats.record_write_entry();
        }

        if let Some(line) = step.burst_line {
            match self.burst_queue.push(line) {
                Ok(()) => self.stats.record_burst_line(),
                Err(err) => {
                    error!("burst line at {:#010x} lost: {err}", line.address);
                    self.stats.record_overflow();
                }
            }
        }

        if step.response.transfer_ack.is_asserted() {
            self.stats.record_acknowledge();
        }
        if let Some(kind) = step.completed {
            debug!("completed {kind:?}");
        }

        let previous = self.slave.state();
        if previous != step.next.state {
            trace!("slave: {previous:?} -> {:?}", step.next.state);
        }
        self.slave.apply(step.next);
    }

    /// One system-clock edge.
    pub fn tick_sys(
        &mut self,
        register_write: &mut dyn RegisterWritePort,
        memory_write: &mut dyn MemoryWritePort,
    ) {
        match self.write_queue.clock_sys(register_write) {
            Ok(Some(entry)) => {
                trace!(
                    "register write retired at {:#010x} data {:#010x} sel {:#x}",
                    entry.address,
                    entry.data,
                    entry.byte_enable
                );
                self.stats.record_register_write();
            }
            Ok(None) => {}
            Err(err) => {
                error!("write queue drain failed: {err}");
                self.stats.record_overflow();
            }
        }

        match self.commit.tick(&mut self.burst_queue, memory_write) {
            Ok(Some(_)) => self.stats.record_burst_commit(),
            Ok(None) => {}
            Err(err) => {
                error!("burst commit lost its line: {err}");
                self.commit.reset();
                self.stats.record_overflow();
            }
        }
    }
}
