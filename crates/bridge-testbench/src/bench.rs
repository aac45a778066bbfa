//! Co-simulation of the bridge, the bus master and both downstream targets.

use std::cell::Ref;

use bridge_core::{Bridge, BridgeConfig, BusResponse, BusSample, ConfigError};
use log::debug;
use thiserror::Error;

use crate::clock::{DualClock, Edge, DEFAULT_CPU_PERIOD_PS, DEFAULT_SYS_PERIOD_PS};
use crate::master::{BusMaster, Completion, MasterError, Transfer};
use crate::memory::{MemoryTarget, RegisterTarget, SharedMemory, SparseMemory};

/// Testbench construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BenchConfig {
    /// Bridge under test.
    pub bridge: BridgeConfig,
    /// Processor clock period in picoseconds.
    pub cpu_period_ps: u64,
    /// System clock period in picoseconds.
    pub sys_period_ps: u64,
    /// Extra processor edges before a register read is acknowledged.
    pub register_read_latency: u32,
    /// Extra system edges before a register write is acknowledged.
    pub register_write_latency: u32,
    /// Processor edges between a memory read command and its data.
    pub memory_read_latency: u32,
    /// Extra system edges before memory write data is accepted.
    pub memory_write_latency: u32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            cpu_period_ps: DEFAULT_CPU_PERIOD_PS,
            sys_period_ps: DEFAULT_SYS_PERIOD_PS,
            register_read_latency: 1,
            register_write_latency: 1,
            memory_read_latency: 2,
            memory_write_latency: 1,
        }
    }
}

/// Testbench failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum BenchError {
    /// The bridge rejected its configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A clock period of zero.
    #[error("{domain} clock period must be non-zero")]
    InvalidClock {
        /// Offending domain.
        domain: &'static str,
    },
    /// The bus master saw a protocol or bus error.
    #[error(transparent)]
    Master(#[from] MasterError),
    /// The watchdog expired.
    #[error("no progress after {cycles} processor cycles")]
    Timeout {
        /// Processor cycles simulated before giving up.
        cycles: u64,
    },
}

/// One processor cycle as seen on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleRecord {
    /// Processor edge index, starting at 1.
    pub cycle: u64,
    /// Lines driven by the master.
    pub sample: BusSample,
    /// Lines driven by the bridge.
    pub response: BusResponse,
}

/// Bridge plus its environment, advanced edge by edge.
#[derive(Debug)]
pub struct Testbench {
    bridge: Bridge,
    master: BusMaster,
    registers: RegisterTarget,
    memory_port: MemoryTarget,
    store: SharedMemory,
    clock: DualClock,
    completions: Vec<Completion>,
    trace: Option<Vec<CycleRecord>>,
}

impl Testbench {
    /// Builds a testbench over an empty backing store.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Config`] or [`BenchError::InvalidClock`] for a
    /// bad configuration.
    pub fn new(config: BenchConfig) -> Result<Self, BenchError> {
        if config.cpu_period_ps == 0 {
            return Err(BenchError::InvalidClock { domain: "processor" });
        }
        if config.sys_period_ps == 0 {
            return Err(BenchError::InvalidClock { domain: "system" });
        }
        let store = SparseMemory::shared();
        Ok(Self {
            bridge: Bridge::new(config.bridge)?,
            master: BusMaster::new(),
            registers: RegisterTarget::new(
                store.clone(),
                config.register_read_latency,
                config.register_write_latency,
            ),
            memory_port: MemoryTarget::new(
                store.clone(),
                config.memory_read_latency,
                config.memory_write_latency,
            ),
            store,
            clock: DualClock::new(config.cpu_period_ps, config.sys_period_ps),
            completions: Vec::new(),
            trace: None,
        })
    }

    /// Starts recording every processor cycle.
    pub fn enable_trace(&mut self) {
        self.trace.get_or_insert_with(Vec::new);
    }

    /// Recorded processor cycles.
    #[must_use]
    pub fn trace(&self) -> &[CycleRecord] {
        self.trace.as_deref().unwrap_or_default()
    }

    /// Bridge under test.
    #[must_use]
    pub const fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Register-bus target.
    #[must_use]
    pub const fn registers(&self) -> &RegisterTarget {
        &self.registers
    }

    /// Memory-port target.
    #[must_use]
    pub const fn memory_port(&self) -> &MemoryTarget {
        &self.memory_port
    }

    /// Edge scheduler.
    #[must_use]
    pub const fn clock(&self) -> &DualClock {
        &self.clock
    }

    /// Backing store.
    #[must_use]
    pub fn memory(&self) -> Ref<'_, SparseMemory> {
        self.store.borrow()
    }

    /// Stores `data` directly at `word_address`, bypassing the bridge.
    pub fn preload_word(&mut self, word_address: u32, data: u32) {
        self.store.borrow_mut().write_word(word_address, data, 0xF);
    }

    /// Queues a transfer on the bus master.
    pub fn submit(&mut self, transfer: Transfer) {
        self.master.submit(transfer);
    }

    /// Advances one clock edge.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Master`] when the master rejects the bridge's
    /// response.
    pub fn step(&mut self) -> Result<Edge, BenchError> {
        let edge = self.clock.next_edge();
        match edge {
            Edge::Cpu => {
                let sample = self.master.drive();
                let response =
                    self.bridge
                        .tick_cpu(&sample, &mut self.registers, &mut self.memory_port);
                if let Some(trace) = self.trace.as_mut() {
                    trace.push(CycleRecord {
                        cycle: self.clock.cpu_edges(),
                        sample,
                        response,
                    });
                }
                if let Some(done) = self.master.observe(&response)? {
                    self.completions.push(done);
                }
            }
            Edge::Sys => {
                self.bridge
                    .tick_sys(&mut self.registers, &mut self.memory_port);
            }
        }
        Ok(edge)
    }

    /// Runs until every submitted transfer has completed and returns the
    /// completions gathered since the last call.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Timeout`] after `limit` processor cycles without
    /// finishing, or a master error.
    pub fn run_until_complete(&mut self, limit: u64) -> Result<Vec<Completion>, BenchError> {
        self.run_while(limit, |bench| !bench.master.is_idle())?;
        Ok(std::mem::take(&mut self.completions))
    }

    /// Runs until the master is idle and every queued write has retired.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Timeout`] after `limit` processor cycles, or a
    /// master error.
    pub fn drain(&mut self, limit: u64) -> Result<(), BenchError> {
        self.run_while(limit, |bench| {
            !bench.master.is_idle() || !bench.bridge.is_quiescent() || !bench.memory_port.is_idle()
        })
    }

    fn run_while(&mut self, limit: u64, busy: impl Fn(&Self) -> bool) -> Result<(), BenchError> {
        let start = self.clock.cpu_edges();
        while busy(&*self) {
            let cycles = self.clock.cpu_edges() - start;
            if cycles >= limit {
                debug!("watchdog expired after {cycles} processor cycles");
                return Err(BenchError::Timeout { cycles });
            }
            self.step()?;
        }
        Ok(())
    }
}
