//! Cycle-level test tooling for `bridge-core`: an MC68040 bus master,
//! register-bus and memory-port targets, and a two-clock co-simulation.

/// Sparse backing store and the downstream target models.
pub mod memory;
pub use memory::{MemoryTarget, RegisterTarget, SharedMemory, SparseMemory};

/// Processor bus master model.
pub mod master;
pub use master::{BusMaster, Completion, MasterError, Transfer};

/// Two-clock edge scheduler.
pub mod clock;
pub use clock::{DualClock, Edge, DEFAULT_CPU_PERIOD_PS, DEFAULT_SYS_PERIOD_PS};

/// Co-simulation driver.
pub mod bench;
pub use bench::{BenchConfig, BenchError, CycleRecord, Testbench};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
