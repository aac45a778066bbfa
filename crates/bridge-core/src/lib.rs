//! Cycle-level model of an MC68040 bus bridge to a Wishbone register bus and
//! a wide memory port across two clock domains.

/// Processor bus samples, handshake lines and byte-lane order.
pub mod bus;
pub use bus::{reverse_lanes, BusResponse, BusSample, Direction, Line, TransferSize};

/// Error taxonomy for configuration and queue handshakes.
pub mod error;
pub use error::{ConfigError, QueueError};

/// Bridge construction parameters and fixed geometry.
pub mod config;
pub use config::{
    BridgeConfig, BACK_QUEUE_DEPTH, BURST_BEATS, BURST_QUEUE_DEPTH, FRONT_QUEUE_DEPTH,
    MEMORY_WINDOW_ENABLED,
};

/// Region classifier, address translator and byte-lane selector.
pub mod address;
pub use address::{
    byte_enable, classify_region, translate_address, AddressDecode, AddressDecoder,
    AddressRegion,
};

/// Single-clock and dual-clock FIFOs.
pub mod fifo;
pub use fifo::{AsyncFifo, SyncFifo, Synchronizer};

/// Downstream register-bus and memory-port contracts.
pub mod ports;
pub use ports::{
    MemoryReadPort, MemoryWritePort, ReadRequest, RegisterReadPort, RegisterWritePort,
    WriteRequest,
};

/// Register-bus write path across the clock domains.
pub mod write_queue;
pub use write_queue::{CrossDomainWriteQueue, WriteEntry};

/// Burst lines, burst write queue and the burst commit state machine.
pub mod burst;
pub use burst::{BurstCommitFsm, BurstLine, BurstWriteQueue, CommitState, LINE_BYTE_ENABLE};

/// Transaction state machine.
pub mod slave;
pub use slave::{
    Admission, AdmissionKind, SlaveFsm, SlaveInputs, SlaveRegisters, SlaveState, SlaveStep,
};

/// Activity counters.
pub mod stats;
pub use stats::BridgeStats;

/// Top-level bridge.
pub mod bridge;
pub use bridge::Bridge;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
