//! Downstream contracts the bridge drives.
//!
//! Each method call stands for one clock edge of the owning domain with the
//! described request lines held; implementations answer with the target's
//! handshake for that edge.

/// Register-bus read request. Reads always enable all four byte lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ReadRequest {
    /// 32-bit word address (translated byte address `>> 2`).
    pub word_address: u32,
    /// Byte-lane enables.
    pub byte_enable: u8,
}

/// Register-bus write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WriteRequest {
    /// 32-bit word address (translated byte address `>> 2`).
    pub word_address: u32,
    /// Write data in downstream byte order.
    pub data: u32,
    /// Byte-lane enables.
    pub byte_enable: u8,
}

/// Read side of the register bus, clocked by the processor domain.
pub trait RegisterReadPort {
    /// One edge with `CYC`/`STB` asserted for `request`; returns the data on
    /// the edge the target acknowledges.
    fn read_cycle(&mut self, request: ReadRequest) -> Option<u32>;
}

/// Write side of the register bus, clocked by the system domain.
pub trait RegisterWritePort {
    /// One edge with a write held active; returns `true` on acknowledge.
    fn write_cycle(&mut self, request: WriteRequest) -> bool;
}

/// Read-only wide memory port.
pub trait MemoryReadPort {
    /// Command-ready level for the current edge.
    fn read_command_ready(&self) -> bool;

    /// Command valid and ready met on this edge for `line_address`
    /// (translated byte address `>> 4`).
    fn issue_read(&mut self, line_address: u32);

    /// One edge with read-data ready asserted; returns the line when the
    /// port's data valid is asserted.
    fn read_data(&mut self) -> Option<u128>;
}

/// Write-only wide memory port.
pub trait MemoryWritePort {
    /// Command-ready level for the current edge.
    fn write_command_ready(&self) -> bool;

    /// Command valid and ready met on this edge for `line_address`.
    fn issue_write(&mut self, line_address: u32);

    /// One edge with write-data valid; `byte_enable` bit `n` covers bits
    /// `[8n, 8n+8)` of `data`. Returns the port's ready.
    fn write_data(&mut self, data: u128, byte_enable: u16) -> bool;
}
