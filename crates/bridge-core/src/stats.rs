//! Saturating activity counters.

use crate::slave::AdmissionKind;

/// Bridge activity counters. Observability only; none of these feed back
/// into bus behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BridgeStats {
    /// Frame-buffer burst writes admitted.
    pub frame_burst_writes: u64,
    /// Frame-buffer burst reads admitted.
    pub frame_burst_reads: u64,
    /// Register-bus burst writes admitted.
    pub burst_writes: u64,
    /// Register-bus reads admitted.
    pub reads: u64,
    /// Register-bus single writes admitted.
    pub writes: u64,
    /// Processor cycles spent in a delay state without progress.
    pub stall_cycles: u64,
    /// Entries pushed into the front write queue.
    pub write_entries_enqueued: u64,
    /// Register-bus writes acknowledged downstream.
    pub register_writes_retired: u64,
    /// Lines pushed into the burst write queue.
    pub burst_lines_enqueued: u64,
    /// Lines accepted by the memory write port.
    pub burst_lines_committed: u64,
    /// Memory-port read commands issued.
    pub memory_reads_issued: u64,
    /// Processor transfer acknowledges driven.
    pub acknowledges: u64,
    /// Queue pushes refused.
    pub queue_overflows: u64,
}

fn bump(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}

impl BridgeStats {
    /// Counts one admission of `kind`.
    pub fn record_admission(&mut self, kind: AdmissionKind) {
        bump(match kind {
            AdmissionKind::FrameBurstWrite => &mut self.frame_burst_writes,
            AdmissionKind::FrameBurstRead => &mut self.frame_burst_reads,
            AdmissionKind::BurstWrite => &mut self.burst_writes,
            AdmissionKind::Read => &mut self.reads,
            AdmissionKind::Write => &mut self.writes,
        });
    }

    /// Total admissions of any kind.
    #[must_use]
    pub const fn admissions(&self) -> u64 {
        self.frame_burst_writes
            .saturating_add(self.frame_burst_reads)
            .saturating_add(self.burst_writes)
            .saturating_add(self.reads)
            .saturating_add(self.writes)
    }

    pub(crate) fn record_stall(&mut self) {
        bump(&mut self.stall_cycles);
    }

    pub(crate) fn record_write_entry(&mut self) {
        bump(&mut self.write_entries_enqueued);
    }

    pub(crate) fn record_register_write(&mut self) {
        bump(&mut self.register_writes_retired);
    }

    pub(crate) fn record_burst_line(&mut self) {
        bump(&mut self.burst_lines_enqueued);
    }

    pub(crate) fn record_burst_commit(&mut self) {
        bump(&mut self.burst_lines_committed);
    }

    pub(crate) fn record_memory_read(&mut self) {
        bump(&mut self.memory_reads_issued);
    }

    pub(crate) fn record_acknowledge(&mut self) {
        bump(&mut self.acknowledges);
    }

    pub(crate) fn record_overflow(&mut self) {
        bump(&mut self.queue_overflows);
    }
}
