//! Two-clock edge scheduler.

/// Processor clock period at 25 MHz, in picoseconds.
pub const DEFAULT_CPU_PERIOD_PS: u64 = 40_000;
/// System clock period at 100 MHz, in picoseconds.
pub const DEFAULT_SYS_PERIOD_PS: u64 = 10_000;

/// Which domain a rising edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Processor bus clock.
    Cpu,
    /// System clock.
    Sys,
}

/// Orders the rising edges of two free-running clocks.
///
/// Coincident edges are returned processor first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DualClock {
    cpu_period_ps: u64,
    sys_period_ps: u64,
    next_cpu_ps: u64,
    next_sys_ps: u64,
    now_ps: u64,
    cpu_edges: u64,
    sys_edges: u64,
}

impl Default for DualClock {
    fn default() -> Self {
        Self::new(DEFAULT_CPU_PERIOD_PS, DEFAULT_SYS_PERIOD_PS)
    }
}

impl DualClock {
    /// Creates a scheduler with both first edges one period after time zero.
    /// Periods of zero are raised to one picosecond.
    #[must_use]
    pub const fn new(cpu_period_ps: u64, sys_period_ps: u64) -> Self {
        let cpu_period_ps = if cpu_period_ps == 0 { 1 } else { cpu_period_ps };
        let sys_period_ps = if sys_period_ps == 0 { 1 } else { sys_period_ps };
        Self {
            cpu_period_ps,
            sys_period_ps,
            next_cpu_ps: cpu_period_ps,
            next_sys_ps: sys_period_ps,
            now_ps: 0,
            cpu_edges: 0,
            sys_edges: 0,
        }
    }

    /// Advances to the next rising edge.
    pub fn next_edge(&mut self) -> Edge {
        if self.next_cpu_ps <= self.next_sys_ps {
            self.now_ps = self.next_cpu_ps;
            self.next_cpu_ps += self.cpu_period_ps;
            self.cpu_edges += 1;
            Edge::Cpu
        } else {
            self.now_ps = self.next_sys_ps;
            self.next_sys_ps += self.sys_period_ps;
            self.sys_edges += 1;
            Edge::Sys
        }
    }

    /// Time of the last edge returned.
    #[must_use]
    pub const fn now_ps(&self) -> u64 {
        self.now_ps
    }

    /// Processor edges so far.
    #[must_use]
    pub const fn cpu_edges(&self) -> u64 {
        self.cpu_edges
    }

    /// System edges so far.
    #[must_use]
    pub const fn sys_edges(&self) -> u64 {
        self.sys_edges
    }
}
