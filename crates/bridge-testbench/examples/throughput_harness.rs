//! Throughput harness for the bridge co-simulation.
//!
//! ## Usage
//!
//! ```sh
//! cargo run -p bridge-testbench --example throughput_harness
//! ```
//!
//! ## Metrics
//!
//! - Processor cycles per transfer for each traffic mix
//! - Bytes moved per microsecond of simulated time
//! - Simulated processor edges per wall-clock second

#![allow(clippy::pedantic)]

use bridge_core::TransferSize;
use bridge_testbench::{BenchConfig, Testbench, Transfer};
use log as _;
use proptest as _;
use rstest as _;
use thiserror as _;

use std::time::{Duration, Instant};

const BATCH: u32 = 256;
const CYCLE_LIMIT: u64 = 1_000_000;

#[derive(Debug, Clone, Copy)]
struct ThroughputResult {
    name: &'static str,
    transfers: u64,
    bytes: u64,
    cpu_cycles: u64,
    simulated_ps: u64,
    wall: Duration,
}

impl ThroughputResult {
    fn cycles_per_transfer(&self) -> f64 {
        self.cpu_cycles as f64 / self.transfers.max(1) as f64
    }

    fn bytes_per_us(&self) -> f64 {
        self.bytes as f64 / (self.simulated_ps.max(1) as f64 / 1_000_000.0)
    }

    fn edges_per_second(&self) -> f64 {
        self.cpu_cycles as f64 / self.wall.as_secs_f64().max(f64::EPSILON)
    }
}

fn bytes_of(transfer: &Transfer) -> u64 {
    match transfer {
        Transfer::Read { size, .. } | Transfer::Write { size, .. } => match size {
            TransferSize::Byte => 1,
            TransferSize::Word => 2,
            TransferSize::Long => 4,
            TransferSize::Line => 16,
        },
        Transfer::LineRead { .. } | Transfer::LineWrite { .. } => 16,
    }
}

fn measure(name: &'static str, config: BenchConfig, transfers: &[Transfer]) -> ThroughputResult {
    let mut bench = Testbench::new(config).expect("bench config is valid");
    for transfer in transfers {
        bench.submit(*transfer);
    }
    let started = Instant::now();
    bench
        .run_until_complete(CYCLE_LIMIT)
        .expect("workload should complete");
    bench.drain(CYCLE_LIMIT).expect("bridge should drain");
    ThroughputResult {
        name,
        transfers: transfers.len() as u64,
        bytes: transfers.iter().map(bytes_of).sum(),
        cpu_cycles: bench.clock().cpu_edges(),
        simulated_ps: bench.clock().now_ps(),
        wall: started.elapsed(),
    }
}

fn single_writes() -> Vec<Transfer> {
    (0..BATCH)
        .map(|n| Transfer::Write {
            address: 0xFE80_0000 + 4 * n,
            size: TransferSize::Long,
            data: n,
        })
        .collect()
}

fn frame_buffer_lines() -> Vec<Transfer> {
    (0..BATCH)
        .map(|n| Transfer::LineWrite {
            address: 0xFE00_0000 + 16 * n,
            data: [n; 4],
        })
        .collect()
}

fn mixed_read_after_write() -> Vec<Transfer> {
    (0..BATCH / 2)
        .flat_map(|n| {
            [
                Transfer::Write {
                    address: 0xFE80_0000 + 4 * n,
                    size: TransferSize::Long,
                    data: n,
                },
                Transfer::Read {
                    address: 0xFE80_0000 + 4 * n,
                    size: TransferSize::Long,
                },
            ]
        })
        .collect()
}

fn print_results(results: &[ThroughputResult]) {
    println!(
        "{:<24} {:>10} {:>14} {:>12} {:>16}",
        "workload", "transfers", "cycles/xfer", "bytes/us", "edges/s (wall)"
    );
    for result in results {
        println!(
            "{:<24} {:>10} {:>14.2} {:>12.2} {:>16.0}",
            result.name,
            result.transfers,
            result.cycles_per_transfer(),
            result.bytes_per_us(),
            result.edges_per_second()
        );
    }
}

fn main() {
    let config = BenchConfig::default();
    let slow_bus = BenchConfig {
        register_write_latency: 8,
        ..BenchConfig::default()
    };
    let results = [
        measure("single writes", config, &single_writes()),
        measure("single writes, slow bus", slow_bus, &single_writes()),
        measure("frame-buffer lines", config, &frame_buffer_lines()),
        measure("read after write", config, &mixed_read_after_write()),
    ];
    print_results(&results);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_writes_beat_single_writes_per_byte() {
        let config = BenchConfig::default();
        let singles = measure("singles", config, &single_writes());
        let lines = measure("lines", config, &frame_buffer_lines());
        assert!(lines.bytes_per_us() > singles.bytes_per_us());
    }
}
