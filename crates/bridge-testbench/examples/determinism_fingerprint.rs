//! Deterministic co-simulation fingerprint used for cross-host comparison.

use bridge_core::TransferSize;
use bridge_testbench::{BenchConfig, Testbench, Transfer};
use log as _;
use proptest as _;
use rstest as _;
use thiserror as _;

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn workload() -> Vec<Transfer> {
    let mut transfers = Vec::new();
    for n in 0..8u32 {
        transfers.push(Transfer::Write {
            address: 0xFE80_0000 + 4 * n,
            size: TransferSize::Long,
            data: n.wrapping_mul(0x0101_0101),
        });
        transfers.push(Transfer::LineWrite {
            address: 0xFE00_0000 + 16 * n,
            data: [n, n + 1, n + 2, n + 3],
        });
    }
    transfers.push(Transfer::Write {
        address: 0xFE80_0003,
        size: TransferSize::Byte,
        data: 0x0000_00EE,
    });
    transfers.push(Transfer::LineRead {
        address: 0xFE80_0000,
    });
    transfers.push(Transfer::LineRead {
        address: 0xFE00_0030,
    });
    transfers.push(Transfer::Read {
        address: 0xE000_0010,
        size: TransferSize::Word,
    });
    transfers
}

fn fingerprint() -> String {
    let mut bench = Testbench::new(BenchConfig::default()).expect("default bench is valid");
    bench.enable_trace();
    for transfer in workload() {
        bench.submit(transfer);
    }
    let done = bench
        .run_until_complete(100_000)
        .expect("workload should complete");
    bench.drain(100_000).expect("bridge should drain");

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for completion in &done {
        hash_bytes(&mut hash, &completion.cycles.to_le_bytes());
        hash_bytes(&mut hash, &[u8::from(completion.burst_inhibited)]);
        for word in &completion.data {
            hash_bytes(&mut hash, &word.to_le_bytes());
        }
    }
    for record in bench.trace() {
        let lines = [
            record.response.transfer_ack,
            record.response.error_ack,
            record.response.burst_inhibit,
        ];
        for line in lines {
            hash_bytes(&mut hash, &[line.pin_level().map_or(2, u8::from)]);
        }
        hash_bytes(&mut hash, &record.response.data.unwrap_or(0).to_le_bytes());
    }
    let stats = *bench.bridge().stats();
    hash_bytes(&mut hash, &stats.acknowledges.to_le_bytes());
    hash_bytes(&mut hash, &stats.stall_cycles.to_le_bytes());
    hash_bytes(&mut hash, &bench.clock().now_ps().to_le_bytes());

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
