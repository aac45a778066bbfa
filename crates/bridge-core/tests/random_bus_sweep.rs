//! Arbitrary processor bus activity against always-ready downstream ports.

#![allow(clippy::pedantic, clippy::nursery, clippy::cast_possible_truncation)]

use bridge_core::{
    Bridge, BridgeConfig, BusResponse, BusSample, Direction, Line, MemoryReadPort, MemoryWritePort,
    ReadRequest, RegisterReadPort, RegisterWritePort, SlaveState, WriteRequest,
};
use log as _;
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

#[derive(Default)]
struct Ready {
    reads_outstanding: usize,
    line_open: bool,
    register_writes: usize,
    lines: usize,
}

impl RegisterReadPort for Ready {
    fn read_cycle(&mut self, request: ReadRequest) -> Option<u32> {
        Some(request.word_address)
    }
}

impl RegisterWritePort for Ready {
    fn write_cycle(&mut self, _request: WriteRequest) -> bool {
        self.register_writes += 1;
        true
    }
}

impl MemoryReadPort for Ready {
    fn read_command_ready(&self) -> bool {
        self.reads_outstanding == 0
    }

    fn issue_read(&mut self, _line_address: u32) {
        self.reads_outstanding += 1;
    }

    fn read_data(&mut self) -> Option<u128> {
        if self.reads_outstanding == 0 {
            return None;
        }
        self.reads_outstanding -= 1;
        Some(u128::MAX)
    }
}

impl MemoryWritePort for Ready {
    fn write_command_ready(&self) -> bool {
        !self.line_open
    }

    fn issue_write(&mut self, _line_address: u32) {
        self.line_open = true;
    }

    fn write_data(&mut self, _data: u128, _byte_enable: u16) -> bool {
        let was_open = self.line_open;
        self.line_open = false;
        was_open
    }
}

fn arb_sample() -> impl Strategy<Value = BusSample> {
    (
        prop_oneof![
            Just(0xFE00_0000u32),
            Just(0xFE80_0000u32),
            Just(0xE000_0000u32),
            Just(0x3000_0000u32),
            Just(0x0000_0000u32),
        ],
        0u32..0x100,
        any::<u32>(),
        any::<bool>(),
        0u8..6,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(base, offset, data, write, size, start, mi)| BusSample {
            address: base | offset,
            data,
            direction: if write {
                Direction::Write
            } else {
                Direction::Read
            },
            size,
            transfer_start: start,
            transfer_type: 0,
            transfer_modifier: 5,
            memory_inhibit: mi,
            transfer_in_progress: true,
        })
}

fn run(
    bridge: &mut Bridge,
    registers: &mut Ready,
    memory: &mut Ready,
    sample: &BusSample,
) -> BusResponse {
    let response = bridge.tick_cpu(sample, registers, memory);
    for _ in 0..4 {
        bridge.tick_sys(registers, memory);
    }
    response
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn handshake_contract_holds_for_any_input(
        samples in prop::collection::vec(arb_sample(), 1..120),
        invert in any::<bool>(),
    ) {
        let config = BridgeConfig {
            invert_crossing_data: invert,
            ..BridgeConfig::default()
        };
        let mut bridge = Bridge::new(config).expect("valid config");
        let mut registers = Ready::default();
        let mut memory = Ready::default();

        for sample in &samples {
            let response = run(&mut bridge, &mut registers, &mut memory, sample);
            prop_assert!(!response.error_ack.is_asserted());
            if response.data.is_some() {
                prop_assert!(response.transfer_ack.is_asserted());
            }
            if response.burst_inhibit.is_asserted() {
                prop_assert!(response.transfer_ack.is_asserted());
            }
            if response.transfer_ack == Line::Released {
                prop_assert_eq!(response.burst_inhibit, Line::Released);
            }
        }

        let idle = BusSample::default();
        for _ in 0..64 {
            if bridge.slave_state() == SlaveState::Idle && bridge.is_quiescent() {
                break;
            }
            run(&mut bridge, &mut registers, &mut memory, &idle);
        }
        let stats = *bridge.stats();
        prop_assert_eq!(stats.queue_overflows, 0);
        prop_assert_eq!(stats.write_entries_enqueued, registers.register_writes as u64);
        prop_assert_eq!(stats.burst_lines_enqueued, stats.burst_lines_committed);
        prop_assert_eq!(stats.register_writes_retired, registers.register_writes as u64);
    }
}
