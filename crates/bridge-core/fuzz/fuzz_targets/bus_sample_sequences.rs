#![no_main]

use bridge_core::{
    byte_enable, translate_address, AddressDecoder, Bridge, BridgeConfig, BusSample, Direction,
    MemoryReadPort, MemoryWritePort, ReadRequest, RegisterReadPort, RegisterWritePort,
    WriteRequest,
};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Ports {
    stall: u8,
    tick: u8,
    read_pending: bool,
    write_open: bool,
}

impl Ports {
    fn ready(&mut self) -> bool {
        self.tick = self.tick.wrapping_add(1);
        self.stall == 0 || self.tick % (self.stall + 1) == 0
    }
}

impl RegisterReadPort for Ports {
    fn read_cycle(&mut self, request: ReadRequest) -> Option<u32> {
        self.ready().then_some(request.word_address)
    }
}

impl RegisterWritePort for Ports {
    fn write_cycle(&mut self, _request: WriteRequest) -> bool {
        self.ready()
    }
}

impl MemoryReadPort for Ports {
    fn read_command_ready(&self) -> bool {
        !self.read_pending
    }

    fn issue_read(&mut self, _line_address: u32) {
        self.read_pending = true;
    }

    fn read_data(&mut self) -> Option<u128> {
        if self.read_pending && self.ready() {
            self.read_pending = false;
            return Some(0);
        }
        None
    }
}

impl MemoryWritePort for Ports {
    fn write_command_ready(&self) -> bool {
        !self.write_open
    }

    fn issue_write(&mut self, _line_address: u32) {
        self.write_open = true;
    }

    fn write_data(&mut self, _data: u128, _byte_enable: u16) -> bool {
        if self.write_open && self.ready() {
            self.write_open = false;
            return true;
        }
        false
    }
}

fn sample_from(chunk: &[u8]) -> BusSample {
    let address = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    let flags = chunk[4];
    BusSample {
        address,
        data: address.rotate_left(7),
        direction: if flags & 1 == 0 {
            Direction::Read
        } else {
            Direction::Write
        },
        size: (flags >> 1) & 0b111,
        transfer_start: flags & 0x10 != 0,
        transfer_type: 0,
        transfer_modifier: (flags >> 5) & 0b111,
        memory_inhibit: flags & 0x80 != 0,
        transfer_in_progress: true,
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let config = BridgeConfig {
        memory_window_enabled: data[0] & 1 != 0,
        invert_crossing_data: data[0] & 2 != 0,
        ..BridgeConfig::default()
    };
    let Ok(mut bridge) = Bridge::new(config) else {
        return;
    };
    let decoder = AddressDecoder::new(config.memory_window_enabled);
    let mut registers = Ports {
        stall: data[1] & 0x7,
        ..Ports::default()
    };
    let mut memory = Ports {
        stall: (data[1] >> 3) & 0x7,
        ..Ports::default()
    };

    for chunk in data[2..].chunks_exact(5) {
        let sample = sample_from(chunk);
        let decode = decoder.decode(&sample);
        let _ = translate_address(sample.address, decode.region);
        let _ = byte_enable(sample.size, sample.address);

        let response = bridge.tick_cpu(&sample, &mut registers, &mut memory);
        assert!(!response.error_ack.is_asserted());
        for _ in 0..4 {
            bridge.tick_sys(&mut registers, &mut memory);
        }
    }
    assert_eq!(bridge.stats().queue_overflows, 0);
});
