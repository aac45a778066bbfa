//! Byte-lane enables for downstream writes.
//!
//! Bit `n` of a mask enables register-bus byte lane `n`, i.e. bits
//! `[8n, 8n+8)` of the lane-reversed data word.

/// All four byte lanes.
pub const ALL_LANES: u8 = 0xF;
/// No byte lanes; the result for size codes outside the defined table.
pub const NO_LANES: u8 = 0x0;

/// Maps a raw `SIZ` code and the low address bits to a lane mask.
#[must_use]
pub const fn byte_enable(size_code: u8, address: u32) -> u8 {
    match size_code {
        0 | 3 => ALL_LANES,
        1 => 1 << (address & 0b11),
        2 => {
            if address & 0b10 == 0 {
                0b0011
            } else {
                0b1100
            }
        }
        _ => NO_LANES,
    }
}
