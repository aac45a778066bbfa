//! Fixed address windows claimed by the bridge.

/// `A[31:24]` value of the NuBus slot window.
pub const SLOT_ID: u8 = 0xFE;
/// `A[31:28]` value of the super-slot window.
pub const SUPER_SLOT_NIBBLE: u8 = 0xE;
/// `A[31:28]` value of the Memory window.
pub const MEMORY_WINDOW_NIBBLE: u8 = 0x3;

/// Region classification for one processor address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AddressRegion {
    /// Slot window (`0xFE00_0000..=0xFEFF_FFFF`).
    Slot,
    /// Memory window (`0x3000_0000..=0x3FFF_FFFF`), only when enabled.
    Memory,
    /// Super-slot window (`0xE000_0000..=0xEFFF_FFFF`).
    SuperSlot,
    /// Not claimed by the bridge.
    #[default]
    None,
}

impl AddressRegion {
    /// Returns `true` when the bridge answers addresses in this region.
    #[must_use]
    pub const fn is_owned(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Classifies `address` into exactly one region.
///
/// The slot test has priority; the three windows do not overlap, so the
/// order only matters for documentation. The Memory test is evaluated but
/// its result is forced off unless `memory_window_enabled` is set.
#[must_use]
pub const fn classify_region(
    address: u32,
    memory_inhibit: bool,
    memory_window_enabled: bool,
) -> AddressRegion {
    let top_byte = (address >> 24) as u8;
    let top_nibble = (address >> 28) as u8;
    let memory_hit = !memory_inhibit && top_nibble == MEMORY_WINDOW_NIBBLE;

    if top_byte == SLOT_ID {
        AddressRegion::Slot
    } else if top_nibble == SUPER_SLOT_NIBBLE {
        AddressRegion::SuperSlot
    } else if memory_hit && memory_window_enabled {
        AddressRegion::Memory
    } else {
        AddressRegion::None
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_region, AddressRegion};
    use rstest::rstest;

    #[rstest]
    #[case(0xFE00_0000, AddressRegion::Slot)]
    #[case(0xFEFF_FFFF, AddressRegion::Slot)]
    #[case(0xFD00_0000, AddressRegion::None)]
    #[case(0xFF00_0000, AddressRegion::None)]
    #[case(0xE000_0000, AddressRegion::SuperSlot)]
    #[case(0xEFFF_FFFC, AddressRegion::SuperSlot)]
    #[case(0x3000_0000, AddressRegion::None)]
    #[case(0x0000_0000, AddressRegion::None)]
    #[case(0x5000_0000, AddressRegion::None)]
    fn default_windows(#[case] address: u32, #[case] expected: AddressRegion) {
        assert_eq!(classify_region(address, false, false), expected);
        assert_eq!(expected.is_owned(), expected != AddressRegion::None);
    }

    #[test]
    fn memory_window_is_forced_off_without_capability() {
        for address in [0x3000_0000, 0x3ABC_DEF0, 0x3FFF_FFFF] {
            assert_eq!(classify_region(address, false, false), AddressRegion::None);
            assert_eq!(classify_region(address, false, true), AddressRegion::Memory);
            assert_eq!(classify_region(address, true, true), AddressRegion::None);
        }
    }
}
