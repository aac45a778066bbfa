//! Region-dependent address remapping. Bits `[22:0]` always pass through.

use super::AddressRegion;

/// Bits copied unchanged into every translated address.
pub const PASS_THROUGH_MASK: u32 = 0x007F_FFFF;
/// Selects the slot half.
pub const SLOT_HIGH_HALF_BIT: u32 = 1 << 23;
/// Top-of-RAM base for the slot half below the midpoint.
pub const SLOT_LOW_HALF_BASE: u32 = 0x8F80_0000;
/// Base for the slot half above the midpoint.
pub const SLOT_HIGH_HALF_BASE: u32 = 0xF080_0000;
/// Bits copied unchanged from a super-slot address.
pub const SUPER_SLOT_MASK: u32 = 0x0FFF_FFFF;
/// Replacement top nibble for super-slot addresses.
pub const SUPER_SLOT_REMAP_BASE: u32 = 0x8000_0000;

/// Rewrites the top bits of `address` according to `region`.
#[must_use]
pub const fn translate_address(address: u32, region: AddressRegion) -> u32 {
    match region {
        AddressRegion::Slot => {
            let base = if address & SLOT_HIGH_HALF_BIT == 0 {
                SLOT_LOW_HALF_BASE
            } else {
                SLOT_HIGH_HALF_BASE
            };
            base | (address & PASS_THROUGH_MASK)
        }
        AddressRegion::SuperSlot => SUPER_SLOT_REMAP_BASE | (address & SUPER_SLOT_MASK),
        AddressRegion::Memory | AddressRegion::None => address,
    }
}

#[cfg(test)]
mod tests {
    use super::{translate_address, PASS_THROUGH_MASK};
    use crate::address::AddressRegion;
    use proptest::prelude::*;

    #[test]
    fn slot_halves_land_on_their_bases() {
        assert_eq!(
            translate_address(0xFE00_0000, AddressRegion::Slot),
            0x8F80_0000
        );
        assert_eq!(
            translate_address(0xFE7F_FFFF, AddressRegion::Slot),
            0x8FFF_FFFF
        );
        assert_eq!(
            translate_address(0xFE80_0000, AddressRegion::Slot),
            0xF080_0000
        );
        assert_eq!(
            translate_address(0xFEFF_FFFC, AddressRegion::Slot),
            0xF0FF_FFFC
        );
    }

    #[test]
    fn unclaimed_addresses_pass_through() {
        assert_eq!(
            translate_address(0x1234_5678, AddressRegion::None),
            0x1234_5678
        );
        assert_eq!(
            translate_address(0x3456_789A, AddressRegion::Memory),
            0x3456_789A
        );
    }

    proptest! {
        #[test]
        fn low_23_bits_always_survive(address in any::<u32>()) {
            for region in [
                AddressRegion::Slot,
                AddressRegion::SuperSlot,
                AddressRegion::Memory,
                AddressRegion::None,
            ] {
                prop_assert_eq!(
                    translate_address(address, region) & PASS_THROUGH_MASK,
                    address & PASS_THROUGH_MASK
                );
            }
        }

        #[test]
        fn super_slot_keeps_bits_27_to_23(low in 0u32..0x1000_0000) {
            let translated = translate_address(0xE000_0000 | low, AddressRegion::SuperSlot);
            prop_assert_eq!(translated >> 28, 0x8);
            prop_assert_eq!((translated >> 23) & 0x1F, (low >> 23) & 0x1F);
        }
    }
}
