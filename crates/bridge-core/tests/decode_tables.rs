//! Region, translation and byte-lane tables checked from outside the crate.

#![allow(clippy::pedantic, clippy::nursery, clippy::cast_possible_truncation)]

use bridge_core::{
    byte_enable, classify_region, translate_address, AddressDecoder, AddressRegion, BusSample,
    MEMORY_WINDOW_ENABLED,
};
use log as _;
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

#[rstest]
#[case(0, 0b00, 0xF)]
#[case(0, 0b01, 0xF)]
#[case(0, 0b10, 0xF)]
#[case(0, 0b11, 0xF)]
#[case(1, 0b00, 0b0001)]
#[case(1, 0b01, 0b0010)]
#[case(1, 0b10, 0b0100)]
#[case(1, 0b11, 0b1000)]
#[case(2, 0b00, 0b0011)]
#[case(2, 0b01, 0b0011)]
#[case(2, 0b10, 0b1100)]
#[case(2, 0b11, 0b1100)]
#[case(3, 0b00, 0xF)]
#[case(3, 0b01, 0xF)]
#[case(3, 0b10, 0xF)]
#[case(3, 0b11, 0xF)]
fn lane_mask_table(#[case] size: u8, #[case] low_bits: u32, #[case] expected: u8) {
    assert_eq!(byte_enable(size, 0xFE80_0000 | low_bits), expected);
}

#[rstest]
#[case(0xFE00_0000, 0x8F80_0000)]
#[case(0xFE12_3454, 0x8F92_3454)]
#[case(0xFE7F_FFFC, 0x8FFF_FFFC)]
#[case(0xFE80_0000, 0xF080_0000)]
#[case(0xFEAB_CDEC, 0xF0AB_CDEC)]
#[case(0xFEFF_FFFC, 0xF0FF_FFFC)]
#[case(0xE000_0000, 0x8000_0000)]
#[case(0xEF80_0004, 0x8F80_0004)]
fn owned_addresses_translate(#[case] address: u32, #[case] expected: u32) {
    let decode = AddressDecoder::default().decode(&BusSample {
        address,
        ..BusSample::default()
    });
    assert!(decode.owned());
    assert_eq!(decode.translated, expected);
}

#[test]
fn memory_window_ships_disabled() {
    assert!(!MEMORY_WINDOW_ENABLED);
    let decoder = AddressDecoder::default();
    assert!(!decoder.memory_window_enabled());
    for address in [0x0000_0000, 0x3000_0000, 0x37FF_FFFC] {
        let decode = decoder.decode(&BusSample {
            address,
            ..BusSample::default()
        });
        assert_eq!(decode.region, AddressRegion::None);
        assert!(!decode.owned());
    }
}

proptest! {
    #[test]
    fn slot_low_half_maps_to_top_of_ram(low in 0u32..0x0080_0000) {
        let address = 0xFE00_0000 | low;
        let region = classify_region(address, false, MEMORY_WINDOW_ENABLED);
        prop_assert_eq!(region, AddressRegion::Slot);
        prop_assert_eq!(translate_address(address, region), 0x8F80_0000 | low);
    }

    #[test]
    fn slot_high_half_maps_to_direct_window(low in 0u32..0x0080_0000) {
        let address = 0xFE80_0000 | low;
        let region = classify_region(address, false, MEMORY_WINDOW_ENABLED);
        prop_assert_eq!(translate_address(address, region), 0xF080_0000 | low);
    }

    #[test]
    fn super_slot_keeps_low_28_bits(low in 0u32..0x1000_0000) {
        let address = 0xE000_0000 | low;
        let region = classify_region(address, false, MEMORY_WINDOW_ENABLED);
        prop_assert_eq!(region, AddressRegion::SuperSlot);
        let translated = translate_address(address, region);
        prop_assert_eq!(translated >> 28, 0x8);
        prop_assert_eq!((translated >> 23) & 0x1F, (address >> 23) & 0x1F);
        prop_assert_eq!(translated & 0x007F_FFFF, address & 0x007F_FFFF);
    }

    #[test]
    fn exactly_one_region_per_address(
        address in any::<u32>(),
        mi in any::<bool>(),
        enabled in any::<bool>(),
    ) {
        let region = classify_region(address, mi, enabled);
        let slot = address >> 24 == 0xFE;
        let super_slot = address >> 28 == 0xE;
        let memory = enabled && !mi && address >> 28 == 0x3;
        let expected = match (slot, super_slot, memory) {
            (true, _, _) => AddressRegion::Slot,
            (false, true, _) => AddressRegion::SuperSlot,
            (false, false, true) => AddressRegion::Memory,
            (false, false, false) => AddressRegion::None,
        };
        prop_assert_eq!(region, expected);
    }
}
