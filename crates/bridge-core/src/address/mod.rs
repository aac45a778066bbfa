//! Combinational address decode: region classifier, address translator and
//! byte-lane selector.

/// Fixed address windows and the region classifier.
pub mod region;
/// Region-dependent address remapping.
pub mod translate;
/// Byte-lane enable masks.
pub mod lanes;

pub use lanes::{byte_enable, ALL_LANES, NO_LANES};
pub use region::{
    classify_region, AddressRegion, MEMORY_WINDOW_NIBBLE, SLOT_ID, SUPER_SLOT_NIBBLE,
};
pub use translate::{
    translate_address, PASS_THROUGH_MASK, SLOT_HIGH_HALF_BASE, SLOT_HIGH_HALF_BIT,
    SLOT_LOW_HALF_BASE, SUPER_SLOT_MASK, SUPER_SLOT_REMAP_BASE,
};

use crate::BusSample;

/// Everything the transaction state machine needs to know about one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AddressDecode {
    /// Window the address falls in.
    pub region: AddressRegion,
    /// Address after region remapping.
    pub translated: u32,
    /// Slot access below the 8 MiB midpoint (the frame-buffer half).
    pub slot_low_half: bool,
}

impl AddressDecode {
    /// Returns `true` when the bridge answers this address.
    #[must_use]
    pub const fn owned(&self) -> bool {
        self.region.is_owned()
    }

    /// Returns `true` for addresses routed to the wide memory port on a line
    /// read (super-slot or the slot frame-buffer half).
    #[must_use]
    pub const fn frame_buffer_readable(&self) -> bool {
        matches!(self.region, AddressRegion::SuperSlot) || self.slot_low_half
    }
}

/// Stateless decoder carrying the one capability switch the classifier has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AddressDecoder {
    memory_window_enabled: bool,
}

impl AddressDecoder {
    /// Creates a decoder; `memory_window_enabled` gates the Memory window.
    #[must_use]
    pub const fn new(memory_window_enabled: bool) -> Self {
        Self {
            memory_window_enabled,
        }
    }

    /// Returns whether the Memory window can be claimed.
    #[must_use]
    pub const fn memory_window_enabled(&self) -> bool {
        self.memory_window_enabled
    }

    /// Decodes the address lines of one bus sample.
    #[must_use]
    pub const fn decode(&self, sample: &BusSample) -> AddressDecode {
        let region = classify_region(
            sample.address,
            sample.memory_inhibit,
            self.memory_window_enabled,
        );
        AddressDecode {
            region,
            translated: translate_address(sample.address, region),
            slot_low_half: matches!(region, AddressRegion::Slot)
                && sample.address & SLOT_HIGH_HALF_BIT == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AddressDecoder, AddressRegion};
    use crate::BusSample;

    fn at(address: u32) -> BusSample {
        BusSample {
            address,
            ..BusSample::default()
        }
    }

    #[test]
    fn slot_halves_are_told_apart() {
        let decoder = AddressDecoder::default();

        let low = decoder.decode(&at(0xFE12_3456));
        assert_eq!(low.region, AddressRegion::Slot);
        assert!(low.slot_low_half);
        assert!(low.frame_buffer_readable());

        let high = decoder.decode(&at(0xFEC0_0000));
        assert!(!high.slot_low_half);
        assert!(!high.frame_buffer_readable());
        assert!(high.owned());
    }

    #[test]
    fn super_slot_reads_route_to_memory_port() {
        let decode = AddressDecoder::default().decode(&at(0xE123_4560));
        assert_eq!(decode.region, AddressRegion::SuperSlot);
        assert!(!decode.slot_low_half);
        assert!(decode.frame_buffer_readable());
        assert_eq!(decode.translated, 0x8123_4560);
    }

    #[test]
    fn memory_window_needs_the_capability_and_mi_negated() {
        let sample = at(0x3000_0010);
        assert!(!AddressDecoder::new(false).decode(&sample).owned());

        let enabled = AddressDecoder::new(true);
        assert!(enabled.memory_window_enabled());
        let decode = enabled.decode(&sample);
        assert_eq!(decode.region, AddressRegion::Memory);
        assert_eq!(decode.translated, 0x3000_0010);

        let inhibited = BusSample {
            memory_inhibit: true,
            ..sample
        };
        assert_eq!(enabled.decode(&inhibited).region, AddressRegion::None);
    }
}
