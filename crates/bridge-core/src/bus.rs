//! Processor-side bus signals as seen at one processor clock edge.

/// Direction of a processor bus transfer (`R/W` line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// Processor reads from the bridge (`R/W` high).
    #[default]
    Read,
    /// Processor writes to the bridge (`R/W` low).
    Write,
}

/// Decoded 2-bit `SIZ` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum TransferSize {
    /// 32-bit long word.
    Long = 0,
    /// Single byte.
    Byte = 1,
    /// 16-bit word.
    Word = 2,
    /// 16-byte line, transferred as a four-beat burst.
    Line = 3,
}

impl TransferSize {
    /// Converts a raw `SIZ` value. Values above `3` have no meaning.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Long),
            1 => Some(Self::Byte),
            2 => Some(Self::Word),
            3 => Some(Self::Line),
            _ => None,
        }
    }

    /// Returns the raw `SIZ` value.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Processor bus signals sampled at one processor clock edge.
///
/// Active-low pins are stored as "asserted" booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusSample {
    /// `A[31:0]`.
    pub address: u32,
    /// `D[31:0]` as driven by the processor, in processor byte order.
    pub data: u32,
    /// `R/W`.
    pub direction: Direction,
    /// Raw `SIZ[1:0]`; kept raw so out-of-table codes stay representable.
    pub size: u8,
    /// `TS` asserted (single cycle per transfer).
    pub transfer_start: bool,
    /// `TT[1:0]`.
    pub transfer_type: u8,
    /// `TM[2:0]`.
    pub transfer_modifier: u8,
    /// `MI` asserted.
    pub memory_inhibit: bool,
    /// `TIP` asserted.
    pub transfer_in_progress: bool,
}

impl BusSample {
    /// Decoded size, if the raw code is one of the four defined values.
    #[must_use]
    pub const fn transfer_size(&self) -> Option<TransferSize> {
        TransferSize::from_code(self.size)
    }

    /// Returns `true` for a line (burst) size code.
    #[must_use]
    pub const fn is_line(&self) -> bool {
        self.size == TransferSize::Line as u8
    }

    /// Returns `true` for a write cycle.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(self.direction, Direction::Write)
    }
}

/// Drive level of one three-state, active-low processor control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Line {
    /// Output enable off; the pin floats.
    #[default]
    Released,
    /// Driven high (inactive).
    Negated,
    /// Driven low (active).
    Asserted,
}

impl Line {
    /// Returns `true` when the line is driven active.
    #[must_use]
    pub const fn is_asserted(self) -> bool {
        matches!(self, Self::Asserted)
    }

    /// Returns `true` when the bridge drives the pin at all.
    #[must_use]
    pub const fn is_driven(self) -> bool {
        !matches!(self, Self::Released)
    }

    /// Electrical pin level, or `None` when floating.
    #[must_use]
    pub const fn pin_level(self) -> Option<bool> {
        match self {
            Self::Released => None,
            Self::Negated => Some(true),
            Self::Asserted => Some(false),
        }
    }

    /// Selects between the two driven levels.
    #[must_use]
    pub const fn driven(asserted: bool) -> Self {
        if asserted {
            Self::Asserted
        } else {
            Self::Negated
        }
    }
}

/// Processor-facing outputs for one processor clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusResponse {
    /// `TA`.
    pub transfer_ack: Line,
    /// `TEA`. Never asserted by this bridge.
    pub error_ack: Line,
    /// `TBI`.
    pub burst_inhibit: Line,
    /// `D[31:0]` when the bridge drives read data, in processor byte order.
    pub data: Option<u32>,
}

impl BusResponse {
    /// All handshake lines floating and the data bus released.
    #[must_use]
    pub const fn released() -> Self {
        Self {
            transfer_ack: Line::Released,
            error_ack: Line::Released,
            burst_inhibit: Line::Released,
            data: None,
        }
    }

    /// All handshake lines driven inactive.
    #[must_use]
    pub const fn negated() -> Self {
        Self {
            transfer_ack: Line::Negated,
            error_ack: Line::Negated,
            burst_inhibit: Line::Negated,
            data: None,
        }
    }

    /// Transfer acknowledge for one beat, optionally with burst inhibit.
    #[must_use]
    pub const fn acknowledge(data: Option<u32>, inhibit_burst: bool) -> Self {
        Self {
            transfer_ack: Line::Asserted,
            error_ack: Line::Negated,
            burst_inhibit: Line::driven(inhibit_burst),
            data,
        }
    }
}

/// Swaps byte lanes 0<->3 and 1<->2 between processor and downstream order.
///
/// The same swap is applied in both directions.
#[must_use]
pub const fn reverse_lanes(value: u32) -> u32 {
    value.swap_bytes()
}
