use crate::address::AddressDecode;
use crate::BusSample;

/// States of the transaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SlaveState {
    /// Waiting for a transfer start in an owned window.
    #[default]
    Idle,
    /// Read admitted; waiting for queued writes to retire.
    DelayRead,
    /// Register-bus read outstanding.
    Read,
    /// Single write admitted; waiting for a front-queue slot.
    DelayWrite,
    /// Burst write admitted; waiting for four front-queue slots.
    DelayBurstWrite,
    /// Queueing one register write per beat.
    BurstWrite,
    /// Frame-buffer burst write admitted; waiting for a burst-queue slot.
    DelayFrameBurstWrite,
    /// Collecting beats into the line buffer.
    FrameBurstWrite,
    /// Frame-buffer burst read admitted; waiting for the ordering guard and
    /// memory command acceptance.
    DelayFrameBurstReadWait,
    /// Memory read command issued; waiting for the line.
    FrameBurstReadWait,
    /// Handing out beats 1 to 3 of the fetched line.
    FrameBurstRead,
}

impl SlaveState {
    /// Returns `true` for the admission-retry states.
    #[must_use]
    pub const fn is_delay(self) -> bool {
        matches!(
            self,
            Self::DelayRead
                | Self::DelayWrite
                | Self::DelayBurstWrite
                | Self::DelayFrameBurstWrite
                | Self::DelayFrameBurstReadWait
        )
    }

    /// Transaction kind this state serves, `None` in [`SlaveState::Idle`].
    #[must_use]
    pub const fn kind(self) -> Option<AdmissionKind> {
        match self {
            Self::Idle => None,
            Self::DelayRead | Self::Read => Some(AdmissionKind::Read),
            Self::DelayWrite => Some(AdmissionKind::Write),
            Self::DelayBurstWrite | Self::BurstWrite => Some(AdmissionKind::BurstWrite),
            Self::DelayFrameBurstWrite | Self::FrameBurstWrite => {
                Some(AdmissionKind::FrameBurstWrite)
            }
            Self::DelayFrameBurstReadWait | Self::FrameBurstReadWait | Self::FrameBurstRead => {
                Some(AdmissionKind::FrameBurstRead)
            }
        }
    }
}

/// Transaction kinds decided at admission, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AdmissionKind {
    /// Line write into the slot frame-buffer half, routed to the memory port.
    FrameBurstWrite,
    /// Line read from the super-slot or the slot frame-buffer half, routed to
    /// the memory port.
    FrameBurstRead,
    /// Any other owned line write, split into four register writes.
    BurstWrite,
    /// Any other owned read.
    Read,
    /// Any other owned write.
    Write,
}

impl AdmissionKind {
    /// Decides the kind of a newly started bus cycle, or `None` when the
    /// bridge does not answer it.
    #[must_use]
    pub const fn classify(sample: &BusSample, decode: &AddressDecode) -> Option<Self> {
        if !sample.transfer_start || !decode.owned() {
            return None;
        }
        let write = sample.is_write();
        let line = sample.is_line();
        Some(if write && line && decode.slot_low_half {
            Self::FrameBurstWrite
        } else if !write && line && decode.frame_buffer_readable() {
            Self::FrameBurstRead
        } else if write && line {
            Self::BurstWrite
        } else if !write {
            Self::Read
        } else {
            Self::Write
        })
    }

    /// Delay state entered when admission cannot proceed at once.
    #[must_use]
    pub const fn delay_state(self) -> SlaveState {
        match self {
            Self::FrameBurstWrite => SlaveState::DelayFrameBurstWrite,
            Self::FrameBurstRead => SlaveState::DelayFrameBurstReadWait,
            Self::BurstWrite => SlaveState::DelayBurstWrite,
            Self::Read => SlaveState::DelayRead,
            Self::Write => SlaveState::DelayWrite,
        }
    }
}

/// Transaction captured at admission. Later states act on this, never on
/// re-sampled address or control lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Admission {
    /// Decided kind.
    pub kind: AdmissionKind,
    /// Translated byte address.
    pub address: u32,
    /// Raw size code.
    pub size: u8,
    /// Byte-lane enables for the size and alignment.
    pub byte_enable: u8,
}

impl Admission {
    /// Whether acknowledges of a single transfer carry burst inhibit.
    #[must_use]
    pub const fn inhibits_burst(&self) -> bool {
        self.size == 3
    }
}
