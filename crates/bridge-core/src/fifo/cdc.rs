//! Clock-domain crossing helpers.

/// Flops in every synchronizer chain.
pub const SYNC_STAGES: usize = 2;

/// Multi-flop synchronizer clocked by the destination domain.
///
/// A value presented at the input becomes visible at the output after
/// [`SYNC_STAGES`] destination edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Synchronizer<T> {
    stages: [T; SYNC_STAGES],
}

impl<T: Copy> Synchronizer<T> {
    /// Creates a chain with every flop at `reset`.
    #[must_use]
    pub const fn new(reset: T) -> Self {
        Self {
            stages: [reset; SYNC_STAGES],
        }
    }

    /// One destination clock edge sampling `input`.
    pub fn tick(&mut self, input: T) {
        self.stages.rotate_right(1);
        self.stages[0] = input;
    }

    /// Value at the end of the chain.
    #[must_use]
    pub const fn output(&self) -> T {
        self.stages[SYNC_STAGES - 1]
    }

    /// Forces every flop to `value`.
    pub fn reset(&mut self, value: T) {
        self.stages = [value; SYNC_STAGES];
    }
}

/// Binary to reflected gray code.
#[must_use]
pub const fn gray_encode(value: usize) -> usize {
    value ^ (value >> 1)
}

/// Reflected gray code to binary.
#[must_use]
pub const fn gray_decode(gray: usize) -> usize {
    let mut value = gray;
    let mut shift = gray >> 1;
    while shift != 0 {
        value ^= shift;
        shift >>= 1;
    }
    value
}
