use thiserror::Error;

/// Rejected [`BridgeConfig`](crate::BridgeConfig) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// A queue was configured without any storage.
    #[error("{queue} queue depth must be non-zero")]
    ZeroDepth {
        /// Name of the offending queue.
        queue: &'static str,
    },
    /// The front write queue cannot hold a whole burst.
    #[error("front queue depth {depth} cannot hold a {beats}-beat burst")]
    FrontTooShallow {
        /// Configured front depth.
        depth: usize,
        /// Beats that must fit at burst admission.
        beats: usize,
    },
    /// Gray-coded pointers require a power-of-two depth.
    #[error("back queue depth {depth} is not a power of two")]
    BackDepthNotPowerOfTwo {
        /// Configured back depth.
        depth: usize,
    },
}

/// Queue handshake violations.
///
/// Producers and consumers are expected to check `writable`/`readable`
/// before touching a queue, so these only surface on a sequencing bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum QueueError {
    /// Push attempted while the queue had no free slot.
    #[error("push into full queue (depth {depth})")]
    Full {
        /// Capacity of the refusing queue.
        depth: usize,
    },
    /// Pop attempted while the queue had nothing readable.
    #[error("pop from empty queue")]
    Empty,
}
