//! Bridge construction parameters.

use crate::ConfigError;

/// Beats in one processor line (burst) transfer.
pub const BURST_BEATS: usize = 4;

/// Default depth of the processor-clock front write queue.
pub const FRONT_QUEUE_DEPTH: usize = 8;

/// Default depth of the domain-crossing back write queue.
pub const BACK_QUEUE_DEPTH: usize = 32;

/// Default depth of the frame-buffer burst write queue.
pub const BURST_QUEUE_DEPTH: usize = 8;

/// Capability flag for the Memory address window.
///
/// Held off: enabling the window at `0x3000_0000` upsets the host's memory
/// controller bank probing at boot.
pub const MEMORY_WINDOW_ENABLED: bool = false;

/// Top-level immutable configuration for a bridge instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BridgeConfig {
    /// Entries in the processor-clock front write queue.
    pub front_queue_depth: usize,
    /// Entries in the domain-crossing back write queue (power of two).
    pub back_queue_depth: usize,
    /// Lines in the burst write queue.
    pub burst_queue_depth: usize,
    /// Claims the Memory window when set.
    pub memory_window_enabled: bool,
    /// Stores front-queue data inverted and restores it on the move into the
    /// back queue.
    pub invert_crossing_data: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            front_queue_depth: FRONT_QUEUE_DEPTH,
            back_queue_depth: BACK_QUEUE_DEPTH,
            burst_queue_depth: BURST_QUEUE_DEPTH,
            memory_window_enabled: MEMORY_WINDOW_ENABLED,
            invert_crossing_data: false,
        }
    }
}

impl BridgeConfig {
    /// Checks queue geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for zero depths, a front queue that cannot
    /// take a whole burst, or a back queue depth that is not a power of two.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.front_queue_depth == 0 {
            return Err(ConfigError::ZeroDepth { queue: "front" });
        }
        if self.back_queue_depth == 0 {
            return Err(ConfigError::ZeroDepth { queue: "back" });
        }
        if self.burst_queue_depth == 0 {
            return Err(ConfigError::ZeroDepth { queue: "burst" });
        }
        if self.front_queue_depth < BURST_BEATS {
            return Err(ConfigError::FrontTooShallow {
                depth: self.front_queue_depth,
                beats: BURST_BEATS,
            });
        }
        if !self.back_queue_depth.is_power_of_two() {
            return Err(ConfigError::BackDepthNotPowerOfTwo {
                depth: self.back_queue_depth,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BridgeConfig, BACK_QUEUE_DEPTH, BURST_QUEUE_DEPTH, FRONT_QUEUE_DEPTH};
    use crate::ConfigError;

    #[test]
    fn default_config_matches_hardware_geometry() {
        let config = BridgeConfig::default();

        assert_eq!(config.front_queue_depth, FRONT_QUEUE_DEPTH);
        assert_eq!(config.back_queue_depth, BACK_QUEUE_DEPTH);
        assert_eq!(config.burst_queue_depth, BURST_QUEUE_DEPTH);
        assert!(!config.memory_window_enabled);
        assert!(!config.invert_crossing_data);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_depths_are_rejected_per_queue() {
        let front = BridgeConfig {
            front_queue_depth: 0,
            ..BridgeConfig::default()
        };
        assert_eq!(
            front.validate(),
            Err(ConfigError::ZeroDepth { queue: "front" })
        );

        let burst = BridgeConfig {
            burst_queue_depth: 0,
            ..BridgeConfig::default()
        };
        assert_eq!(
            burst.validate(),
            Err(ConfigError::ZeroDepth { queue: "burst" })
        );
    }

    #[test]
    fn front_queue_must_hold_a_burst() {
        let config = BridgeConfig {
            front_queue_depth: 3,
            ..BridgeConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::FrontTooShallow { depth: 3, beats: 4 })
        );
    }

    #[test]
    fn back_queue_depth_must_be_power_of_two() {
        let config = BridgeConfig {
            back_queue_depth: 24,
            ..BridgeConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BackDepthNotPowerOfTwo { depth: 24 })
        );
    }
}
