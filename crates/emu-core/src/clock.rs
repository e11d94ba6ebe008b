//! Master crystal.

use crate::Ticks;

/// The crystal every [`Ticks`] count refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g., `4_194_304` for the Game Boy).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Frame rate in Hz for a frame lasting `frame_period` ticks.
    ///
    /// Returns 0.0 for a zero-length period.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn frame_rate(&self, frame_period: Ticks) -> f64 {
        if frame_period.get() == 0 {
            return 0.0;
        }
        self.frequency_hz as f64 / frame_period.get() as f64
    }
}
