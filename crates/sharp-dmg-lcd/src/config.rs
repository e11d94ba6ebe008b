//! Controller configuration and presets.

use emu_core::{MasterClock, Ticks};
use raster_screen::{ConfigError, DisplayConfig, Rect};

/// Game Boy master clock.
pub const DMG_CLOCK_HZ: u64 = 4_194_304;
/// Ticks per frame: 154 lines of 456.
pub const DMG_FRAME_TICKS: u64 = 70_224;
pub const DMG_LINE_TICKS: u64 = 456;
pub const DMG_WIDTH: u16 = 456;
pub const DMG_HEIGHT: u16 = 154;
/// 160x144 visible.
pub const DMG_VISIBLE: Rect = Rect::new(0, 159, 0, 143);
/// Vertical-blank lines the phase machine needs: one to enter, one to wrap.
pub const MIN_FRAME_BLANK_LINES: u16 = 2;

const DMG_DISPLAY: DisplayConfig = match DisplayConfig::new(
    DMG_WIDTH,
    DMG_HEIGHT,
    DMG_VISIBLE,
    Ticks::new(DMG_FRAME_TICKS),
) {
    Ok(display) => display,
    Err(_) => panic!("Game Boy raster geometry is invalid"),
};

/// Controller revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Model {
    /// Original monochrome unit, with the STAT write quirk.
    #[default]
    Dmg,
    /// Colour unit.
    Cgb,
}

impl Model {
    /// Does a STAT write during mode 0 or 1 raise a spurious interrupt?
    #[must_use]
    pub const fn has_stat_write_quirk(self) -> bool {
        matches!(self, Model::Dmg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LcdConfig {
    pub model: Model,
    pub clock: MasterClock,
    pub display: DisplayConfig,
}

impl LcdConfig {
    #[must_use]
    pub const fn dmg() -> Self {
        Self {
            model: Model::Dmg,
            clock: MasterClock::new(DMG_CLOCK_HZ),
            display: DMG_DISPLAY,
        }
    }

    #[must_use]
    pub const fn cgb() -> Self {
        Self {
            model: Model::Cgb,
            ..Self::dmg()
        }
    }

    /// Same model and clock, different raster.
    #[must_use]
    pub const fn with_display(self, display: DisplayConfig) -> Self {
        Self { display, ..self }
    }

    /// Frames per second at the master clock.
    #[must_use]
    pub fn frame_rate(&self) -> f64 {
        self.clock.frame_rate(self.display.frame_period())
    }
}

/// Check a raster against what the phase machine needs: whole-tick lines of
/// at least `min_scan_time` and room for the vertical-blank sequence.
pub fn validate_display(
    display: &DisplayConfig,
    min_scan_time: Ticks,
) -> Result<Ticks, ConfigError> {
    let Some(scan_time) = display.whole_scan_time() else {
        return Err(ConfigError::FractionalScanTime {
            period: display.frame_period(),
            height: display.height(),
        });
    };
    if scan_time < min_scan_time {
        return Err(ConfigError::ScanTimeTooShort {
            scan_time,
            minimum: min_scan_time,
        });
    }
    let lines = display.vblank_lines();
    if lines < MIN_FRAME_BLANK_LINES {
        return Err(ConfigError::FrameBlankTooShort {
            lines,
            minimum: MIN_FRAME_BLANK_LINES,
        });
    }
    Ok(scan_time)
}
