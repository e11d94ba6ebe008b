//! Display geometry and frame timing.

use emu_core::Ticks;

/// Inclusive rectangle in raster coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub min_x: u16,
    pub max_x: u16,
    pub min_y: u16,
    pub max_y: u16,
}

impl Rect {
    #[must_use]
    pub const fn new(min_x: u16, max_x: u16, min_y: u16, max_y: u16) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.max_x - self.min_x + 1
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        self.max_y - self.min_y + 1
    }
}

/// Reasons a display configuration is rejected.
///
/// All beam arithmetic divides by these quantities, so nothing is applied
/// when one is reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("raster width must be positive")]
    ZeroWidth,
    #[error("raster height must be positive")]
    ZeroHeight,
    #[error("frame period must be positive")]
    ZeroFramePeriod,
    #[error("visible area {visible:?} does not fit a {width}x{height} raster")]
    VisibleOutOfBounds {
        visible: Rect,
        width: u16,
        height: u16,
    },
    #[error("{pixels} pixels cannot fit in a {period}-tick frame")]
    PixelShorterThanTick { pixels: u64, period: Ticks },
    #[error("frame period {period} is not a whole number of {height}-line scans")]
    FractionalScanTime { period: Ticks, height: u16 },
    #[error("scan time {scan_time} is shorter than the {minimum}-tick minimum")]
    ScanTimeTooShort { scan_time: Ticks, minimum: Ticks },
    #[error("vertical blank of {lines} lines is shorter than the {minimum}-line minimum")]
    FrameBlankTooShort { lines: u16, minimum: u16 },
}

/// Raster geometry and frame timing. Immutable once built; replace it
/// wholesale to reconfigure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayConfig {
    width: u16,
    height: u16,
    visible: Rect,
    frame_period: Ticks,
}

impl DisplayConfig {
    /// Validate and build a configuration.
    pub const fn new(
        width: u16,
        height: u16,
        visible: Rect,
        frame_period: Ticks,
    ) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if frame_period.get() == 0 || frame_period.is_never() {
            return Err(ConfigError::ZeroFramePeriod);
        }
        if visible.min_x > visible.max_x
            || visible.min_y > visible.max_y
            || visible.max_x >= width
            || visible.max_y >= height
        {
            return Err(ConfigError::VisibleOutOfBounds {
                visible,
                width,
                height,
            });
        }
        let pixels = width as u64 * height as u64;
        if pixels > frame_period.get() {
            return Err(ConfigError::PixelShorterThanTick {
                pixels,
                period: frame_period,
            });
        }
        Ok(Self {
            width,
            height,
            visible,
            frame_period,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[must_use]
    pub const fn visible(&self) -> Rect {
        self.visible
    }

    #[must_use]
    pub const fn frame_period(&self) -> Ticks {
        self.frame_period
    }

    /// Pixels per frame.
    #[must_use]
    pub const fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// First line of the vertical blank (the line after the visible area).
    #[must_use]
    pub const fn vblank_start_line(&self) -> u16 {
        (self.visible.max_y + 1) % self.height
    }

    /// Lines between vertical-blank start and line 0 of the next frame.
    #[must_use]
    pub const fn vblank_lines(&self) -> u16 {
        (self.height - self.vblank_start_line()) % self.height
    }

    /// Scan time if it is a whole number of ticks.
    #[must_use]
    pub const fn whole_scan_time(&self) -> Option<Ticks> {
        let period = self.frame_period.get();
        let height = self.height as u64;
        if period % height == 0 {
            Some(Ticks::new(period / height))
        } else {
            None
        }
    }

    /// Scan time rounded down to a whole tick.
    #[must_use]
    pub const fn scan_time_floor(&self) -> Ticks {
        Ticks::new(self.frame_period.get() / self.height as u64)
    }

    /// Vertical-blank duration, rounded down to a whole tick.
    #[must_use]
    pub const fn vblank_duration(&self) -> Ticks {
        let lines = self.vblank_lines() as u128;
        let period = self.frame_period.get() as u128;
        Ticks::new((lines * period / self.height as u128) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dmg_visible() -> Rect {
        Rect::new(0, 159, 0, 143)
    }

    #[test]
    fn rejects_zero_dimensions() {
        let period = Ticks::new(70_224);
        assert_eq!(
            DisplayConfig::new(0, 154, dmg_visible(), period),
            Err(ConfigError::ZeroWidth)
        );
        assert_eq!(
            DisplayConfig::new(456, 0, dmg_visible(), period),
            Err(ConfigError::ZeroHeight)
        );
        assert_eq!(
            DisplayConfig::new(456, 154, dmg_visible(), Ticks::ZERO),
            Err(ConfigError::ZeroFramePeriod)
        );
    }

    #[test]
    fn rejects_visible_area_outside_raster() {
        let err = DisplayConfig::new(456, 154, Rect::new(0, 159, 0, 154), Ticks::new(70_224));
        assert!(matches!(err, Err(ConfigError::VisibleOutOfBounds { .. })));
        let inverted = DisplayConfig::new(456, 154, Rect::new(10, 5, 0, 143), Ticks::new(70_224));
        assert!(matches!(inverted, Err(ConfigError::VisibleOutOfBounds { .. })));
    }

    #[test]
    fn rejects_sub_tick_pixels() {
        let err = DisplayConfig::new(457, 154, dmg_visible(), Ticks::new(70_224));
        assert!(matches!(err, Err(ConfigError::PixelShorterThanTick { .. })));
    }

    #[test]
    fn vblank_geometry() {
        let config = DisplayConfig::new(456, 154, dmg_visible(), Ticks::new(70_224)).unwrap();
        assert_eq!(config.vblank_start_line(), 144);
        assert_eq!(config.vblank_lines(), 10);
        assert_eq!(config.whole_scan_time(), Some(Ticks::new(456)));
        assert_eq!(config.vblank_duration(), Ticks::new(4_560));
    }

    #[test]
    fn fractional_scan_time() {
        // 16,666 / 154 = 108.22 ticks per line
        let config =
            DisplayConfig::new(100, 154, Rect::new(0, 99, 0, 143), Ticks::new(16_666)).unwrap();
        assert_eq!(config.whole_scan_time(), None);
        assert_eq!(config.scan_time_floor(), Ticks::new(108));
    }

    #[test]
    fn full_height_visible_area_wraps_vblank_to_line_zero() {
        let config = DisplayConfig::new(10, 10, Rect::new(0, 9, 0, 9), Ticks::new(100)).unwrap();
        assert_eq!(config.vblank_start_line(), 0);
        assert_eq!(config.vblank_lines(), 0);
        assert_eq!(config.vblank_duration(), Ticks::ZERO);
    }
}
