//! Raster clock: timestamp <-> beam position.
//!
//! The clock is anchored on the tick at which the beam stood at (0,0), the
//! end of the previous vertical blank. All conversions are exact rational
//! arithmetic in 128-bit integers, with the sub-tick remainder rounded to the
//! nearest pixel, so no drift builds up over any number of frames.

use emu_core::Ticks;

use crate::config::DisplayConfig;

/// A beam coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeamPosition {
    pub x: u16,
    pub y: u16,
}

impl BeamPosition {
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Maps simulated time to beam position and back.
#[derive(Debug, Clone)]
pub struct RasterClock {
    config: DisplayConfig,
    /// Tick at which the beam was at (0,0). May predate tick zero.
    origin: i64,
    /// Tick at which the most recent vertical blank began.
    vblank_start: i64,
}

impl RasterClock {
    /// A clock whose frame starts at `now`.
    #[must_use]
    pub fn new(config: DisplayConfig, now: Ticks) -> Self {
        let mut clock = Self {
            config,
            origin: 0,
            vblank_start: 0,
        };
        clock.reset_origin(now, 0, 0);
        clock
    }

    #[must_use]
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Swap in a new configuration without touching the origin. Callers that
    /// change the geometry rebase with [`RasterClock::reset_origin`] after.
    pub fn set_config(&mut self, config: DisplayConfig) {
        self.config = config;
    }

    /// Tick at which the beam was at (0,0) of the reference frame.
    #[must_use]
    pub fn vblank_end_time(&self) -> i64 {
        self.origin
    }

    /// Tick at which the most recent vertical blank began.
    #[must_use]
    pub fn vblank_start_time(&self) -> i64 {
        self.vblank_start
    }

    /// Record that a vertical blank began at `now`.
    pub fn mark_vblank_start(&mut self, now: Ticks) {
        self.vblank_start = to_signed(now);
    }

    /// Reinstate a previously captured origin and vblank start.
    pub fn restore(&mut self, origin: i64, vblank_start: i64) {
        self.origin = origin;
        self.vblank_start = vblank_start;
    }

    /// Beam position at `now`.
    #[must_use]
    pub fn position_at(&self, now: Ticks) -> BeamPosition {
        let pixel = self.pixel_at(to_signed(now));
        let width = u128::from(self.config.width());
        BeamPosition {
            x: (pixel % width) as u16,
            y: (pixel / width) as u16,
        }
    }

    /// Time from `now` until the beam next reaches `(x, y)`.
    ///
    /// A target already reached (within half a pixel of `now`) is pushed to
    /// the following frame, so the result is never zero.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the raster.
    #[must_use]
    pub fn time_until(&self, now: Ticks, x: u16, y: u16) -> Ticks {
        assert!(
            x < self.config.width() && y < self.config.height(),
            "beam position ({x},{y}) outside {}x{} raster",
            self.config.width(),
            self.config.height()
        );
        let period = i128::from(self.config.frame_period().get());
        let pixels = i128::from(self.config.pixels());
        let current = self.elapsed_in_frame(to_signed(now));
        let mut target = i128::from(self.pixel_offset(x, y));
        while 2 * target * pixels <= 2 * current * pixels + period {
            target += period;
        }
        Ticks::new((target - current) as u64)
    }

    /// Rebase the origin so that `now` maps exactly to `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the raster.
    pub fn reset_origin(&mut self, now: Ticks, x: u16, y: u16) {
        assert!(
            x < self.config.width() && y < self.config.height(),
            "beam position ({x},{y}) outside {}x{} raster",
            self.config.width(),
            self.config.height()
        );
        self.origin = to_signed(now) - self.pixel_offset(x, y) as i64;
        let vblank_line = self.config.vblank_start_line();
        let vblank_offset = self.pixel_offset(0, vblank_line) as i64;
        let period = self.config.frame_period().get() as i64;
        // Most recent vblank start at or before the origin's frame.
        let wrap = if vblank_offset > 0 { period } else { 0 };
        self.vblank_start = self.origin + vblank_offset - wrap;
    }

    /// Earliest tick offset from the origin whose rounded position is `(x, y)`.
    #[must_use]
    pub fn pixel_offset(&self, x: u16, y: u16) -> u64 {
        let pixel = u128::from(y) * u128::from(self.config.width()) + u128::from(x);
        if pixel == 0 {
            return 0;
        }
        let period = u128::from(self.config.frame_period().get());
        let pixels = u128::from(self.config.pixels());
        // Smallest t with round_half_up(t * pixels / period) >= pixel.
        ((2 * pixel - 1) * period).div_ceil(2 * pixels) as u64
    }

    /// Next tick, at or after `now`, at which a frame begins.
    #[must_use]
    pub fn next_frame_start(&self, now: Ticks) -> Ticks {
        let current = self.elapsed_in_frame(to_signed(now));
        if current == 0 {
            now
        } else {
            let period = i128::from(self.config.frame_period().get());
            now + Ticks::new((period - current) as u64)
        }
    }

    /// Tick offset of `now` within its frame.
    #[must_use]
    pub fn frame_offset(&self, now: Ticks) -> Ticks {
        Ticks::new(self.elapsed_in_frame(to_signed(now)) as u64)
    }

    /// Is the beam inside the vertical blank at `now`?
    #[must_use]
    pub fn in_vblank(&self, now: Ticks) -> bool {
        let y = self.position_at(now).y;
        let visible = self.config.visible();
        y < visible.min_y || y > visible.max_y
    }

    fn elapsed_in_frame(&self, now: i64) -> i128 {
        let period = i128::from(self.config.frame_period().get());
        (i128::from(now) - i128::from(self.origin)).rem_euclid(period)
    }

    fn pixel_at(&self, now: i64) -> u128 {
        let period = self.config.frame_period().get() as u128;
        let pixels = u128::from(self.config.pixels());
        let elapsed = self.elapsed_in_frame(now) as u128;
        // Round to the nearest pixel.
        ((2 * elapsed * pixels + period) / (2 * period)) % pixels
    }
}

fn to_signed(ticks: Ticks) -> i64 {
    i64::try_from(ticks.get()).unwrap_or(i64::MAX)
}
