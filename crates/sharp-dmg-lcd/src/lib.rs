//! Sharp LR35902 LCD controller (Game Boy DMG and CGB).
//!
//! Models the mode sequencing of the LCD: OAM search, pixel transfer,
//! horizontal blank and vertical blank, with the timing quirks the hardware
//! exhibits, the STAT/LY/LYC registers and their interrupt line, and the
//! VRAM, OAM and palette lockouts the CPU sees.
//!
//! # Timing (DMG)
//!
//! - 4,194,304 Hz master clock
//! - 456 ticks per line, 154 lines, 70,224 ticks per frame
//! - Lines 0-143 visible, 144-153 vertical blank
//!
//! Beam position, frame start and vertical blank come from a
//! [`raster_screen::Screen`]; this crate supplies the phase machine that
//! runs in its phase slot. Pixel output is delegated to a
//! [`raster_screen::Renderer`].

mod config;
mod irq;
mod lcd;
mod phase;
mod registers;
mod snapshot;
mod timing;

pub use config::{
    DMG_CLOCK_HZ, DMG_FRAME_TICKS, DMG_HEIGHT, DMG_LINE_TICKS, DMG_VISIBLE, DMG_WIDTH, LcdConfig,
    MIN_FRAME_BLANK_LINES, Model, validate_display,
};
pub use irq::{INT_STAT, INT_VBLANK, StatIrq};
pub use lcd::Lcd;
pub use phase::{LineGeometry, Phase, needs_transfer_adjust};
pub use registers::{
    ADDR_BCPD, ADDR_BCPS, ADDR_LCDC, ADDR_LY, ADDR_LYC, ADDR_SCX, ADDR_STAT, CompareLatch,
    LCDC_ENABLE, Locks, Mode, OAM_END, OAM_START, OPEN_BUS, PaletteRam, STAT_COINCIDENCE,
    STAT_HBLANK_IRQ, STAT_LYC_IRQ, STAT_MODE_MASK, STAT_SEARCH_IRQ, STAT_VBLANK_IRQ,
    StatusRegister, VRAM_END, VRAM_START,
};
pub use snapshot::LcdSnapshot;
pub use timing::{DmgTiming, DurationInputs, OBJECT_PENALTY, PhaseDurationProvider};
