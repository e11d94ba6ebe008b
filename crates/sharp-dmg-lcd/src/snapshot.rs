//! Save-state capture.
//!
//! A snapshot holds everything the engine mutates while running. The
//! configuration, renderer and listeners are not part of it: restore into an
//! engine built with the same [`LcdConfig`](crate::LcdConfig).

use raster_screen::ScreenState;

use crate::irq::StatIrq;
use crate::lcd::Lcd;
use crate::phase::Phase;
use crate::registers::{CompareLatch, Locks, Mode, PaletteRam, StatusRegister};
use crate::timing::PhaseDurationProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LcdSnapshot {
    pub screen: ScreenState<Phase>,
    pub phase: Phase,
    pub phase_started: i64,
    pub line_start: i64,
    pub lcdc: u8,
    pub stat: StatusRegister,
    pub internal_mode: Mode,
    pub scx: u8,
    pub line_scx: u8,
    pub ly: u16,
    pub lyc: CompareLatch,
    pub irq: StatIrq,
    pub interrupts: u8,
    pub locks: Locks,
    pub objects: u8,
    pub vram: Vec<u8>,
    pub oam: Vec<u8>,
    pub palette: PaletteRam,
}

impl<P: PhaseDurationProvider> Lcd<P> {
    #[must_use]
    pub fn snapshot(&self) -> LcdSnapshot {
        LcdSnapshot {
            screen: self.screen.state(),
            phase: self.phase,
            phase_started: self.phase_started,
            line_start: self.line_start,
            lcdc: self.lcdc,
            stat: self.stat,
            internal_mode: self.internal_mode,
            scx: self.scx,
            line_scx: self.line_scx,
            ly: self.ly,
            lyc: self.lyc,
            irq: self.irq,
            interrupts: self.interrupts,
            locks: self.locks,
            objects: self.objects,
            vram: self.vram.clone(),
            oam: self.oam.clone(),
            palette: self.palette.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &LcdSnapshot) {
        log::debug!("restoring LCD state at {}", snapshot.screen.now);
        self.screen.restore_state(&snapshot.screen);
        self.phase = snapshot.phase;
        self.phase_started = snapshot.phase_started;
        self.line_start = snapshot.line_start;
        self.lcdc = snapshot.lcdc;
        self.stat = snapshot.stat;
        self.internal_mode = snapshot.internal_mode;
        self.scx = snapshot.scx;
        self.line_scx = snapshot.line_scx;
        self.ly = snapshot.ly;
        self.lyc = snapshot.lyc;
        self.irq = snapshot.irq;
        self.interrupts = snapshot.interrupts;
        self.locks = snapshot.locks;
        self.objects = snapshot.objects;
        self.vram.clone_from(&snapshot.vram);
        self.oam.clone_from(&snapshot.oam);
        self.palette.clone_from(&snapshot.palette);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LcdConfig;
    use emu_core::{Bus, Ticks};
    use raster_screen::NullRenderer;

    #[test]
    fn restore_resumes_identically() {
        let mut lcd = Lcd::new(LcdConfig::dmg(), Box::new(NullRenderer)).unwrap();
        lcd.write(0xFF41, 0x48);
        lcd.write(0xFF45, 30);
        lcd.run_until(Ticks::new(12_345));
        let snapshot = lcd.snapshot();

        lcd.run_until(Ticks::new(80_000));
        let expected = (lcd.phase(), lcd.ly(), lcd.take_interrupts(), lcd.position());

        let mut other = Lcd::new(LcdConfig::dmg(), Box::new(NullRenderer)).unwrap();
        other.restore(&snapshot);
        assert_eq!(other.snapshot(), snapshot);
        other.run_until(Ticks::new(80_000));
        assert_eq!(
            (other.phase(), other.ly(), other.take_interrupts(), other.position()),
            expected
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_survives_json() {
        let mut lcd = Lcd::new(LcdConfig::dmg(), Box::new(NullRenderer)).unwrap();
        lcd.run_until(Ticks::new(70_000));
        let snapshot = lcd.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: LcdSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
