//! LCD register view and the lockable stores.

/// LCDC bit 7: display enable.
pub const LCDC_ENABLE: u8 = 0x80;

/// STAT bit 6: LY=LYC interrupt source.
pub const STAT_LYC_IRQ: u8 = 0x40;
/// STAT bit 5: mode 2 (OAM search) interrupt source.
pub const STAT_SEARCH_IRQ: u8 = 0x20;
/// STAT bit 4: mode 1 (vertical blank) interrupt source.
pub const STAT_VBLANK_IRQ: u8 = 0x10;
/// STAT bit 3: mode 0 (horizontal blank) interrupt source.
pub const STAT_HBLANK_IRQ: u8 = 0x08;
/// STAT bit 2: LY == LYC.
pub const STAT_COINCIDENCE: u8 = 0x04;
pub const STAT_MODE_MASK: u8 = 0x03;
/// Bits the CPU may write.
pub const STAT_WRITABLE: u8 = 0x78;
/// Bit 7 has no function and always reads back set.
const STAT_UNUSED: u8 = 0x80;

pub const ADDR_LCDC: u16 = 0xFF40;
pub const ADDR_STAT: u16 = 0xFF41;
pub const ADDR_SCX: u16 = 0xFF43;
pub const ADDR_LY: u16 = 0xFF44;
pub const ADDR_LYC: u16 = 0xFF45;
pub const ADDR_BCPS: u16 = 0xFF68;
pub const ADDR_BCPD: u16 = 0xFF69;

pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9FFF;
pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFE9F;
pub const VRAM_SIZE: usize = 0x2000;
pub const OAM_SIZE: usize = 0xA0;

/// Value read from a locked or unmapped location.
pub const OPEN_BUS: u8 = 0xFF;

/// STAT mode field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    #[default]
    HBlank = 0,
    VBlank = 1,
    Search = 2,
    Transfer = 3,
}

impl Mode {
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// STAT as the CPU sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusRegister {
    bits: u8,
}

impl StatusRegister {
    #[must_use]
    pub const fn read(self) -> u8 {
        self.bits | STAT_UNUSED
    }

    /// CPU write: only the interrupt enables change.
    pub fn write(&mut self, value: u8) {
        self.bits = (self.bits & !STAT_WRITABLE) | (value & STAT_WRITABLE);
    }

    #[must_use]
    pub const fn mode(self) -> u8 {
        self.bits & STAT_MODE_MASK
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.bits = (self.bits & !STAT_MODE_MASK) | mode.bits();
    }

    #[must_use]
    pub const fn coincidence(self) -> bool {
        self.bits & STAT_COINCIDENCE != 0
    }

    pub fn set_coincidence(&mut self, on: bool) {
        if on {
            self.bits |= STAT_COINCIDENCE;
        } else {
            self.bits &= !STAT_COINCIDENCE;
        }
    }

    /// Is the given interrupt source bit enabled?
    #[must_use]
    pub const fn enabled(self, source: u8) -> bool {
        self.bits & source != 0
    }

    /// Degenerate state while the display is off.
    pub fn clear_status(&mut self) {
        self.bits &= STAT_WRITABLE;
    }
}

/// LYC with its compare-window buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompareLatch {
    /// Value the comparator uses.
    value: u8,
    /// Write made inside the compare window, not yet visible to the
    /// comparator.
    pending: Option<u8>,
}

impl CompareLatch {
    /// Last written value.
    #[must_use]
    pub fn read(self) -> u8 {
        self.pending.unwrap_or(self.value)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.value
    }

    pub fn buffer(&mut self, value: u8) {
        self.pending = Some(value);
    }

    pub fn take_pending(&mut self) -> Option<u8> {
        self.pending.take()
    }

    pub fn set(&mut self, value: u8) {
        self.value = value;
        self.pending = None;
    }
}

/// Which stores the CPU is currently locked out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Locks {
    pub vram: bool,
    pub oam: bool,
    pub palette: bool,
}

impl Locks {
    pub fn unlock_all(&mut self) {
        *self = Self::default();
    }
}

const PALETTE_SIZE: usize = 64;
const PALETTE_AUTO_INCREMENT: u8 = 0x80;
const PALETTE_INDEX_MASK: u8 = 0x3F;

/// Background palette memory behind BCPS/BCPD.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteRam {
    /// BCPS: bit 7 auto-increment, bits 0-5 index.
    select: u8,
    data: Vec<u8>,
}

impl Default for PaletteRam {
    fn default() -> Self {
        Self {
            select: 0,
            data: vec![0; PALETTE_SIZE],
        }
    }
}

impl PaletteRam {
    #[must_use]
    pub const fn read_select(&self) -> u8 {
        // Bit 6 is unused and reads back set.
        self.select | 0x40
    }

    pub fn write_select(&mut self, value: u8) {
        self.select = value & (PALETTE_AUTO_INCREMENT | PALETTE_INDEX_MASK);
    }

    #[must_use]
    pub fn read_data(&self, locked: bool) -> u8 {
        if locked {
            return OPEN_BUS;
        }
        self.data[self.index()]
    }

    /// A locked write is dropped but still advances the index.
    pub fn write_data(&mut self, value: u8, locked: bool) {
        if locked {
            log::trace!("palette write {value:#04X} dropped during transfer");
        } else {
            let index = self.index();
            self.data[index] = value;
        }
        if self.select & PALETTE_AUTO_INCREMENT != 0 {
            let next = (self.select + 1) & PALETTE_INDEX_MASK;
            self.select = PALETTE_AUTO_INCREMENT | next;
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[u8] {
        &self.data
    }

    fn index(&self) -> usize {
        usize::from(self.select & PALETTE_INDEX_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_write_keeps_status_bits() {
        let mut stat = StatusRegister::default();
        stat.set_mode(Mode::Transfer);
        stat.set_coincidence(true);
        stat.write(0xFF);
        assert_eq!(stat.read(), 0xFF);
        stat.write(0x00);
        assert_eq!(stat.read(), 0x80 | STAT_COINCIDENCE | 3);
    }

    #[test]
    fn compare_latch_reads_last_write() {
        let mut lyc = CompareLatch::default();
        lyc.set(10);
        lyc.buffer(20);
        assert_eq!(lyc.read(), 20);
        assert_eq!(lyc.value(), 10);
        assert_eq!(lyc.take_pending(), Some(20));
        assert_eq!(lyc.take_pending(), None);
    }

    #[test]
    fn palette_auto_increment_wraps_and_survives_lock() {
        let mut palette = PaletteRam::default();
        palette.write_select(0x80 | 0x3E);
        palette.write_data(0x11, false);
        palette.write_data(0x22, true);
        assert_eq!(palette.read_select(), 0xC0);
        assert_eq!(palette.entries()[0x3E], 0x11);
        assert_eq!(palette.entries()[0x3F], 0x00);
        assert_eq!(palette.read_data(true), OPEN_BUS);
    }

    #[test]
    fn palette_without_auto_increment_stays_put() {
        let mut palette = PaletteRam::default();
        palette.write_select(5);
        palette.write_data(0x33, false);
        palette.write_data(0x44, false);
        assert_eq!(palette.read_data(false), 0x44);
        assert_eq!(palette.read_select(), 0x45);
    }
}
