//! The LCD controller engine.
//!
//! The engine parks the next phase transition in the screen's phase slot and
//! runs each phase's entry actions when it fires. Entry actions drive STAT,
//! LY, the store locks and the interrupt outputs; the duration of the phase
//! just entered decides when its successor is due.

use emu_core::{Bus, Observable, Tickable, Ticks, Value};
use raster_screen::{
    BeamPosition, ConfigError, Deferred, ListenerHandle, RasterEvent, Renderer, Screen,
};

use crate::config::{LcdConfig, validate_display};
use crate::irq::{INT_STAT, INT_VBLANK, StatIrq};
use crate::phase::{LineGeometry, Phase};
use crate::registers::{
    ADDR_BCPD, ADDR_BCPS, ADDR_LCDC, ADDR_LY, ADDR_LYC, ADDR_SCX, ADDR_STAT, CompareLatch,
    LCDC_ENABLE, Locks, Mode, OAM_END, OAM_SIZE, OAM_START, OPEN_BUS, PaletteRam,
    STAT_HBLANK_IRQ, STAT_LYC_IRQ, STAT_SEARCH_IRQ, STAT_VBLANK_IRQ, StatusRegister, VRAM_END,
    VRAM_SIZE, VRAM_START,
};
use crate::timing::{DmgTiming, DurationInputs, PhaseDurationProvider};

/// LCDC after the boot ROM hands over: display, background and tiles on.
const LCDC_POWER_ON: u8 = 0x91;

/// Game Boy LCD controller.
#[derive(Debug)]
pub struct Lcd<P = DmgTiming> {
    pub(crate) config: LcdConfig,
    timing: P,
    scan_time: Ticks,
    geometry: LineGeometry,
    pub(crate) screen: Screen<Phase>,
    /// Phase most recently entered.
    pub(crate) phase: Phase,
    /// Entry tick of the current phase. May predate tick zero after a rebase.
    pub(crate) phase_started: i64,
    /// Entry tick of the current line's head phase.
    pub(crate) line_start: i64,
    pub(crate) lcdc: u8,
    pub(crate) stat: StatusRegister,
    /// Mode the controller is actually in, which leads STAT by a few ticks
    /// around the blank.
    pub(crate) internal_mode: Mode,
    pub(crate) scx: u8,
    /// SCX as latched at the start of the line.
    pub(crate) line_scx: u8,
    pub(crate) ly: u16,
    pub(crate) lyc: CompareLatch,
    pub(crate) irq: StatIrq,
    /// Requests not yet taken by the CPU side.
    pub(crate) interrupts: u8,
    pub(crate) locks: Locks,
    /// Objects selected for the current line.
    pub(crate) objects: u8,
    pub(crate) vram: Vec<u8>,
    pub(crate) oam: Vec<u8>,
    pub(crate) palette: PaletteRam,
    /// Replaying phases to catch up after a rebase: no interrupts, renders
    /// or notifications.
    quiet: bool,
}

impl Lcd<DmgTiming> {
    /// A powered-on controller with the display enabled at tick zero.
    pub fn new(config: LcdConfig, renderer: Box<dyn Renderer>) -> Result<Self, ConfigError> {
        Self::with_timing(config, DmgTiming, renderer)
    }
}

impl<P: PhaseDurationProvider> Lcd<P> {
    pub fn with_timing(
        config: LcdConfig,
        timing: P,
        renderer: Box<dyn Renderer>,
    ) -> Result<Self, ConfigError> {
        let scan_time = validate_display(&config.display, timing.min_scan_time())?;
        let display = config.display;
        let mut lcd = Self {
            config,
            timing,
            scan_time,
            geometry: LineGeometry::new(display.vblank_start_line(), display.height()),
            screen: Screen::new(display, renderer),
            phase: Phase::default(),
            phase_started: 0,
            line_start: 0,
            lcdc: LCDC_POWER_ON,
            stat: StatusRegister::default(),
            internal_mode: Mode::HBlank,
            scx: 0,
            line_scx: 0,
            ly: 0,
            lyc: CompareLatch::default(),
            irq: StatIrq::default(),
            interrupts: 0,
            locks: Locks::default(),
            objects: 0,
            vram: vec![0; VRAM_SIZE],
            oam: vec![0; OAM_SIZE],
            palette: PaletteRam::default(),
            quiet: false,
        };
        lcd.enable();
        Ok(lcd)
    }

    #[must_use]
    pub fn config(&self) -> &LcdConfig {
        &self.config
    }

    #[must_use]
    pub fn now(&self) -> Ticks {
        self.screen.now()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn ly(&self) -> u16 {
        self.ly
    }

    #[must_use]
    pub fn scan_time(&self) -> Ticks {
        self.scan_time
    }

    #[must_use]
    pub fn stat(&self) -> StatusRegister {
        self.stat
    }

    #[must_use]
    pub fn locks(&self) -> Locks {
        self.locks
    }

    #[must_use]
    pub fn irq_state(&self) -> StatIrq {
        self.irq
    }

    #[must_use]
    pub fn screen(&self) -> &Screen<Phase> {
        &self.screen
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.lcdc & LCDC_ENABLE != 0
    }

    /// Beam position now. Held at (0,0) while the display is off.
    #[must_use]
    pub fn position(&self) -> BeamPosition {
        if self.is_enabled() {
            self.screen.position()
        } else {
            BeamPosition::default()
        }
    }

    #[must_use]
    pub fn time_until(&self, x: u16, y: u16) -> Ticks {
        self.screen.time_until(x, y)
    }

    #[must_use]
    pub fn frame_number(&self) -> u64 {
        self.screen.frame_number()
    }

    pub fn register_listener(&mut self, listener: ListenerHandle) -> bool {
        self.screen.register_listener(listener)
    }

    pub fn set_scanline_events(&mut self, enabled: bool) {
        self.screen.set_scanline_events(enabled);
    }

    /// Render lines reached so far this frame, up to `line`.
    pub fn render_up_to(&mut self, line: u16) -> bool {
        self.screen.render_up_to(line)
    }

    /// Interrupt requests raised since the last call.
    pub fn take_interrupts(&mut self) -> u8 {
        std::mem::take(&mut self.interrupts)
    }

    #[must_use]
    pub fn pending_interrupts(&self) -> u8 {
        self.interrupts
    }

    #[must_use]
    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    #[must_use]
    pub fn oam(&self) -> &[u8] {
        &self.oam
    }

    #[must_use]
    pub fn palette(&self) -> &PaletteRam {
        &self.palette
    }

    /// Turn display output on or off, as LCDC bit 7 does.
    pub fn set_enabled(&mut self, enabled: bool) {
        let lcdc = if enabled {
            self.lcdc | LCDC_ENABLE
        } else {
            self.lcdc & !LCDC_ENABLE
        };
        self.write_lcdc(lcdc);
    }

    /// Replace the configuration.
    ///
    /// The beam stays where it is. A beam outside the new raster restarts
    /// the frame; a moved origin or a new scan time replays the phase
    /// machine to the beam's position; otherwise only the pending deadline
    /// moves.
    pub fn configure(&mut self, config: LcdConfig) -> Result<(), ConfigError> {
        let scan_time = validate_display(&config.display, self.timing.min_scan_time())?;
        if config == self.config {
            return Ok(());
        }
        let display = config.display;
        let old_scan_time = self.scan_time;
        let before = self.screen.position();
        self.config = config;
        self.scan_time = scan_time;
        self.geometry = LineGeometry::new(display.vblank_start_line(), display.height());
        self.screen.configure(display);
        if self.is_enabled() {
            let after = self.screen.position();
            if after != before || scan_time != old_scan_time {
                let offset = self.screen.clock().pixel_offset(after.x, after.y);
                self.seek(offset);
            } else {
                self.reschedule_phase();
            }
        }
        self.apply_deferred();
        Ok(())
    }

    /// Rebase timing so that the beam is at `(x, y)` now, replaying the
    /// phase machine from line 0 to that point without side effects.
    pub fn reset_origin(&mut self, x: u16, y: u16) {
        self.screen.reset_origin(x, y);
        if self.is_enabled() {
            let offset = self.screen.clock().pixel_offset(x, y);
            self.seek(offset);
        }
        self.apply_deferred();
    }

    /// Advance to `target`, firing every deadline on the way.
    pub fn run_until(&mut self, target: Ticks) {
        while let Some(event) = self.screen.pop_due(target) {
            if let Some(phase) = self.screen.dispatch(event) {
                assert!(self.is_enabled(), "phase {phase} fired with the display off");
                let now = to_signed(self.screen.now());
                self.advance(phase, now);
            }
            self.apply_deferred();
        }
        self.screen.advance_to(target);
    }

    fn apply_deferred(&mut self) {
        for request in self.screen.take_deferred() {
            match request {
                Deferred::Configure(display) => {
                    let config = self.config.with_display(display);
                    if let Err(err) = self.configure(config) {
                        log::warn!("listener reconfiguration rejected: {err}");
                    }
                }
                Deferred::ResetOrigin { x, y } => self.reset_origin(x, y),
                Deferred::SetEnabled(enabled) => self.set_enabled(enabled),
            }
        }
    }

    /// Enter `phase` at `at` and arm its successor.
    fn advance(&mut self, phase: Phase, at: i64) {
        let (next, next_at) = self.enter(phase, at);
        self.screen.schedule_phase(to_ticks(next_at), next);
    }

    /// Run the entry actions of `phase`. Returns the successor and when it
    /// is due.
    fn enter(&mut self, phase: Phase, at: i64) -> (Phase, i64) {
        self.phase = phase;
        self.phase_started = at;
        if phase.is_line_head() {
            self.line_start = at;
        }
        if !self.quiet {
            log::trace!("LY {} enter {phase} at {at}", self.ly);
        }
        match phase {
            Phase::LineSearch => {
                self.stat.set_mode(Mode::Search);
                self.internal_mode = Mode::Search;
                self.locks.oam = true;
                self.line_scx = self.scx;
                let search = std::mem::take(&mut self.irq.triggering_mode_irq);
                self.hold_mode_source(search);
                let armed = std::mem::take(&mut self.irq.triggering_line_irq);
                self.resolve_compare(armed);
            }
            Phase::LineTransfer => {
                self.objects = self.screen.objects_on_line(self.ly);
                self.stat.set_mode(Mode::Transfer);
                self.internal_mode = Mode::Transfer;
                self.locks.vram = true;
                self.locks.palette = true;
                self.irq.mode_irq = false;
            }
            Phase::LineTransferAdjust => {}
            Phase::LineBlankPre => {
                self.internal_mode = Mode::HBlank;
                self.locks.palette = false;
                if self.stat.enabled(STAT_HBLANK_IRQ) && self.irq.raise_mode() {
                    self.request(INT_STAT);
                }
            }
            Phase::LineBlank => {
                if !self.quiet {
                    self.screen.render_up_to(self.ly);
                }
                self.stat.set_mode(Mode::HBlank);
                self.locks.vram = false;
                self.locks.oam = false;
                self.notify(RasterEvent::HBlank(self.ly));
            }
            Phase::LineBlankRearm => {
                self.internal_mode = Mode::Search;
                self.irq.triggering_mode_irq = self.stat.enabled(STAT_SEARCH_IRQ);
            }
            Phase::LineBlankAdvance | Phase::FrameBlankAdvance => {
                self.ly += 1;
                self.arm_compare();
            }
            Phase::FrameBlankEnter => {
                self.stat.set_mode(Mode::VBlank);
                self.internal_mode = Mode::VBlank;
                self.request(INT_VBLANK);
                // A search source armed on the last visible line still
                // counts here.
                let search = std::mem::take(&mut self.irq.triggering_mode_irq);
                self.hold_mode_source(search || self.stat.enabled(STAT_VBLANK_IRQ));
                let armed = std::mem::take(&mut self.irq.triggering_line_irq);
                self.resolve_compare(armed);
            }
            Phase::FrameBlankHold => {
                let armed = std::mem::take(&mut self.irq.triggering_line_irq);
                self.resolve_compare(armed);
            }
            Phase::FrameBlankWrap => {
                let armed = std::mem::take(&mut self.irq.triggering_line_irq);
                self.resolve_compare(armed);
                self.ly = 0;
            }
            Phase::FrameBlankWrapCompare => {
                self.stat.set_coincidence(false);
                self.irq.line_irq = false;
                self.irq.delayed_line_irq =
                    self.stat.enabled(STAT_LYC_IRQ) && self.lyc.value() == 0;
            }
            Phase::FrameBlankExitPre => {
                let armed = std::mem::take(&mut self.irq.delayed_line_irq);
                self.resolve_compare(armed);
            }
            Phase::FrameBlankExit => {
                self.ly = 0;
                self.stat.set_mode(Mode::HBlank);
                self.internal_mode = Mode::HBlank;
                self.irq.mode_irq = false;
                self.irq.triggering_mode_irq = self.stat.enabled(STAT_SEARCH_IRQ);
            }
        }
        if !phase.is_compare_window() {
            if let Some(value) = self.lyc.take_pending() {
                log::trace!("buffered LYC {value} applied in {phase}");
                self.apply_lyc(value);
            }
        }
        let inputs = self.duration_inputs(at);
        let duration = self.timing.duration(phase, &inputs);
        let next = phase.successor(self.ly, self.geometry, self.line_scx);
        (next, at + duration.get() as i64)
    }

    fn duration_inputs(&self, at: i64) -> DurationInputs {
        DurationInputs {
            scan_time: self.scan_time,
            line_elapsed: Ticks::new(at.saturating_sub(self.line_start).max(0) as u64),
            objects: self.objects,
            scroll_x: self.line_scx,
        }
    }

    /// Move the pending transition to match the current timing.
    fn reschedule_phase(&mut self) {
        let inputs = self.duration_inputs(self.phase_started);
        let duration = self.timing.duration(self.phase, &inputs);
        let next = self.phase.successor(self.ly, self.geometry, self.line_scx);
        let at = self.phase_started + duration.get() as i64;
        let now = to_signed(self.screen.now());
        if at <= now {
            self.quiet_replay(next, at, now);
        } else {
            self.screen.schedule_phase(to_ticks(at), next);
        }
    }

    /// Restart the phase machine at line 0, `offset` ticks ago, and catch
    /// up quietly. A phase due exactly now is entered normally.
    fn seek(&mut self, offset: u64) {
        let now = to_signed(self.screen.now());
        self.ly = 0;
        self.stat.clear_status();
        self.locks.unlock_all();
        self.irq.clear();
        self.internal_mode = Mode::HBlank;
        self.quiet_replay(Phase::FrameBlankExit, now - offset as i64, now);
    }

    fn quiet_replay(&mut self, mut phase: Phase, mut at: i64, now: i64) {
        loop {
            self.quiet = at < now;
            let (next, next_at) = self.enter(phase, at);
            if next_at > now {
                self.quiet = false;
                self.screen.schedule_phase(to_ticks(next_at), next);
                return;
            }
            phase = next;
            at = next_at;
        }
    }

    fn enable(&mut self) {
        log::debug!("LCD on at {}", self.screen.now());
        self.screen.start();
        self.seek(0);
        // The first line's compare is resolved by its search.
        self.irq.triggering_line_irq = self.stat.enabled(STAT_LYC_IRQ) && self.lyc.value() == 0;
    }

    fn disable(&mut self) {
        log::debug!("LCD off at {}", self.screen.now());
        self.screen.stop();
        self.phase = Phase::default();
        self.ly = 0;
        self.stat.clear_status();
        self.internal_mode = Mode::HBlank;
        self.locks.unlock_all();
        self.irq.clear();
        if let Some(value) = self.lyc.take_pending() {
            self.lyc.set(value);
        }
    }

    /// LY just changed: the comparison is unresolved until the next phase.
    fn arm_compare(&mut self) {
        self.stat.set_coincidence(false);
        self.irq.line_irq = false;
        self.irq.triggering_line_irq =
            self.stat.enabled(STAT_LYC_IRQ) && u16::from(self.lyc.value()) == self.ly;
    }

    fn resolve_compare(&mut self, armed: bool) {
        let matched = u16::from(self.lyc.value()) == self.ly;
        self.stat.set_coincidence(matched);
        if matched {
            self.notify(RasterEvent::LineCompare(self.ly));
        }
        if armed && self.irq.raise_line() {
            self.request(INT_STAT);
        }
    }

    /// Settle the mode source for a new mode: held if `asserted`, released
    /// otherwise.
    fn hold_mode_source(&mut self, asserted: bool) {
        if asserted {
            if self.irq.raise_mode() {
                self.request(INT_STAT);
            }
        } else {
            self.irq.mode_irq = false;
        }
    }

    fn request(&mut self, bits: u8) {
        if self.quiet {
            return;
        }
        log::trace!("interrupt request {bits:#04X} at {}", self.screen.now());
        self.interrupts |= bits;
    }

    fn notify(&mut self, event: RasterEvent) {
        if !self.quiet {
            self.screen.notify(event);
        }
    }

    fn write_lcdc(&mut self, value: u8) {
        let was_enabled = self.is_enabled();
        self.lcdc = value;
        match (was_enabled, self.is_enabled()) {
            (false, true) => self.enable(),
            (true, false) => self.disable(),
            _ => {}
        }
    }

    fn write_stat(&mut self, value: u8) {
        let spurious = self.config.model.has_stat_write_quirk()
            && self.is_enabled()
            && matches!(self.internal_mode, Mode::HBlank | Mode::VBlank)
            && !self.irq.line_high();
        self.stat.write(value);
        if spurious {
            log::trace!("STAT write quirk");
            self.request(INT_STAT);
        }
    }

    fn write_lyc(&mut self, value: u8) {
        if !self.is_enabled() {
            self.lyc.set(value);
        } else if self.phase.is_compare_window() {
            log::trace!("LYC {value} buffered in {}", self.phase);
            self.lyc.buffer(value);
        } else {
            self.apply_lyc(value);
        }
    }

    fn apply_lyc(&mut self, value: u8) {
        let changed = value != self.lyc.value();
        self.lyc.set(value);
        if !changed {
            return;
        }
        if u16::from(value) == self.ly {
            self.stat.set_coincidence(true);
            self.notify(RasterEvent::LineCompare(self.ly));
            if self.stat.enabled(STAT_LYC_IRQ) && self.irq.raise_line() {
                self.request(INT_STAT);
            }
        } else {
            self.stat.set_coincidence(false);
            self.irq.line_irq = false;
            self.irq.triggering_line_irq = false;
            self.irq.delayed_line_irq = false;
        }
    }
}

impl<P: PhaseDurationProvider> Bus for Lcd<P> {
    fn peek(&self, address: u16) -> u8 {
        match address {
            VRAM_START..=VRAM_END if self.locks.vram => OPEN_BUS,
            VRAM_START..=VRAM_END => self.vram[usize::from(address - VRAM_START)],
            OAM_START..=OAM_END if self.locks.oam => OPEN_BUS,
            OAM_START..=OAM_END => self.oam[usize::from(address - OAM_START)],
            ADDR_LCDC => self.lcdc,
            ADDR_STAT => self.stat.read(),
            ADDR_SCX => self.scx,
            ADDR_LY => self.ly as u8,
            ADDR_LYC => self.lyc.read(),
            ADDR_BCPS => self.palette.read_select(),
            ADDR_BCPD => self.palette.read_data(self.locks.palette),
            _ => OPEN_BUS,
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            VRAM_START..=VRAM_END if self.locks.vram => {
                log::trace!("VRAM write {address:#06X} dropped in {}", self.phase);
            }
            VRAM_START..=VRAM_END => self.vram[usize::from(address - VRAM_START)] = value,
            OAM_START..=OAM_END if self.locks.oam => {
                log::trace!("OAM write {address:#06X} dropped in {}", self.phase);
            }
            OAM_START..=OAM_END => self.oam[usize::from(address - OAM_START)] = value,
            ADDR_LCDC => self.write_lcdc(value),
            ADDR_STAT => self.write_stat(value),
            ADDR_SCX => self.scx = value,
            ADDR_LYC => self.write_lyc(value),
            ADDR_BCPS => self.palette.write_select(value),
            ADDR_BCPD => self.palette.write_data(value, self.locks.palette),
            _ => {}
        }
    }
}

impl<P: PhaseDurationProvider> Tickable for Lcd<P> {
    fn now(&self) -> Ticks {
        self.screen.now()
    }

    fn advance_to(&mut self, target: Ticks) {
        self.run_until(target);
    }
}

impl<P: PhaseDurationProvider> Observable for Lcd<P> {
    fn query(&self, path: &str) -> Option<Value> {
        let value = match path {
            "ly" => Value::U8(self.ly as u8),
            "lyc" => Value::U8(self.lyc.read()),
            "stat" => Value::U8(self.stat.read()),
            "lcdc" => Value::U8(self.lcdc),
            "scx" => Value::U8(self.scx),
            "mode" => Value::U8(self.stat.mode()),
            "phase" => Value::from(self.phase.name()),
            "beam.x" => Value::U16(self.position().x),
            "beam.y" => Value::U16(self.position().y),
            "frame" => Value::U64(self.frame_number()),
            "enabled" => Value::Bool(self.is_enabled()),
            "locks.vram" => Value::Bool(self.locks.vram),
            "locks.oam" => Value::Bool(self.locks.oam),
            "locks.palette" => Value::Bool(self.locks.palette),
            "interrupts" => Value::U8(self.interrupts),
            "now" => Value::from(self.now()),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "ly",
            "lyc",
            "stat",
            "lcdc",
            "scx",
            "mode",
            "phase",
            "beam.x",
            "beam.y",
            "frame",
            "enabled",
            "locks.vram",
            "locks.oam",
            "locks.palette",
            "interrupts",
            "now",
        ]
    }
}

fn to_signed(ticks: Ticks) -> i64 {
    i64::try_from(ticks.get()).unwrap_or(i64::MAX)
}

fn to_ticks(at: i64) -> Ticks {
    Ticks::new(u64::try_from(at).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_screen::NullRenderer;

    fn lcd() -> Lcd {
        Lcd::new(LcdConfig::dmg(), Box::new(NullRenderer)).unwrap()
    }

    fn at(lcd: &mut Lcd, tick: u64) {
        lcd.run_until(Ticks::new(tick));
    }

    #[test]
    fn powers_on_in_line_zero_head() {
        let lcd = lcd();
        assert!(lcd.is_enabled());
        assert_eq!(lcd.phase(), Phase::FrameBlankExit);
        assert_eq!(lcd.ly(), 0);
        assert_eq!(lcd.stat().mode(), 0);
        assert_eq!(lcd.position(), BeamPosition::new(0, 0));
    }

    #[test]
    fn first_line_modes() {
        let mut lcd = lcd();
        at(&mut lcd, 4);
        assert_eq!(lcd.phase(), Phase::LineSearch);
        assert_eq!(lcd.stat().mode(), 2);
        assert!(lcd.locks().oam && !lcd.locks().vram);
        at(&mut lcd, 84);
        assert_eq!(lcd.phase(), Phase::LineTransfer);
        assert_eq!(lcd.stat().mode(), 3);
        at(&mut lcd, 252);
        assert_eq!(lcd.phase(), Phase::LineBlankPre);
        // STAT still reports the transfer.
        assert_eq!(lcd.stat().mode(), 3);
        at(&mut lcd, 256);
        assert_eq!(lcd.stat().mode(), 0);
        at(&mut lcd, 456);
        assert_eq!(lcd.phase(), Phase::LineBlankAdvance);
        assert_eq!(lcd.ly(), 1);
    }

    #[test]
    fn locked_reads_are_open_bus() {
        let mut lcd = lcd();
        lcd.write(0x8000, 0x12);
        lcd.write(0xFE00, 0x34);
        at(&mut lcd, 100);
        assert_eq!(lcd.read(0x8000), OPEN_BUS);
        assert_eq!(lcd.read(0xFE00), OPEN_BUS);
        lcd.write(0x8000, 0x56);
        at(&mut lcd, 300);
        assert_eq!(lcd.read(0x8000), 0x12);
        assert_eq!(lcd.read(0xFE00), 0x34);
    }

    #[test]
    fn ly_is_read_only() {
        let mut lcd = lcd();
        at(&mut lcd, 456 * 3 + 10);
        lcd.write(ADDR_LY, 99);
        assert_eq!(lcd.read(ADDR_LY), 3);
        assert_eq!(lcd.read(0xFF00), OPEN_BUS);
    }

    #[test]
    fn lyc_write_matching_ly_raises_stat() {
        let mut lcd = lcd();
        lcd.write(ADDR_STAT, STAT_LYC_IRQ);
        at(&mut lcd, 456 * 7 + 100);
        lcd.take_interrupts();
        lcd.write(ADDR_LYC, 7);
        assert!(lcd.stat().coincidence());
        assert_eq!(lcd.take_interrupts(), INT_STAT);
        lcd.write(ADDR_LYC, 8);
        assert!(!lcd.stat().coincidence());
        assert!(!lcd.irq_state().line_irq);
    }

    #[test]
    fn dmg_stat_write_quirk() {
        let mut lcd = lcd();
        at(&mut lcd, 300);
        lcd.take_interrupts();
        lcd.write(ADDR_STAT, 0);
        assert_eq!(lcd.take_interrupts(), INT_STAT);

        let mut cgb = Lcd::new(LcdConfig::cgb(), Box::new(NullRenderer)).unwrap();
        at(&mut cgb, 300);
        cgb.take_interrupts();
        cgb.write(ADDR_STAT, 0);
        assert_eq!(cgb.take_interrupts(), 0);
    }

    #[test]
    fn stat_write_quirk_needs_blank() {
        let mut lcd = lcd();
        at(&mut lcd, 100);
        lcd.write(ADDR_STAT, 0);
        assert_eq!(lcd.take_interrupts(), 0);
    }

    #[test]
    fn disable_holds_degenerate_state() {
        let mut lcd = lcd();
        at(&mut lcd, 456 * 20 + 100);
        lcd.write(ADDR_LCDC, 0x11);
        assert!(!lcd.is_enabled());
        assert_eq!(lcd.read(ADDR_LY), 0);
        assert_eq!(lcd.read(ADDR_STAT) & 0x07, 0);
        assert_eq!(lcd.locks(), Locks::default());
        at(&mut lcd, 200_000);
        assert_eq!(lcd.ly(), 0);
        assert_eq!(lcd.take_interrupts(), 0);
        assert_eq!(lcd.position(), BeamPosition::new(0, 0));
        assert_eq!(lcd.query("beam.x"), Some(Value::U16(0)));
        assert_eq!(lcd.query("beam.y"), Some(Value::U16(0)));
    }

    #[test]
    fn reset_origin_replays_quietly() {
        let mut lcd = lcd();
        lcd.write(ADDR_STAT, STAT_HBLANK_IRQ);
        at(&mut lcd, 10);
        lcd.take_interrupts();
        lcd.reset_origin(300, 150);
        assert_eq!(lcd.position(), BeamPosition::new(300, 150));
        assert_eq!(lcd.ly(), 150);
        assert_eq!(lcd.phase(), Phase::FrameBlankHold);
        assert_eq!(lcd.stat().mode(), 1);
        assert_eq!(lcd.take_interrupts(), 0);
    }

    #[test]
    fn reset_origin_mid_line_lands_in_transfer() {
        let mut lcd = lcd();
        lcd.reset_origin(100, 20);
        assert_eq!(lcd.ly(), 20);
        assert_eq!(lcd.phase(), Phase::LineTransfer);
        assert!(lcd.locks().vram && lcd.locks().palette && lcd.locks().oam);
    }

    #[test]
    fn observable_paths() {
        let mut lcd = lcd();
        at(&mut lcd, 456 * 2 + 5);
        assert_eq!(lcd.query("ly"), Some(Value::U8(2)));
        assert_eq!(lcd.query("phase"), Some(Value::from("line_search")));
        assert_eq!(lcd.query("beam.x"), Some(Value::U16(5)));
        assert_eq!(lcd.query("enabled"), Some(Value::Bool(true)));
        assert_eq!(lcd.query("locks.oam"), Some(Value::Bool(true)));
        assert_eq!(lcd.query("nope"), None);
        for path in lcd.query_paths() {
            assert!(lcd.query(path).is_some(), "{path}");
        }
    }

    #[test]
    fn configure_rejects_without_touching_state() {
        let mut lcd = lcd();
        at(&mut lcd, 1_000);
        let before = lcd.phase();
        let bad = raster_screen::DisplayConfig::new(
            456,
            145,
            raster_screen::Rect::new(0, 159, 0, 143),
            Ticks::new(456 * 145),
        )
        .unwrap();
        assert!(lcd.configure(LcdConfig::dmg().with_display(bad)).is_err());
        assert_eq!(lcd.config(), &LcdConfig::dmg());
        assert_eq!(lcd.phase(), before);
    }
}
