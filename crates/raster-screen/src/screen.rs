//! Screen device: raster clock, deadline slots, compositor and listeners.
//!
//! The screen owns simulated time for one display. It services its own
//! frame-start, vertical-blank and scanline deadlines and hands phase
//! deadlines back to the controller that armed them.

use emu_core::Ticks;

use crate::clock::{BeamPosition, RasterClock};
use crate::compositor::{Compositor, Renderer};
use crate::config::DisplayConfig;
use crate::listener::{Deferred, ListenerHandle, ListenerRegistry, Notification, RasterEvent};
use crate::scheduler::{Event, Pending, Scheduler, Slot};

#[derive(Debug)]
pub struct Screen<T> {
    clock: RasterClock,
    scheduler: Scheduler<T>,
    compositor: Compositor,
    listeners: ListenerRegistry,
    deferred: Vec<Deferred>,
    now: Ticks,
    frame: u64,
    running: bool,
    scanline_events: bool,
}

impl<T: Copy + Default> Screen<T> {
    /// A stopped screen at tick zero.
    #[must_use]
    pub fn new(config: DisplayConfig, renderer: Box<dyn Renderer>) -> Self {
        Self {
            clock: RasterClock::new(config, Ticks::ZERO),
            scheduler: Scheduler::new(),
            compositor: Compositor::new(renderer),
            listeners: ListenerRegistry::new(),
            deferred: Vec::new(),
            now: Ticks::ZERO,
            frame: 0,
            running: false,
            scanline_events: false,
        }
    }

    #[must_use]
    pub fn now(&self) -> Ticks {
        self.now
    }

    #[must_use]
    pub fn config(&self) -> &DisplayConfig {
        self.clock.config()
    }

    #[must_use]
    pub fn clock(&self) -> &RasterClock {
        &self.clock
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler<T> {
        &self.scheduler
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Completed frames (vertical-blank ends seen).
    #[must_use]
    pub fn frame_number(&self) -> u64 {
        self.frame
    }

    /// Start the raster with the beam at (0,0) now.
    pub fn start(&mut self) {
        self.running = true;
        self.reset_origin(0, 0);
    }

    /// Stop the raster. Every slot, including the phase slot, is parked.
    pub fn stop(&mut self) {
        self.running = false;
        self.scheduler.cancel_all();
    }

    /// Replace the configuration, keeping the beam where it is.
    ///
    /// The origin is rebased so that now still maps to the current position
    /// under the new geometry, and every pending raster deadline is
    /// recomputed. A position outside the new raster restarts the frame at
    /// (0,0). An identical configuration changes nothing.
    pub fn configure(&mut self, config: DisplayConfig) {
        if config == *self.config() {
            return;
        }
        log::debug!(
            "screen configured {}x{}, {} ticks/frame",
            config.width(),
            config.height(),
            config.frame_period()
        );
        let position = self.position();
        self.clock.set_config(config);
        if position.x >= config.width() || position.y >= config.height() {
            self.reset_origin(0, 0);
            return;
        }
        self.clock.reset_origin(self.now, position.x, position.y);
        if self.running {
            self.arm_raster_slots();
        }
    }

    /// Rebase timing so that the beam is at `(x, y)` now.
    ///
    /// Landing on (0,0) runs the frame-start bookkeeping immediately; landing
    /// on the first vertical-blank line runs vblank begin immediately.
    pub fn reset_origin(&mut self, x: u16, y: u16) {
        log::debug!("screen origin reset to ({x},{y}) at {}", self.now);
        self.clock.reset_origin(self.now, x, y);
        if !self.running {
            return;
        }
        let vblank_line = self.config().vblank_start_line();
        if (x, y) == (0, 0) {
            self.frame_start();
        } else {
            self.arm_at(0, 0, Event::FrameStart);
        }
        self.arm_vblank_end();
        if (x, y) == (0, vblank_line) {
            self.vblank_begin();
        } else {
            self.arm_at(0, vblank_line, Event::VblankBegin);
        }
        self.arm_scanline();
    }

    #[must_use]
    pub fn position(&self) -> BeamPosition {
        self.clock.position_at(self.now)
    }

    /// Time until the beam next reaches `(x, y)`.
    #[must_use]
    pub fn time_until(&self, x: u16, y: u16) -> Ticks {
        self.clock.time_until(self.now, x, y)
    }

    /// Render newly reached lines up to `line`. Returns whether this call
    /// changed the output.
    pub fn render_up_to(&mut self, line: u16) -> bool {
        let visible = self.config().visible();
        self.compositor.render_up_to(line, &visible)
    }

    #[must_use]
    pub fn frame_changed(&self) -> bool {
        self.compositor.frame_changed()
    }

    #[must_use]
    pub fn watermark(&self) -> u16 {
        self.compositor.watermark()
    }

    pub fn objects_on_line(&mut self, line: u16) -> u8 {
        self.compositor.objects_on_line(line)
    }

    pub fn register_listener(&mut self, listener: ListenerHandle) -> bool {
        self.listeners.register(listener)
    }

    /// Tell every listener about `event` at the current tick.
    pub fn notify(&mut self, event: RasterEvent) {
        if self.listeners.is_empty() {
            return;
        }
        let notification = Notification {
            event,
            time: self.now,
            position: self.position(),
            frame: self.frame,
        };
        self.listeners.notify(&notification, &mut self.deferred);
    }

    /// Reconfiguration requested by listeners since the last call.
    pub fn take_deferred(&mut self) -> Vec<Deferred> {
        std::mem::take(&mut self.deferred)
    }

    /// Turn per-scanline notifications on or off.
    pub fn set_scanline_events(&mut self, enabled: bool) {
        self.scanline_events = enabled;
        if self.running {
            self.arm_scanline();
        }
    }

    /// Arm the phase slot for the absolute tick `at`.
    pub fn schedule_phase(&mut self, at: Ticks, tag: T) {
        self.scheduler.schedule(at, Event::Phase(tag));
    }

    pub fn cancel_phase(&mut self) {
        self.scheduler.cancel(Slot::Phase);
    }

    /// Take the earliest deadline not later than `until`, moving time to it.
    pub fn pop_due(&mut self, until: Ticks) -> Option<Event<T>> {
        let Pending { at, event } = self.scheduler.pop_due(until)?;
        self.now = self.now.max(at);
        Some(event)
    }

    /// Move time forward to `target` without firing anything.
    pub fn advance_to(&mut self, target: Ticks) {
        self.now = self.now.max(target);
    }

    /// Service a raster event. Phase events are handed back untouched.
    pub fn dispatch(&mut self, event: Event<T>) -> Option<T> {
        match event {
            Event::Phase(tag) => return Some(tag),
            Event::FrameStart => self.frame_start(),
            Event::VblankBegin => self.vblank_begin(),
            Event::VblankEnd => self.vblank_end(),
            Event::Scanline => self.scanline(),
        }
        None
    }

    /// Fire everything due up to `target`, passing phase events to
    /// `on_phase`, then apply listener requests.
    pub fn run_until(&mut self, target: Ticks, mut on_phase: impl FnMut(&mut Self, T)) {
        while let Some(event) = self.pop_due(target) {
            if let Some(tag) = self.dispatch(event) {
                on_phase(self, tag);
            }
            for request in self.take_deferred() {
                self.apply(request);
            }
        }
        self.advance_to(target);
    }

    fn apply(&mut self, request: Deferred) {
        match request {
            Deferred::Configure(config) => self.configure(config),
            Deferred::ResetOrigin { x, y } => self.reset_origin(x, y),
            Deferred::SetEnabled(true) => self.start(),
            Deferred::SetEnabled(false) => self.stop(),
        }
    }

    fn frame_start(&mut self) {
        self.compositor.reset();
        self.arm_at(0, 0, Event::FrameStart);
    }

    fn vblank_begin(&mut self) {
        let visible = self.config().visible();
        self.compositor.render_up_to(visible.max_y, &visible);
        self.clock.mark_vblank_start(self.now);
        log::trace!("vblank begin at {}", self.now);
        self.notify(RasterEvent::VblankBegin);
        let end = self.clock.next_frame_start(self.now);
        self.scheduler.schedule(end, Event::VblankEnd);
        let vblank_line = self.config().vblank_start_line();
        self.arm_at(0, vblank_line, Event::VblankBegin);
    }

    fn vblank_end(&mut self) {
        log::trace!("vblank end at {}", self.now);
        self.notify(RasterEvent::VblankEnd);
        self.frame += 1;
    }

    fn scanline(&mut self) {
        let y = self.position().y;
        self.notify(RasterEvent::Scanline(y));
        let next = (y + 1) % self.config().height();
        self.arm_at(0, next, Event::Scanline);
    }

    fn arm_at(&mut self, x: u16, y: u16, event: Event<T>) {
        let wait = self.time_until(x, y);
        self.scheduler.schedule_in(self.now, wait, event);
    }

    fn arm_raster_slots(&mut self) {
        self.arm_at(0, 0, Event::FrameStart);
        let vblank_line = self.config().vblank_start_line();
        self.arm_at(0, vblank_line, Event::VblankBegin);
        if self.scheduler.is_pending(Slot::VblankEnd) {
            self.arm_vblank_end();
        }
        self.arm_scanline();
    }

    /// Arm vblank end at the next frame origin if the beam is inside the
    /// vertical blank, otherwise park it.
    fn arm_vblank_end(&mut self) {
        let config = *self.config();
        let y = self.position().y;
        if config.vblank_lines() > 0 && y >= config.vblank_start_line() {
            let end = self.clock.next_frame_start(self.now);
            self.scheduler.schedule(end, Event::VblankEnd);
        } else {
            self.scheduler.cancel(Slot::VblankEnd);
        }
    }

    fn arm_scanline(&mut self) {
        if !self.scanline_events {
            self.scheduler.cancel(Slot::Scanline);
            return;
        }
        let position = self.position();
        let line_start = self.clock.pixel_offset(0, position.y);
        if self.clock.frame_offset(self.now).get() == line_start {
            self.scheduler.schedule(self.now, Event::Scanline);
        } else {
            let next = (position.y + 1) % self.config().height();
            self.arm_at(0, next, Event::Scanline);
        }
    }

    /// Capture the raster bookkeeping.
    #[must_use]
    pub fn state(&self) -> ScreenState<T> {
        ScreenState {
            now: self.now,
            origin: self.clock.vblank_end_time(),
            vblank_start: self.clock.vblank_start_time(),
            watermark: self.compositor.watermark(),
            changed: self.compositor.frame_changed(),
            frame: self.frame,
            running: self.running,
            scanline_events: self.scanline_events,
            pending: self.scheduler.armed(),
        }
    }

    /// Reinstate bookkeeping captured by [`Screen::state`]. The configuration
    /// is not part of the state and must already match.
    pub fn restore_state(&mut self, state: &ScreenState<T>) {
        self.now = state.now;
        self.clock.restore(state.origin, state.vblank_start);
        self.compositor.restore(state.watermark, state.changed);
        self.frame = state.frame;
        self.running = state.running;
        self.scanline_events = state.scanline_events;
        self.scheduler.cancel_all();
        for pending in &state.pending {
            self.scheduler.schedule(pending.at, pending.event);
        }
    }
}

/// Serializable raster bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenState<T> {
    pub now: Ticks,
    pub origin: i64,
    pub vblank_start: i64,
    pub watermark: u16,
    pub changed: bool,
    pub frame: u64,
    pub running: bool,
    pub scanline_events: bool,
    pub pending: Vec<Pending<T>>,
}
