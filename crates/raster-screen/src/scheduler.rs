//! One-shot deadline slots.
//!
//! Each concern owns exactly one slot holding at most one pending event.
//! Scheduling replaces whatever the slot held; cancelling parks the slot at
//! [`Ticks::NEVER`]. Events due on the same tick fire in slot order.

use emu_core::Ticks;

/// Deadline slots, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Slot {
    /// Next phase transition of the display controller.
    Phase,
    /// Beam at (0,0): partial-update bookkeeping resets.
    FrameStart,
    VblankBegin,
    VblankEnd,
    /// Optional per-scanline tick at x = 0.
    Scanline,
}

impl Slot {
    pub const COUNT: usize = 5;
    pub const ALL: [Slot; Self::COUNT] = [
        Slot::Phase,
        Slot::FrameStart,
        Slot::VblankBegin,
        Slot::VblankEnd,
        Slot::Scanline,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// What fires when a deadline is reached. `T` is the controller's phase tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event<T> {
    Phase(T),
    FrameStart,
    VblankBegin,
    VblankEnd,
    Scanline,
}

impl<T> Event<T> {
    #[must_use]
    pub const fn slot(&self) -> Slot {
        match self {
            Event::Phase(_) => Slot::Phase,
            Event::FrameStart => Slot::FrameStart,
            Event::VblankBegin => Slot::VblankBegin,
            Event::VblankEnd => Slot::VblankEnd,
            Event::Scanline => Slot::Scanline,
        }
    }
}

/// A deadline plus the event it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pending<T> {
    pub at: Ticks,
    pub event: Event<T>,
}

/// Fixed set of deadline slots.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    slots: [Pending<T>; Slot::COUNT],
}

impl<T: Copy + Default> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> Scheduler<T> {
    /// A scheduler with every slot idle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Slot::ALL.map(|slot| Pending {
                at: Ticks::NEVER,
                event: idle_event(slot),
            }),
        }
    }

    /// Arm `event`'s slot for the absolute tick `at`, replacing anything
    /// pending there.
    pub fn schedule(&mut self, at: Ticks, event: Event<T>) {
        self.slots[event.slot().index()] = Pending { at, event };
    }

    /// Arm `event`'s slot `duration` ticks after `now`.
    pub fn schedule_in(&mut self, now: Ticks, duration: Ticks, event: Event<T>) {
        self.schedule(now + duration, event);
    }

    /// Park a slot at "never".
    pub fn cancel(&mut self, slot: Slot) {
        self.slots[slot.index()].at = Ticks::NEVER;
    }

    pub fn cancel_all(&mut self) {
        for pending in &mut self.slots {
            pending.at = Ticks::NEVER;
        }
    }

    /// Deadline of a slot ([`Ticks::NEVER`] when idle).
    #[must_use]
    pub fn deadline(&self, slot: Slot) -> Ticks {
        self.slots[slot.index()].at
    }

    /// Pending entry of a slot, if armed.
    #[must_use]
    pub fn pending(&self, slot: Slot) -> Option<Pending<T>> {
        let pending = self.slots[slot.index()];
        (!pending.at.is_never()).then_some(pending)
    }

    #[must_use]
    pub fn is_pending(&self, slot: Slot) -> bool {
        !self.deadline(slot).is_never()
    }

    /// Earliest armed deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Pending<T>> {
        self.slots
            .iter()
            .filter(|pending| !pending.at.is_never())
            .min_by_key(|pending| pending.at)
            .copied()
    }

    /// Remove and return the earliest deadline not later than `until`.
    ///
    /// The slot is parked at "never" before the event is handed out, so a
    /// handler that re-arms its own slot is never overwritten.
    pub fn pop_due(&mut self, until: Ticks) -> Option<Pending<T>> {
        let next = self.next_deadline()?;
        if next.at > until {
            return None;
        }
        self.cancel(next.event.slot());
        Some(next)
    }

    /// All armed slots, in slot order.
    #[must_use]
    pub fn armed(&self) -> Vec<Pending<T>> {
        self.slots
            .iter()
            .filter(|pending| !pending.at.is_never())
            .copied()
            .collect()
    }
}

fn idle_event<T: Default>(slot: Slot) -> Event<T> {
    match slot {
        Slot::Phase => Event::Phase(T::default()),
        Slot::FrameStart => Event::FrameStart,
        Slot::VblankBegin => Event::VblankBegin,
        Slot::VblankEnd => Event::VblankEnd,
        Slot::Scanline => Event::Scanline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scheduler_is_idle() {
        let scheduler: Scheduler<u8> = Scheduler::new();
        for slot in Slot::ALL {
            assert!(!scheduler.is_pending(slot));
        }
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn scheduling_replaces_pending_deadline() {
        let mut scheduler: Scheduler<u8> = Scheduler::new();
        scheduler.schedule(Ticks::new(100), Event::Phase(1));
        scheduler.schedule(Ticks::new(40), Event::Phase(2));
        assert_eq!(
            scheduler.pending(Slot::Phase),
            Some(Pending {
                at: Ticks::new(40),
                event: Event::Phase(2)
            })
        );
        assert_eq!(scheduler.armed().len(), 1);
    }

    #[test]
    fn cancel_parks_slot_at_never() {
        let mut scheduler: Scheduler<u8> = Scheduler::new();
        scheduler.schedule_in(Ticks::new(10), Ticks::new(5), Event::VblankBegin);
        assert_eq!(scheduler.deadline(Slot::VblankBegin), Ticks::new(15));
        scheduler.cancel(Slot::VblankBegin);
        assert_eq!(scheduler.deadline(Slot::VblankBegin), Ticks::NEVER);
        assert_eq!(scheduler.pop_due(Ticks::new(1_000)), None);
    }

    #[test]
    fn pop_due_respects_time_and_slot_order() {
        let mut scheduler: Scheduler<u8> = Scheduler::new();
        scheduler.schedule(Ticks::new(20), Event::Scanline);
        scheduler.schedule(Ticks::new(20), Event::Phase(7));
        scheduler.schedule(Ticks::new(30), Event::VblankEnd);
        assert_eq!(scheduler.pop_due(Ticks::new(19)), None);
        assert_eq!(scheduler.pop_due(Ticks::new(25)).map(|p| p.event), Some(Event::Phase(7)));
        assert_eq!(scheduler.pop_due(Ticks::new(25)).map(|p| p.event), Some(Event::Scanline));
        assert_eq!(scheduler.pop_due(Ticks::new(25)), None);
        assert_eq!(scheduler.pop_due(Ticks::new(30)).map(|p| p.event), Some(Event::VblankEnd));
    }

    #[test]
    fn schedule_in_saturates() {
        let mut scheduler: Scheduler<u8> = Scheduler::new();
        scheduler.schedule_in(Ticks::new(u64::MAX - 1), Ticks::new(10), Event::FrameStart);
        assert!(!scheduler.is_pending(Slot::FrameStart));
    }
}
