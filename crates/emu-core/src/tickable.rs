//! Components driven by master clock time.

use crate::Ticks;

/// A component that owns a position in simulated time.
///
/// Event-driven components jump straight to their next deadline, so the
/// primitive operation is `advance_to`. Stepping one tick at a time must be
/// observationally identical to a single jump over the same span.
pub trait Tickable {
    /// Current simulated time.
    fn now(&self) -> Ticks;

    /// Fire every deadline up to and including `target`, then rest there.
    /// Targets in the past are ignored.
    fn advance_to(&mut self, target: Ticks);

    /// Advance by one master clock tick.
    fn tick(&mut self) {
        self.tick_n(Ticks::new(1));
    }

    fn tick_n(&mut self, count: Ticks) {
        let target = self.now() + count;
        self.advance_to(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        now: Ticks,
        jumps: u32,
    }

    impl Tickable for Counter {
        fn now(&self) -> Ticks {
            self.now
        }

        fn advance_to(&mut self, target: Ticks) {
            self.now = self.now.max(target);
            self.jumps += 1;
        }
    }

    #[test]
    fn tick_n_is_one_jump() {
        let mut counter = Counter::default();
        counter.tick();
        counter.tick_n(Ticks::new(99));
        assert_eq!(counter.now(), Ticks::new(100));
        assert_eq!(counter.jumps, 2);
    }
}
