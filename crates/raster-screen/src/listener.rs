//! Listener registry for raster and phase notifications.

use std::cell::RefCell;
use std::rc::Rc;

use emu_core::Ticks;

use crate::clock::BeamPosition;
use crate::config::DisplayConfig;

/// Something a listener can be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterEvent {
    VblankBegin,
    VblankEnd,
    /// The line counter matched the compare register on this line.
    LineCompare(u16),
    /// Horizontal blank began on this line.
    HBlank(u16),
    /// Beam reached x = 0 of this line (only when scanline events are on).
    Scanline(u16),
}

/// Context handed to every listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub event: RasterEvent,
    pub time: Ticks,
    pub position: BeamPosition,
    pub frame: u64,
}

/// A reconfiguration requested from inside a listener. Applied by the owner
/// once the transition that produced the notification has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    Configure(DisplayConfig),
    ResetOrigin { x: u16, y: u16 },
    SetEnabled(bool),
}

/// Consumer of raster notifications.
pub trait RasterListener {
    fn notify(&mut self, notification: &Notification, deferred: &mut Vec<Deferred>);
}

/// Shared handle to a listener. Identity is the allocation, not the value.
pub type ListenerHandle = Rc<RefCell<dyn RasterListener>>;

/// Listeners in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<ListenerHandle>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `listener` unless the same allocation is already registered.
    /// Returns whether it was added.
    pub fn register(&mut self, listener: ListenerHandle) -> bool {
        if self
            .listeners
            .iter()
            .any(|existing| Rc::ptr_eq(existing, &listener))
        {
            log::trace!("listener already registered");
            return false;
        }
        self.listeners.push(listener);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Notify every listener in registration order.
    pub fn notify(&self, notification: &Notification, deferred: &mut Vec<Deferred>) {
        for listener in &self.listeners {
            listener.borrow_mut().notify(notification, deferred);
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<(&'static str, RasterEvent)>>>,
    }

    impl RasterListener for Recorder {
        fn notify(&mut self, notification: &Notification, _deferred: &mut Vec<Deferred>) {
            self.log.borrow_mut().push((self.name, notification.event));
        }
    }

    fn note(event: RasterEvent) -> Notification {
        Notification {
            event,
            time: Ticks::ZERO,
            position: BeamPosition::default(),
            frame: 0,
        }
    }

    #[test]
    fn duplicate_registration_is_a_no_op() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let listener: ListenerHandle = Rc::new(RefCell::new(Recorder {
            name: "a",
            log: Rc::clone(&log),
        }));
        let mut registry = ListenerRegistry::new();
        assert!(registry.register(Rc::clone(&listener)));
        assert!(!registry.register(Rc::clone(&listener)));
        assert_eq!(registry.len(), 1);

        registry.notify(&note(RasterEvent::VblankBegin), &mut Vec::new());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn equal_values_in_distinct_allocations_are_distinct_listeners() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        for _ in 0..2 {
            let listener: ListenerHandle = Rc::new(RefCell::new(Recorder {
                name: "same",
                log: Rc::clone(&log),
            }));
            assert!(registry.register(listener));
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn notification_follows_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        for name in ["first", "second", "third"] {
            let listener: ListenerHandle = Rc::new(RefCell::new(Recorder {
                name,
                log: Rc::clone(&log),
            }));
            registry.register(listener);
        }
        registry.notify(&note(RasterEvent::VblankEnd), &mut Vec::new());
        let names: Vec<_> = log.borrow().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }
}
