//! Raster timing for scanline displays.
//!
//! A [`Screen`] tracks where a simulated electron beam is at any tick of a
//! fixed master clock. It answers "where is the beam now" and "when will it
//! reach (x, y)", fires frame-start and vertical-blank deadlines from a small
//! set of one-shot [`Scheduler`] slots, lets a display controller park its own
//! phase deadline in the same scheduler, and renders the visible area
//! incrementally through a [`Compositor`] so that mid-frame register changes
//! show up on the right lines.
//!
//! The crate knows nothing about any particular controller. Phase tags are a
//! type parameter and renderers are trait objects.

mod clock;
mod compositor;
mod config;
mod listener;
mod scheduler;
mod screen;

pub use clock::{BeamPosition, RasterClock};
pub use compositor::{Compositor, NullRenderer, Renderer};
pub use config::{ConfigError, DisplayConfig, Rect};
pub use listener::{
    Deferred, ListenerHandle, ListenerRegistry, Notification, RasterEvent, RasterListener,
};
pub use scheduler::{Event, Pending, Scheduler, Slot};
pub use screen::{Screen, ScreenState};
