//! Shared time unit and device traits.
//!
//! All timing is counted in [`Ticks`] of one master crystal. Devices expose
//! registers through [`Bus`], move through time with [`Tickable`] and
//! answer state queries through [`Observable`].

mod bus;
mod clock;
mod observable;
mod tickable;
mod ticks;

pub use bus::Bus;
pub use clock::MasterClock;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
