//! The fundamental unit of time in the emulator.

use core::fmt;

/// A count of master clock ticks.
///
/// This is the fundamental unit of time in the emulator. All timing is
/// expressed in ticks of the master crystal oscillator. Arithmetic never
/// wraps: addition saturates at [`Ticks::NEVER`] and subtraction at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    /// A deadline that never arrives.
    pub const NEVER: Self = Self(u64::MAX);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_never(self) -> bool {
        self.0 == u64::MAX
    }

    /// Difference `self - earlier`, or `None` if `earlier` is later.
    #[must_use]
    pub const fn checked_since(self, earlier: Self) -> Option<Self> {
        match self.0.checked_sub(earlier.0) {
            Some(delta) => Some(Self(delta)),
            None => None,
        }
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            f.write_str("never")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u64> for Ticks {
    fn from(count: u64) -> Self {
        Self(count)
    }
}

impl core::ops::Add for Ticks {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl core::ops::AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl core::ops::Sub for Ticks {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl core::ops::SubAssign for Ticks {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_saturates_at_never() {
        assert_eq!(Ticks::NEVER + Ticks::new(5), Ticks::NEVER);
        assert_eq!(Ticks::new(u64::MAX - 1) + Ticks::new(9), Ticks::NEVER);
    }

    #[test]
    fn subtraction_saturates_at_zero() {
        assert_eq!(Ticks::new(3) - Ticks::new(10), Ticks::ZERO);
        assert_eq!(Ticks::new(3).checked_since(Ticks::new(10)), None);
        assert_eq!(Ticks::new(10).checked_since(Ticks::new(3)), Some(Ticks::new(7)));
    }

    #[test]
    fn never_displays_as_word() {
        assert_eq!(Ticks::NEVER.to_string(), "never");
        assert_eq!(Ticks::new(456).to_string(), "456");
    }
}
