//! Phase durations.
//!
//! # DMG timing (456 ticks per line)
//!
//! | Phase | Ticks |
//! |-------|-------|
//! | line head | 4 |
//! | OAM search | 80 |
//! | transfer | 168, +4 when SCX bit 2 is set, + object penalty |
//! | transfer adjust | 4 (SCX & 3 == 3) |
//! | blank pre | 4 |
//! | blank | rest of the line less 4 |
//! | blank rearm | 4 |
//!
//! Remainder phases are measured from the line head, so a line always sums
//! to the scan time whatever the transfer took.

use emu_core::Ticks;

use crate::phase::Phase;

/// Per-line inputs to a duration query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationInputs {
    /// Ticks per scanline.
    pub scan_time: Ticks,
    /// Ticks since the current line's head phase was entered.
    pub line_elapsed: Ticks,
    /// Objects selected for the current line.
    pub objects: u8,
    /// SCX as latched at the start of the line.
    pub scroll_x: u8,
}

/// Source of phase durations for a particular controller model.
pub trait PhaseDurationProvider {
    /// Time spent in `phase` before its successor is entered.
    fn duration(&self, phase: Phase, inputs: &DurationInputs) -> Ticks;

    /// Shortest scan time for which every line still fits.
    fn min_scan_time(&self) -> Ticks;
}

/// Line head phases.
pub const HEAD_TICKS: u64 = 4;
pub const SEARCH_TICKS: u64 = 80;
pub const TRANSFER_BASE_TICKS: u64 = 168;
/// Added to transfer when SCX bit 2 is set.
pub const SCROLL_PENALTY_TICKS: u64 = 4;
pub const ADJUST_TICKS: u64 = 4;
pub const BLANK_PRE_TICKS: u64 = 4;
pub const REARM_TICKS: u64 = 4;
/// Lead of `FrameBlankWrap` and `FrameBlankWrapCompare`.
pub const WRAP_TICKS: u64 = 4;

/// Object fetch penalty for 0..=10 objects on a line.
pub const OBJECT_PENALTY: [u64; 11] = [0, 8, 20, 32, 44, 52, 64, 76, 88, 96, 108];

/// Transfer time without the adjust phase.
#[must_use]
pub fn transfer_ticks(objects: u8, scroll_x: u8) -> u64 {
    let penalty = OBJECT_PENALTY[usize::from(objects).min(OBJECT_PENALTY.len() - 1)];
    let scroll = if scroll_x & 4 != 0 {
        SCROLL_PENALTY_TICKS
    } else {
        0
    };
    TRANSFER_BASE_TICKS + scroll + penalty
}

/// Durations of the original monochrome controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DmgTiming;

impl PhaseDurationProvider for DmgTiming {
    fn duration(&self, phase: Phase, inputs: &DurationInputs) -> Ticks {
        let rest_of_line = inputs.scan_time - inputs.line_elapsed;
        let ticks = match phase {
            Phase::LineBlankAdvance | Phase::FrameBlankAdvance | Phase::FrameBlankExit => {
                HEAD_TICKS
            }
            Phase::LineSearch => SEARCH_TICKS,
            Phase::LineTransfer => transfer_ticks(inputs.objects, inputs.scroll_x),
            Phase::LineTransferAdjust => ADJUST_TICKS,
            Phase::LineBlankPre => BLANK_PRE_TICKS,
            Phase::LineBlank => return rest_of_line - Ticks::new(REARM_TICKS),
            Phase::LineBlankRearm => REARM_TICKS,
            Phase::FrameBlankWrap | Phase::FrameBlankWrapCompare => WRAP_TICKS,
            Phase::FrameBlankEnter | Phase::FrameBlankHold | Phase::FrameBlankExitPre => {
                return rest_of_line;
            }
        };
        Ticks::new(ticks)
    }

    fn min_scan_time(&self) -> Ticks {
        // Longest line up to the blank, one tick of blank, then the rearm.
        Ticks::new(
            HEAD_TICKS
                + SEARCH_TICKS
                + transfer_ticks(10, 4)
                + ADJUST_TICKS
                + BLANK_PRE_TICKS
                + 1
                + REARM_TICKS,
        )
    }
}
