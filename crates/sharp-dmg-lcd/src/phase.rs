//! LCD phases and the transition table.
//!
//! One scanline of the visible area runs
//!
//! ```text
//! head(4) -> LineSearch(80) -> LineTransfer(172..) [-> LineTransferAdjust(4)]
//!         -> LineBlankPre(4) -> LineBlank(rest) -> LineBlankRearm(4)
//! ```
//!
//! where the head is `FrameBlankExit` on line 0 and `LineBlankAdvance`
//! everywhere else. The first vertical-blank line is headed by
//! `LineBlankAdvance` followed by `FrameBlankEnter`; later ones by
//! `FrameBlankAdvance` followed by `FrameBlankHold`, except the last, which
//! wraps LY to 0 early and runs `FrameBlankWrap`, `FrameBlankWrapCompare`
//! and `FrameBlankExitPre`.

use std::fmt;

/// A phase of the LCD state machine. The phase stored in the engine is the
/// one most recently entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Mode 2: OAM search.
    LineSearch,
    /// Mode 3: pixel transfer.
    LineTransfer,
    /// Extra transfer time when SCX & 3 == 3.
    LineTransferAdjust,
    /// Internal mode 0 ahead of the reported one. Palette unlocks here.
    LineBlankPre,
    /// Mode 0: horizontal blank.
    LineBlank,
    /// Internal mode 2 ahead of the next line.
    LineBlankRearm,
    /// Line head: LY increments.
    LineBlankAdvance,
    /// Mode 1 begins.
    FrameBlankEnter,
    FrameBlankHold,
    /// Vertical-blank line head: LY increments.
    FrameBlankAdvance,
    /// Last line: LY reads 0 from here on.
    FrameBlankWrap,
    FrameBlankWrapCompare,
    FrameBlankExitPre,
    /// Line 0 head at beam (0,0). Entered synchronously on enable.
    #[default]
    FrameBlankExit,
}

/// Line numbers the transition table depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineGeometry {
    /// First line of the vertical blank (144 on hardware).
    pub vblank_start: u16,
    /// Last line of the frame (153 on hardware).
    pub last_line: u16,
}

impl LineGeometry {
    #[must_use]
    pub const fn new(vblank_start: u16, height: u16) -> Self {
        Self {
            vblank_start,
            last_line: height - 1,
        }
    }
}

impl Phase {
    pub const ALL: [Phase; 14] = [
        Phase::LineSearch,
        Phase::LineTransfer,
        Phase::LineTransferAdjust,
        Phase::LineBlankPre,
        Phase::LineBlank,
        Phase::LineBlankRearm,
        Phase::LineBlankAdvance,
        Phase::FrameBlankEnter,
        Phase::FrameBlankHold,
        Phase::FrameBlankAdvance,
        Phase::FrameBlankWrap,
        Phase::FrameBlankWrapCompare,
        Phase::FrameBlankExitPre,
        Phase::FrameBlankExit,
    ];

    /// Phase entered after this one. `ly` is LY as left by this phase's entry
    /// and `scroll_x` the SCX value latched for the line.
    #[must_use]
    pub const fn successor(self, ly: u16, geometry: LineGeometry, scroll_x: u8) -> Phase {
        match self {
            Phase::LineSearch => Phase::LineTransfer,
            Phase::LineTransfer => {
                if needs_transfer_adjust(scroll_x) {
                    Phase::LineTransferAdjust
                } else {
                    Phase::LineBlankPre
                }
            }
            Phase::LineTransferAdjust => Phase::LineBlankPre,
            Phase::LineBlankPre => Phase::LineBlank,
            Phase::LineBlank => Phase::LineBlankRearm,
            Phase::LineBlankRearm => Phase::LineBlankAdvance,
            Phase::LineBlankAdvance => {
                if ly >= geometry.vblank_start {
                    Phase::FrameBlankEnter
                } else {
                    Phase::LineSearch
                }
            }
            Phase::FrameBlankEnter | Phase::FrameBlankHold => Phase::FrameBlankAdvance,
            Phase::FrameBlankAdvance => {
                if ly >= geometry.last_line {
                    Phase::FrameBlankWrap
                } else {
                    Phase::FrameBlankHold
                }
            }
            Phase::FrameBlankWrap => Phase::FrameBlankWrapCompare,
            Phase::FrameBlankWrapCompare => Phase::FrameBlankExitPre,
            Phase::FrameBlankExitPre => Phase::FrameBlankExit,
            Phase::FrameBlankExit => Phase::LineSearch,
        }
    }

    /// Phases during which the LY=LYC comparison is unresolved. LYC writes
    /// here are buffered.
    #[must_use]
    pub const fn is_compare_window(self) -> bool {
        matches!(
            self,
            Phase::LineBlankAdvance
                | Phase::FrameBlankAdvance
                | Phase::FrameBlankWrap
                | Phase::FrameBlankWrapCompare
        )
    }

    /// Phases that begin a scanline. Remainder durations are measured from
    /// their entry.
    #[must_use]
    pub const fn is_line_head(self) -> bool {
        matches!(
            self,
            Phase::LineBlankAdvance | Phase::FrameBlankAdvance | Phase::FrameBlankExit
        )
    }

    /// Phases that belong to the vertical blank.
    #[must_use]
    pub const fn is_frame_blank(self) -> bool {
        matches!(
            self,
            Phase::FrameBlankEnter
                | Phase::FrameBlankHold
                | Phase::FrameBlankAdvance
                | Phase::FrameBlankWrap
                | Phase::FrameBlankWrapCompare
                | Phase::FrameBlankExitPre
        )
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::LineSearch => "line_search",
            Phase::LineTransfer => "line_transfer",
            Phase::LineTransferAdjust => "line_transfer_adjust",
            Phase::LineBlankPre => "line_blank_pre",
            Phase::LineBlank => "line_blank",
            Phase::LineBlankRearm => "line_blank_rearm",
            Phase::LineBlankAdvance => "line_blank_advance",
            Phase::FrameBlankEnter => "frame_blank_enter",
            Phase::FrameBlankHold => "frame_blank_hold",
            Phase::FrameBlankAdvance => "frame_blank_advance",
            Phase::FrameBlankWrap => "frame_blank_wrap",
            Phase::FrameBlankWrapCompare => "frame_blank_wrap_compare",
            Phase::FrameBlankExitPre => "frame_blank_exit_pre",
            Phase::FrameBlankExit => "frame_blank_exit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// SCX alignment quirk: fine scroll 3 inserts [`Phase::LineTransferAdjust`].
#[must_use]
pub const fn needs_transfer_adjust(scroll_x: u8) -> bool {
    scroll_x & 3 == 3
}

#[cfg(test)]
mod tests {
    use super::*;

    const DMG: LineGeometry = LineGeometry::new(144, 154);

    fn walk_line(mut phase: Phase, mut ly: u16, scroll_x: u8) -> Vec<Phase> {
        let mut seen = vec![phase];
        loop {
            let next = phase.successor(ly, DMG, scroll_x);
            if next.is_line_head() {
                return seen;
            }
            if next == Phase::FrameBlankWrap {
                ly = 0;
            }
            seen.push(next);
            phase = next;
        }
    }

    #[test]
    fn visible_line_sequence() {
        assert_eq!(
            walk_line(Phase::LineBlankAdvance, 5, 0),
            vec![
                Phase::LineBlankAdvance,
                Phase::LineSearch,
                Phase::LineTransfer,
                Phase::LineBlankPre,
                Phase::LineBlank,
                Phase::LineBlankRearm,
            ]
        );
    }

    #[test]
    fn fine_scroll_three_inserts_adjust() {
        let line = walk_line(Phase::FrameBlankExit, 0, 7);
        assert_eq!(line[2..4], [Phase::LineTransfer, Phase::LineTransferAdjust]);
        assert!(!walk_line(Phase::FrameBlankExit, 0, 6).contains(&Phase::LineTransferAdjust));
    }

    #[test]
    fn vblank_entry_and_wrap() {
        assert_eq!(
            Phase::LineBlankAdvance.successor(144, DMG, 0),
            Phase::FrameBlankEnter
        );
        assert_eq!(
            Phase::FrameBlankAdvance.successor(150, DMG, 0),
            Phase::FrameBlankHold
        );
        assert_eq!(
            walk_line(Phase::FrameBlankAdvance, 153, 0),
            vec![
                Phase::FrameBlankAdvance,
                Phase::FrameBlankWrap,
                Phase::FrameBlankWrapCompare,
                Phase::FrameBlankExitPre,
            ]
        );
        assert_eq!(
            Phase::FrameBlankExitPre.successor(0, DMG, 0),
            Phase::FrameBlankExit
        );
    }

    #[test]
    fn compare_window_phases_are_heads_or_wrap() {
        for phase in Phase::ALL {
            if phase.is_compare_window() {
                assert!(
                    phase.is_line_head()
                        || matches!(phase, Phase::FrameBlankWrap | Phase::FrameBlankWrapCompare),
                    "{phase}"
                );
            }
        }
        assert!(!Phase::FrameBlankExit.is_compare_window());
    }
}
