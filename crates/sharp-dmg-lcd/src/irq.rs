//! STAT interrupt line.
//!
//! The four STAT sources share one interrupt line and a request is only
//! raised on its rising edge. A source asserted while another already holds
//! the line is absorbed.

/// Interrupt request bits, as in IF.
pub const INT_VBLANK: u8 = 0x01;
pub const INT_STAT: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatIrq {
    /// A mode source (0, 1 or 2) holds the line.
    pub mode_irq: bool,
    /// The LY=LYC source holds the line.
    pub line_irq: bool,
    /// Line-0 match armed on the last line, resolved at `FrameBlankExitPre`.
    pub delayed_line_irq: bool,
    /// Mode-2 source armed by `LineBlankRearm` for the next search.
    pub triggering_mode_irq: bool,
    /// LY=LYC match armed at a line head, resolved by the next phase.
    pub triggering_line_irq: bool,
}

impl StatIrq {
    #[must_use]
    pub const fn line_high(&self) -> bool {
        self.mode_irq || self.line_irq
    }

    /// Assert the mode source. Returns whether this is a rising edge.
    pub fn raise_mode(&mut self) -> bool {
        let edge = !self.line_high();
        self.mode_irq = true;
        edge
    }

    /// Assert the LY=LYC source. Returns whether this is a rising edge.
    pub fn raise_line(&mut self) -> bool {
        let edge = !self.line_high();
        self.line_irq = true;
        edge
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
