//! Partial render compositor.
//!
//! Tracks how far down the frame has already been handed to the renderer
//! and only forwards newly reached lines, clipped to the visible area.

use crate::config::Rect;

/// External renderer. Pixel work happens entirely on the other side of
/// this trait.
pub trait Renderer {
    /// Draw the rows of `clip`. Returns whether the output changed.
    fn render(&mut self, clip: Rect) -> bool;

    /// Number of overlay objects selected for `line`. Feeds phase durations.
    fn objects_on_line(&mut self, _line: u16) -> u8 {
        0
    }
}

/// Renderer that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _clip: Rect) -> bool {
        false
    }
}

pub struct Compositor {
    renderer: Box<dyn Renderer>,
    /// First line not yet rendered this frame.
    watermark: u16,
    /// Any render this frame reported a change.
    changed: bool,
}

impl Compositor {
    #[must_use]
    pub fn new(renderer: Box<dyn Renderer>) -> Self {
        Self {
            renderer,
            watermark: 0,
            changed: false,
        }
    }

    /// Render up to and including `line`. Requests behind the watermark are
    /// ignored. Returns whether this call changed the output.
    pub fn render_up_to(&mut self, line: u16, visible: &Rect) -> bool {
        if line < self.watermark {
            log::trace!("render to {line} skipped, watermark at {}", self.watermark);
            return false;
        }
        let first = self.watermark.max(visible.min_y);
        let last = line.min(visible.max_y);
        let mut changed = false;
        if first <= last {
            changed = self.renderer.render(Rect::new(visible.min_x, visible.max_x, first, last));
            self.changed |= changed;
        }
        self.watermark = line.saturating_add(1);
        changed
    }

    /// Frame boundary.
    pub fn reset(&mut self) {
        self.watermark = 0;
        self.changed = false;
    }

    #[must_use]
    pub fn watermark(&self) -> u16 {
        self.watermark
    }

    #[must_use]
    pub fn frame_changed(&self) -> bool {
        self.changed
    }

    pub fn objects_on_line(&mut self, line: u16) -> u8 {
        self.renderer.objects_on_line(line)
    }

    pub(crate) fn restore(&mut self, watermark: u16, changed: bool) {
        self.watermark = watermark;
        self.changed = changed;
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("watermark", &self.watermark)
            .field("changed", &self.changed)
            .finish_non_exhaustive()
    }
}
