use super::surface::{DrawingSurface, StrokeStyle};
use crate::geometry::CanonicalBox;

/// Draws the single highlighted box.
///
/// Used for both the live preview while drawing and every tracked frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameRenderer {
    style: StrokeStyle,
}

impl FrameRenderer {
    pub fn new(style: StrokeStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Clear the whole surface, then outline `rect`.
    pub fn render(&self, surface: &mut dyn DrawingSurface, rect: CanonicalBox) {
        surface.clear();
        surface.stroke_rect(rect, &self.style);
    }
}
