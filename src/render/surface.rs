//! Drawing surface abstraction.

use glam::Vec2;

use crate::telemetry::OrientationSample;

/// Errors raised by a drawing surface.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Something the presentation loop can draw a frame onto.
///
/// Coordinates are in cells: `(0, 0)` is the top-left corner and
/// `size()` bounds the drawable area.
pub trait Surface {
    /// Drawable area as `(columns, rows)`.
    fn size(&self) -> (u16, u16);

    /// Height of one cell divided by its width.
    fn cell_aspect(&self) -> f32 {
        2.0
    }

    fn begin_frame(&mut self) -> Result<(), RenderError>;

    fn draw_line(&mut self, from: Vec2, to: Vec2, glyph: char);

    fn draw_text(&mut self, col: u16, row: u16, text: &str);

    /// Called once per frame with the sample being drawn.
    fn present_sample(&mut self, _sample: &OrientationSample) -> Result<(), RenderError> {
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError>;

    /// Whether the user asked to close the view. Must not block.
    fn poll_quit(&mut self) -> Result<bool, RenderError>;
}
