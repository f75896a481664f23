//! Headless surface that prints samples as text lines.

use glam::Vec2;
use std::io::{self, Stdout, Write};

use super::surface::{RenderError, Surface};
use crate::telemetry::OrientationSample;

/// Writes one line per changed sample and draws nothing.
pub struct PrintSurface<W: Write = Stdout> {
    out: W,
    last: Option<OrientationSample>,
    lines: u64,
}

impl PrintSurface<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PrintSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            lines: 0,
        }
    }

    /// Number of sample lines written so far.
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Surface for PrintSurface<W> {
    fn size(&self) -> (u16, u16) {
        (0, 0)
    }

    fn begin_frame(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn draw_line(&mut self, _from: Vec2, _to: Vec2, _glyph: char) {}

    fn draw_text(&mut self, _col: u16, _row: u16, _text: &str) {}

    fn present_sample(&mut self, sample: &OrientationSample) -> Result<(), RenderError> {
        if self.last.as_ref() == Some(sample) {
            return Ok(());
        }
        writeln!(self.out, "{}", sample)?;
        self.last = Some(*sample);
        self.lines += 1;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        self.out.flush()?;
        Ok(())
    }

    fn poll_quit(&mut self) -> Result<bool, RenderError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prints_only_changes() {
        let mut surface = PrintSurface::new(Vec::new());
        let a = OrientationSample::Euler { x: 10.0, y: -5.0 };
        let b = OrientationSample::Euler { x: 11.0, y: -5.0 };

        surface.present_sample(&a).unwrap();
        surface.present_sample(&a).unwrap();
        surface.present_sample(&b).unwrap();

        assert_eq!(surface.lines_written(), 2);
        let text = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(text, "x = 10\ty = -5\nx = 11\ty = -5\n");
    }

    #[test]
    fn test_never_requests_quit() {
        let mut surface = PrintSurface::new(Vec::new());
        assert!(!surface.poll_quit().unwrap());
        assert_eq!(surface.size(), (0, 0));
    }
}
