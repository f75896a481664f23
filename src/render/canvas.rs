//! Character-cell canvas that the terminal surface rasterizes into.

use glam::Vec2;

/// Lines whose endpoints land further off-canvas than this are skipped.
const MAX_COORD: f32 = 16_384.0;

/// A grid of character cells addressed by column and row.
#[derive(Debug, Clone)]
pub struct CharCanvas {
    width: u16,
    height: u16,
    cells: Vec<char>,
}

impl CharCanvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize and blank the canvas. No-op if the size is unchanged.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.cells = vec![' '; width as usize * height as usize];
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    /// Set one cell; coordinates outside the canvas are ignored.
    pub fn put(&mut self, col: i32, row: i32, glyph: char) {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return;
        }
        let idx = row as usize * self.width as usize + col as usize;
        self.cells[idx] = glyph;
    }

    pub fn get(&self, col: u16, row: u16) -> Option<char> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.cells[row as usize * self.width as usize + col as usize])
    }

    /// Draw a line between two cell-space points (Bresenham).
    pub fn draw_line(&mut self, from: Vec2, to: Vec2, glyph: char) {
        if !from.is_finite()
            || !to.is_finite()
            || from.abs().max_element() > MAX_COORD
            || to.abs().max_element() > MAX_COORD
        {
            return;
        }

        let (mut x0, mut y0) = (from.x.round() as i32, from.y.round() as i32);
        let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put(x0, y0, glyph);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Write text starting at a cell, clipped at the right edge.
    pub fn draw_text(&mut self, col: u16, row: u16, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            let glyph = if ch.is_control() { ' ' } else { ch };
            self.put(col as i32 + i as i32, row as i32, glyph);
        }
    }

    /// One row as a string.
    pub fn row(&self, row: u16) -> String {
        if row >= self.height {
            return String::new();
        }
        let start = row as usize * self.width as usize;
        self.cells[start..start + self.width as usize].iter().collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(move |r| self.row(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_is_blank() {
        let canvas = CharCanvas::new(4, 2);
        assert_eq!(canvas.row(0), "    ");
        assert_eq!(canvas.rows().count(), 2);
    }

    #[test]
    fn test_put_ignores_out_of_bounds() {
        let mut canvas = CharCanvas::new(3, 3);
        canvas.put(-1, 0, '#');
        canvas.put(3, 0, '#');
        canvas.put(0, 3, '#');
        assert!(canvas.rows().all(|r| r == "   "));
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = CharCanvas::new(5, 1);
        canvas.draw_line(Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), '-');
        assert_eq!(canvas.row(0), "-----");
    }

    #[test]
    fn test_diagonal_line_hits_endpoints() {
        let mut canvas = CharCanvas::new(4, 4);
        canvas.draw_line(Vec2::new(3.0, 3.0), Vec2::new(0.0, 0.0), '\\');
        for i in 0..4 {
            assert_eq!(canvas.get(i, i), Some('\\'));
        }
        assert_eq!(canvas.get(3, 0), Some(' '));
    }

    #[test]
    fn test_line_partly_off_canvas_is_clipped() {
        let mut canvas = CharCanvas::new(3, 1);
        canvas.draw_line(Vec2::new(-5.0, 0.0), Vec2::new(10.0, 0.0), '=');
        assert_eq!(canvas.row(0), "===");
    }

    #[test]
    fn test_degenerate_lines_are_skipped() {
        let mut canvas = CharCanvas::new(3, 1);
        canvas.draw_line(Vec2::new(f32::NAN, 0.0), Vec2::new(1.0, 0.0), '=');
        canvas.draw_line(Vec2::new(-1e9, 0.0), Vec2::new(1.0, 0.0), '=');
        assert_eq!(canvas.row(0), "   ");
    }

    #[test]
    fn test_text_is_clipped_and_sanitized() {
        let mut canvas = CharCanvas::new(6, 1);
        canvas.draw_text(2, 0, "a\tbcdef");
        assert_eq!(canvas.row(0), "  a bc");
    }

    #[test]
    fn test_resize_and_clear() {
        let mut canvas = CharCanvas::new(2, 1);
        canvas.draw_text(0, 0, "ab");
        canvas.resize(2, 1);
        assert_eq!(canvas.row(0), "ab");
        canvas.clear();
        assert_eq!(canvas.row(0), "  ");
        canvas.resize(3, 2);
        assert_eq!(canvas.width(), 3);
        assert_eq!(canvas.height(), 2);
        assert_eq!(canvas.row(1), "   ");
    }
}
