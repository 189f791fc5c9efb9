/// Empty braille cell (no dots raised)
pub const BLANK: char = '\u{2800}';

/// Braille Unicode canvas: every character cell holds a 2x4 dot grid.
/// Patterns live in U+2800..=U+28FF.
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>, // Dot bits, row-major
}

impl BrailleCanvas {
    /// Canvas of `width` x `height` characters, i.e. `width*2` x `height*4` dots
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Dot width
    pub fn pixel_width(&self) -> usize {
        self.width * 2
    }

    /// Dot height
    pub fn pixel_height(&self) -> usize {
        self.height * 4
    }

    /// Raise one dot.
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }

        const BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];
        self.cells[cy * self.width + cx] |= BITS[x % 2][y % 4];
    }

    /// Signed variant, off-canvas dots are dropped
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Character at a cell, `None` outside the canvas
    pub fn char_at(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.width || row >= self.height {
            return None;
        }
        char::from_u32(0x2800 + self.cells[row * self.width + col] as u32)
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// One row as a string of braille characters
    pub fn row_to_string(&self, row: usize) -> String {
        (0..self.width).filter_map(|col| self.char_at(col, row)).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(|i| self.row_to_string(i))
    }

    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.rows().collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_string(), "⠁");
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.to_string(), "⣿");
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(4, 0);
        canvas.set_pixel_signed(-1, 2);
        assert_eq!(canvas.to_string(), "⠀⠀");
        assert_eq!(canvas.char_at(2, 0), None);
    }

    #[test]
    fn test_clear() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_pixel(3, 7);
        assert_eq!(canvas.char_at(1, 1), Some('⢀'));
        canvas.clear();
        assert_eq!(canvas.char_at(1, 1), Some(BLANK));
    }
}
