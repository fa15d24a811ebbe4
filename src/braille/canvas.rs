/// Braille canvas: every character cell is a 2×4 dot grid, so a `w × h`
/// character canvas has `2w × 4h` addressable pixels.
pub struct BrailleCanvas {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

/// Dot bit for a pixel inside its cell, indexed `[y % 4][x % 2]`.
const DOTS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

impl BrailleCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// Width in pixels
    pub fn pixel_width(&self) -> usize {
        self.width * 2
    }

    /// Height in pixels
    pub fn pixel_height(&self) -> usize {
        self.height * 4
    }

    /// Set a dot. Off-canvas pixels are ignored.
    pub fn plot(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= DOTS[y % 4][x % 2];
    }

    /// Bresenham line between two pixels.
    pub fn line(&mut self, (x0, y0): (i32, i32), (x1, y1): (i32, i32)) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.plot(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                if x == x1 {
                    break;
                }
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                if y == y1 {
                    break;
                }
                err += dx;
                y += sy;
            }
        }
    }

    /// Non-empty cells as `(column, row, glyph)`.
    pub fn glyphs(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.cells.iter().enumerate().filter(|(_, b)| **b != 0).map(|(i, &b)| {
            let glyph = char::from_u32(0x2800 + b as u32).unwrap_or(' ');
            (i % self.width, i / self.width, glyph)
        })
    }

    #[cfg(test)]
    fn row(&self, row: usize) -> String {
        self.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
            .collect()
    }
}
