//! Grayscale drawing surface that glyph bitmaps are blitted onto before the
//! merged rectangles are cropped out and handed to the packer.

/// Fixed-size 8-bit grayscale canvas.
///
/// One instance is reused across `render` calls; `clear` resets it between
/// labels. Blits clip against the canvas edges and blend with `max` so
/// overlapping glyphs (cursive joins, stacked marks) don't punch holes in
/// each other.
pub struct GlyphCanvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GlyphCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Zero every pixel, keeping the allocation.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Blit a glyph coverage bitmap at `(x, y)`, clipped to the canvas.
    ///
    /// `bitmap` is `w * h` bytes, row major. Pixels outside the canvas are
    /// discarded; pixels inside take the max of source and destination.
    pub fn blit(&mut self, bitmap: &[u8], w: usize, h: usize, x: i32, y: i32) {
        for row in 0..h {
            let dy = y + row as i32;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            let src_row = &bitmap[row * w..(row + 1) * w];
            for (col, &src) in src_row.iter().enumerate() {
                let dx = x + col as i32;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let dst = &mut self.pixels[dy as usize * self.width + dx as usize];
                *dst = (*dst).max(src);
            }
        }
    }

    /// Copy out the rectangle at `(x, y, w, h)`, clamped to the canvas.
    ///
    /// The vertical range is clamped the way the horizontal one is; returns
    /// `None` when the clamped rectangle is degenerate.
    pub fn crop(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(Vec<u8>, usize, usize)> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let (cw, ch) = ((x1 - x0) as usize, (y1 - y0) as usize);
        let mut out = Vec::with_capacity(cw * ch);
        for row in y0 as usize..y1 as usize {
            let offset = row * self.width + x0 as usize;
            out.extend_from_slice(&self.pixels[offset..offset + cw]);
        }
        Some((out, cw, ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_and_crop_roundtrip() {
        let mut canvas = GlyphCanvas::new(16, 8);
        canvas.blit(&[1, 2, 3, 4], 2, 2, 3, 2);
        let (pixels, w, h) = canvas.crop(3, 2, 2, 2).unwrap();
        assert_eq!((w, h), (2, 2));
        assert_eq!(pixels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn blit_clips_at_edges() {
        let mut canvas = GlyphCanvas::new(4, 4);
        canvas.blit(&[9; 9], 3, 3, -1, -1);
        let (pixels, w, h) = canvas.crop(0, 0, 4, 4).unwrap();
        assert_eq!((w, h), (4, 4));
        assert_eq!(pixels[0], 9);
        assert_eq!(pixels[5], 9);
        assert_eq!(pixels[10], 0);
    }

    #[test]
    fn blit_max_blend() {
        let mut canvas = GlyphCanvas::new(2, 1);
        canvas.blit(&[200, 10], 2, 1, 0, 0);
        canvas.blit(&[50, 60], 2, 1, 0, 0);
        let (pixels, ..) = canvas.crop(0, 0, 2, 1).unwrap();
        assert_eq!(pixels, vec![200, 60]);
    }

    #[test]
    fn crop_clamps_vertically() {
        let canvas = GlyphCanvas::new(8, 4);
        let (_, w, h) = canvas.crop(0, -2, 4, 10).unwrap();
        assert_eq!((w, h), (4, 4));
    }

    #[test]
    fn crop_degenerate_is_none() {
        let canvas = GlyphCanvas::new(8, 4);
        assert!(canvas.crop(10, 0, 4, 4).is_none());
        assert!(canvas.crop(0, 0, 0, 4).is_none());
    }

    #[test]
    fn clear_zeroes() {
        let mut canvas = GlyphCanvas::new(2, 2);
        canvas.blit(&[255; 4], 2, 2, 0, 0);
        canvas.clear();
        let (pixels, ..) = canvas.crop(0, 0, 2, 2).unwrap();
        assert!(pixels.iter().all(|&p| p == 0));
    }
}
