//! Rectangle packing of glyph images into fixed-size texture pages, with
//! content-hash deduplication and normalized coordinate records.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Write;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use log::warn;

use crate::error::{GlyphError, Result};

/// Default page width and height in pixels. Not too small that many pages
/// are needed, not too large for the GPU to cope with.
pub const DEFAULT_PAGE_SIZE: usize = 2048;

/// Initial coordinate reservation (256 rectangles, 4 floats each).
const INITIAL_COORDINATES: usize = 256 * 4;

/// One fixed-size grayscale pixel buffer.
struct TexturePage {
    pixels: Vec<u8>,
}

impl TexturePage {
    fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
        }
    }

    fn draw(&mut self, pixels: &[u8], width: usize, height: usize, x: usize, y: usize, page_width: usize) {
        for row in 0..height {
            let src = &pixels[row * width..(row + 1) * width];
            let offset = (y + row) * page_width + x;
            self.pixels[offset..offset + width].copy_from_slice(src);
        }
    }
}

/// Next free position on the active page.
#[derive(Debug, Default, Clone, Copy)]
struct PageCursor {
    x: usize,
    y: usize,
    row_max_height: usize,
}

/// Packs rectangular pixel images into texture pages left-to-right,
/// top-to-bottom, starting a new row or page on overflow.
///
/// Identical images (by content hash) resolve to the same rectangle index,
/// so a glyph repeated across many labels is stored once. Rectangle indices
/// are stable for the packer's lifetime: entries are only appended, never
/// moved or repacked. Each rectangle is recorded as four floats
/// `[x, y, w, h]` normalized to the page size, with the page number
/// pre-added into the integer part of `x` — the layout the label shaders
/// index directly.
pub struct RectanglePacker {
    width: usize,
    height: usize,
    pages: Vec<TexturePage>,
    cursor: PageCursor,
    coordinates: Vec<f32>,
    dedup: HashMap<u64, usize>,
    generation: u64,
}

impl RectanglePacker {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pages: Vec::new(),
            cursor: PageCursor::default(),
            coordinates: Vec::with_capacity(INITIAL_COORDINATES),
            dedup: HashMap::new(),
            generation: 0,
        }
    }

    /// Add a grayscale image (`width * height` bytes, row major).
    ///
    /// Returns the rectangle index. If a pixel-identical image was added
    /// before, the existing index is returned and nothing is written.
    pub fn add_image(&mut self, pixels: &[u8], width: usize, height: usize) -> usize {
        self.add_image_with_border(pixels, width, height, 0)
    }

    /// Add an image but record its rectangle inset by `extra` pixels on each
    /// side.
    ///
    /// The full image is drawn; the inset keeps texture sampling away from
    /// the image edge, where interpolation would bleed into neighbouring
    /// rectangles (used for the uniform background glyph).
    pub fn add_image_with_border(
        &mut self,
        pixels: &[u8],
        width: usize,
        height: usize,
        extra: usize,
    ) -> usize {
        let (pixels, width, height) = self.clamp_to_page(pixels, width, height);

        let hash = content_hash(&pixels, width, height);
        if let Some(&index) = self.dedup.get(&hash) {
            return index;
        }

        let (page, x, y) = self.place(&pixels, width, height);

        let index = self.rectangle_count();
        let (pw, ph) = (self.width as f32, self.height as f32);
        self.coordinates.push(page as f32 + (x + extra) as f32 / pw);
        self.coordinates.push((y + extra) as f32 / ph);
        self.coordinates.push((width - 2 * extra) as f32 / pw);
        self.coordinates.push((height - 2 * extra) as f32 / ph);
        self.dedup.insert(hash, index);

        index
    }

    /// Number of packed rectangles.
    pub fn rectangle_count(&self) -> usize {
        self.coordinates.len() / 4
    }

    /// Number of texture pages created so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Raw pixels of one page, for GPU upload.
    pub fn page_pixels(&self, page: usize) -> Option<&[u8]> {
        self.pages.get(page).map(|p| p.pixels.as_slice())
    }

    /// The flat `[x, y, w, h]` coordinate array, 4 floats per rectangle.
    pub fn coordinates(&self) -> &[f32] {
        &self.coordinates
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bumped on every `reset`; lets GPU state detect full invalidation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Discard all pages, rectangles, and the dedup map.
    ///
    /// Previously returned rectangle indices become meaningless. Used when
    /// the font configuration changes and all cached atlas content is stale.
    pub fn reset(&mut self) {
        self.pages.clear();
        self.cursor = PageCursor::default();
        self.coordinates.clear();
        self.dedup.clear();
        self.generation += 1;
    }

    /// Write one page as a grayscale PNG, for debugging.
    pub fn write_page_png(&self, page: usize, writer: impl Write) -> Result<()> {
        let pixels = self.page_pixels(page).ok_or(GlyphError::PageOutOfRange {
            page,
            count: self.pages.len(),
        })?;
        let encoder = PngEncoder::new(writer);
        encoder.write_image(
            pixels,
            self.width as u32,
            self.height as u32,
            ExtendedColorType::L8,
        )?;
        Ok(())
    }

    /// Crop an image that exceeds the page dimensions. Oversized input is a
    /// caller bug but must not become an error here.
    fn clamp_to_page<'a>(
        &self,
        pixels: &'a [u8],
        width: usize,
        height: usize,
    ) -> (Cow<'a, [u8]>, usize, usize) {
        if width <= self.width && height <= self.height {
            return (Cow::Borrowed(pixels), width, height);
        }
        warn!(
            "glyph image {width}x{height} exceeds page size {}x{}, clamping",
            self.width, self.height
        );
        let cw = width.min(self.width);
        let ch = height.min(self.height);
        let mut clipped = Vec::with_capacity(cw * ch);
        for row in 0..ch {
            clipped.extend_from_slice(&pixels[row * width..row * width + cw]);
        }
        (Cow::Owned(clipped), cw, ch)
    }

    /// Advance the cursor (new row / new page as needed) and draw the image.
    fn place(&mut self, pixels: &[u8], width: usize, height: usize) -> (usize, usize, usize) {
        if self.pages.is_empty() {
            self.pages.push(TexturePage::new(self.width, self.height));
        }

        if self.cursor.x + width > self.width {
            self.cursor.x = 0;
            self.cursor.y += self.cursor.row_max_height;
            self.cursor.row_max_height = 0;
        }
        if self.cursor.y + height > self.height {
            self.pages.push(TexturePage::new(self.width, self.height));
            self.cursor = PageCursor::default();
        }

        let page = self.pages.len() - 1;
        let (x, y) = (self.cursor.x, self.cursor.y);
        self.pages[page].draw(pixels, width, height, x, y, self.width);
        self.cursor.x += width;
        self.cursor.row_max_height = self.cursor.row_max_height.max(height);

        (page, x, y)
    }
}

/// 64-bit content hash of an image. Dimensions are included so images with
/// equal bytes but different shapes stay distinct.
fn content_hash(pixels: &[u8], width: usize, height: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    width.hash(&mut hasher);
    height.hash(&mut hasher);
    pixels.hash(&mut hasher);
    hasher.finish()
}
