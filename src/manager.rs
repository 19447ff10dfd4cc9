//! Label rendering orchestration: cleans text, segments it by direction and
//! font coverage, shapes and draws the glyphs, merges touching boxes, packs
//! them into the atlas, and emits line/glyph records to a `GlyphStream`.

use std::io::Write;
use std::sync::Arc;

use log::{error, warn};
use parking_lot::Mutex;

use crate::atlas::{DEFAULT_PAGE_SIZE, RectanglePacker};
use crate::canvas::GlyphCanvas;
use crate::direction::{clean_text, direction_runs};
use crate::error::Result;
use crate::font::{FontCollection, FontsConfig, font_runs, shape_run};
use crate::merge::{GlyphBox, merge_boxes};

/// Pen start position on the canvas, leaving room for glyphs that shape
/// left of their nominal origin.
const BASE_X: i32 = 60;

/// Horizontal nudge applied to every emitted glyph position, in line-height
/// units. Compensates for rasterized glyphs sitting slightly right of their
/// typographic center.
const GLYPH_NUDGE_X: f32 = -0.1;

/// Vertical nudge centering the emitted glyph on the label row.
const GLYPH_NUDGE_Y: f32 = 0.5;

/// Substituted and rendered when a label fails to shape, so the failure is
/// visible in the scene rather than a silent gap.
const ERROR_LABEL: &str = "label render error";

/// Sink for the geometry of one rendered label.
///
/// For each label, `new_line` is called exactly once, before any `add_glyph`
/// call. All coordinates are in line-height units.
pub trait GlyphStream {
    /// The total width of the label line.
    fn new_line(&mut self, width: f32);

    /// One atlas rectangle placed within the line: `position` indexes the
    /// packer's coordinate array; `x` is relative to the line center, `y` to
    /// the baseline.
    fn add_glyph(&mut self, position: usize, x: f32, y: f32);
}

/// Renders label text into atlas rectangles and `GlyphStream` geometry.
///
/// Owns the loaded fonts, the rectangle packer, and a reusable drawing
/// canvas sized from the font line height.
pub struct GlyphManager {
    fonts: FontCollection,
    packer: RectanglePacker,
    canvas: GlyphCanvas,
}

impl GlyphManager {
    pub fn new(config: &FontsConfig) -> Result<Self> {
        Self::with_page_size(config, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(config: &FontsConfig, page_size: usize) -> Result<Self> {
        let fonts = FontCollection::load(config)?;
        let canvas = Self::canvas_for(&fonts);
        Ok(Self {
            fonts,
            packer: RectanglePacker::new(page_size, page_size),
            canvas,
        })
    }

    /// Replace the font configuration.
    ///
    /// All previously packed rectangles reference glyphs of the old fonts,
    /// so the packer is reset and every label must be re-rendered.
    pub fn set_fonts(&mut self, config: &FontsConfig) -> Result<()> {
        self.fonts = FontCollection::load(config)?;
        self.canvas = Self::canvas_for(&self.fonts);
        self.packer.reset();
        Ok(())
    }

    fn canvas_for(fonts: &FontCollection) -> GlyphCanvas {
        let line_height = fonts.line_height();
        GlyphCanvas::new(50 * line_height, 2 * line_height)
    }

    /// Render one label and emit its geometry to `stream`.
    ///
    /// Text is cleaned first; an empty result emits nothing. A shaping
    /// failure is not fatal: a diagnostic label is rendered in its place,
    /// and if even that fails the label is dropped with an error log.
    pub fn render(&mut self, text: &str, stream: &mut dyn GlyphStream) {
        let text = clean_text(text);
        if text.is_empty() {
            return;
        }
        if !self.render_once(&text, stream) {
            warn!("shaping failed for label {text:?}, substituting");
            if !self.render_once(ERROR_LABEL, stream) {
                error!("shaping failed for substitute label, dropping {text:?}");
            }
        }
    }

    /// One rendering attempt. Returns false (emitting nothing) when a run
    /// fails to shape.
    fn render_once(&mut self, text: &str, stream: &mut dyn GlyphStream) -> bool {
        let Self {
            fonts,
            packer,
            canvas,
        } = self;
        let fonts: &FontCollection = fonts;

        canvas.clear();
        let line_height = fonts.line_height() as i32;
        let baseline = line_height;
        let faces = fonts.create_shaping_faces();

        let mut pen_x = BASE_X as f32;
        let mut boxes: Vec<GlyphBox> = Vec::new();
        for direction_run in direction_runs(text) {
            for font_run in font_runs(direction_run.text, fonts) {
                let Some(shaped) = shape_run(
                    fonts,
                    &faces,
                    &font_run,
                    direction_run.direction,
                    pen_x.round() as i32,
                    baseline,
                    canvas.width(),
                ) else {
                    return false;
                };

                let ascent = fonts.ascent(font_run.face);
                for g in &shaped.glyphs {
                    canvas.blit(&g.bitmap, g.width, g.height, g.x, g.y);
                    boxes.push(GlyphBox {
                        index: boxes.len(),
                        x: g.x,
                        y: g.y,
                        width: g.width as i32,
                        height: g.height as i32,
                        ascent,
                    });
                }
                pen_x += shaped.advance;
            }
        }

        if boxes.is_empty() {
            stream.new_line(0.0);
            return true;
        }

        let left = boxes.iter().map(|b| b.x).min().unwrap_or(0);
        let right = boxes.iter().map(|b| b.x + b.width).max().unwrap_or(0);
        let top = boxes.iter().map(|b| b.y).min().unwrap_or(0);
        let bottom = boxes.iter().map(|b| b.y + b.height).max().unwrap_or(0);

        let lh = line_height as f32;
        let center = (left + right) as f32 / 2.0;
        let middle = (top + bottom) as f32 / 2.0;
        stream.new_line((right - left) as f32 / lh);

        for group in merge_boxes(boxes) {
            let Some((pixels, cw, ch)) = canvas.crop(group.x, group.y, group.width, group.height)
            else {
                continue;
            };
            let position = packer.add_image(&pixels, cw, ch);
            stream.add_glyph(
                position,
                (group.x as f32 - center) / lh + GLYPH_NUDGE_X,
                (group.y as f32 - middle) / lh + GLYPH_NUDGE_Y,
            );
        }

        true
    }

    /// Pack a uniform square of the given alpha, sized to the line height,
    /// for drawing label backgrounds.
    ///
    /// The square is drawn one pixel larger on each side with the recorded
    /// rectangle inset past that border, so linear sampling at the edges
    /// reads the uniform value rather than neighbouring atlas content.
    pub fn create_background_glyph(&mut self, alpha: u8) -> usize {
        let side = self.fonts.line_height() + 2;
        let pixels = vec![alpha; side * side];
        self.packer.add_image_with_border(&pixels, side, side, 1)
    }

    /// Number of packed atlas rectangles.
    pub fn glyph_count(&self) -> usize {
        self.packer.rectangle_count()
    }

    pub fn page_count(&self) -> usize {
        self.packer.page_count()
    }

    /// The flat `[x, y, w, h]` rectangle coordinate array.
    pub fn coordinates(&self) -> &[f32] {
        self.packer.coordinates()
    }

    pub fn page_pixels(&self, page: usize) -> Option<&[u8]> {
        self.packer.page_pixels(page)
    }

    pub fn texture_width(&self) -> usize {
        self.packer.width()
    }

    pub fn texture_height(&self) -> usize {
        self.packer.height()
    }

    /// Page width in line-height units; converts normalized rectangle widths
    /// back to label geometry units.
    pub fn width_scaling_factor(&self) -> f32 {
        self.packer.width() as f32 / self.fonts.line_height() as f32
    }

    /// Page height in line-height units.
    pub fn height_scaling_factor(&self) -> f32 {
        self.packer.height() as f32 / self.fonts.line_height() as f32
    }

    pub fn line_height(&self) -> usize {
        self.fonts.line_height()
    }

    /// The packer, for atlas synchronization.
    pub fn packer(&self) -> &RectanglePacker {
        &self.packer
    }

    /// Write one texture page as a grayscale PNG, for debugging.
    pub fn write_page_png(&self, page: usize, writer: impl Write) -> Result<()> {
        self.packer.write_page_png(page, writer)
    }
}

/// Accumulated geometry of rendered labels.
#[derive(Debug, Default)]
pub struct LabelBuffer {
    /// One width per rendered line, in line-height units.
    pub line_widths: Vec<f32>,
    /// `(position, x, y)` per emitted glyph, across all lines.
    pub glyphs: Vec<(usize, f32, f32)>,
}

/// A `GlyphStream` that appends into a shared `LabelBuffer`, for callers
/// that batch label geometry before uploading it.
#[derive(Debug, Default)]
pub struct BufferedGlyphStream {
    buffer: Arc<Mutex<LabelBuffer>>,
}

impl BufferedGlyphStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the accumulated geometry.
    pub fn buffer(&self) -> Arc<Mutex<LabelBuffer>> {
        Arc::clone(&self.buffer)
    }
}

impl GlyphStream for BufferedGlyphStream {
    fn new_line(&mut self, width: f32) {
        self.buffer.lock().line_widths.push(width);
    }

    fn add_glyph(&mut self, position: usize, x: f32, y: f32) {
        self.buffer.lock().glyphs.push((position, x, y));
    }
}
