//! Glyph shaping — laying a font run out into positioned, rasterized glyphs
//! via `rustybuzz`, with pixel rects from fontdue metrics.

use crate::direction::Direction;

use super::collection::FontCollection;
use super::fallback::FontRun;

/// Shaped in place of codepoints no configured font displays.
const REPLACEMENT: &str = "\u{FFFD}";

/// One positioned, rasterized glyph.
pub struct ShapedGlyph {
    pub glyph_id: u16,
    /// Left edge on the canvas, in pixels.
    pub x: i32,
    /// Top edge on the canvas, in pixels.
    pub y: i32,
    pub width: usize,
    pub height: usize,
    /// Coverage bitmap, `width * height` bytes.
    pub bitmap: Vec<u8>,
}

/// The result of shaping one font run.
pub struct ShapedRun {
    pub glyphs: Vec<ShapedGlyph>,
    /// How far the pen moves past this run, in pixels: the larger of the
    /// advance sum and the measured pixel width, so fonts that draw past
    /// their nominal advance don't overlap the next run.
    pub advance: f32,
}

/// Shape one font run at the given pen position and baseline.
///
/// The shaping direction follows the run's direction (RTL shaping emits
/// glyphs in visual order). Glyph positions are scaled from font units by
/// `size / units_per_em`; pixel rects come from fontdue's rasterizer.
/// Fonts whose rendered glyphs extend left of the pen are compensated by
/// shifting the whole run right. Glyphs shaped to `.notdef` (unless the run
/// is a missing-coverage substitute), zero-size bitmaps, and glyphs past
/// the canvas right edge produce no output.
///
/// Returns `None` when the run's shaping face could not be constructed;
/// the caller substitutes a diagnostic string and retries.
pub fn shape_run(
    fonts: &FontCollection,
    faces: &[Option<rustybuzz::Face<'_>>],
    run: &FontRun<'_>,
    direction: Direction,
    pen_x: i32,
    baseline_y: i32,
    canvas_width: usize,
) -> Option<ShapedRun> {
    let face = faces.get(run.face.0 as usize)?.as_ref()?;
    let text = if run.missing { REPLACEMENT } else { run.text };

    let mut buffer = rustybuzz::UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.set_direction(match direction {
        Direction::LeftToRight => rustybuzz::Direction::LeftToRight,
        Direction::RightToLeft => rustybuzz::Direction::RightToLeft,
    });

    let glyph_buffer = rustybuzz::shape(face, &fonts.features, buffer);
    let scale = fonts.size / face.units_per_em() as f32;

    let mut glyphs = Vec::new();
    let mut cursor = 0.0f32;
    for (info, pos) in glyph_buffer
        .glyph_infos()
        .iter()
        .zip(glyph_buffer.glyph_positions())
    {
        let glyph_id = info.glyph_id as u16;
        let x_advance = pos.x_advance as f32 * scale;
        if glyph_id == 0 && !run.missing {
            cursor += x_advance;
            continue;
        }

        let (metrics, bitmap) = fonts.rasterize_glyph(run.face, glyph_id)?;
        if metrics.width == 0 || metrics.height == 0 {
            cursor += x_advance;
            continue;
        }

        let x = (pen_x as f32 + cursor + pos.x_offset as f32 * scale).round() as i32 + metrics.xmin;
        let y = (baseline_y as f32 - pos.y_offset as f32 * scale).round() as i32
            - (metrics.ymin + metrics.height as i32);
        cursor += x_advance;

        glyphs.push(ShapedGlyph {
            glyph_id,
            x,
            y,
            width: metrics.width,
            height: metrics.height,
            bitmap,
        });
    }

    // Some fonts shape glyphs left of the nominal start point; shift the
    // run right so it never bleeds into the previous one.
    if let Some(left) = glyphs.iter().map(|g| g.x).min() {
        if left < pen_x {
            let dx = pen_x - left;
            for g in &mut glyphs {
                g.x += dx;
            }
        }
    }

    glyphs.retain(|g| g.x + g.width as i32 <= canvas_width as i32);

    let measured = glyphs
        .iter()
        .map(|g| g.x + g.width as i32)
        .max()
        .map_or(0.0, |right| (right - pen_x) as f32);

    Some(ShapedRun {
        glyphs,
        advance: cursor.max(measured),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::fallback::GlyphCoverage;
    use crate::font::{FaceIdx, FontsConfig};

    fn load_default() -> Option<FontCollection> {
        FontCollection::load(&FontsConfig::default()).ok()
    }

    fn default_run(text: &str) -> FontRun<'_> {
        FontRun {
            text,
            face: FaceIdx(0),
            missing: false,
        }
    }

    #[test]
    fn shape_ascii_word() {
        let Some(fonts) = load_default() else { return };
        let faces = fonts.create_shaping_faces();
        let shaped = shape_run(
            &fonts,
            &faces,
            &default_run("Hello"),
            Direction::LeftToRight,
            60,
            64,
            4096,
        )
        .unwrap();

        assert_eq!(shaped.glyphs.len(), 5);
        assert!(shaped.advance > 0.0);
        for g in &shaped.glyphs {
            assert_ne!(g.glyph_id, 0);
            assert_eq!(g.bitmap.len(), g.width * g.height);
        }
        // Positions ascend left to right for an LTR run.
        for pair in shaped.glyphs.windows(2) {
            assert!(pair[0].x <= pair[1].x);
        }
    }

    #[test]
    fn overshoot_never_crosses_the_pen() {
        let Some(fonts) = load_default() else { return };
        let faces = fonts.create_shaping_faces();
        let shaped = shape_run(
            &fonts,
            &faces,
            &default_run("jofy"),
            Direction::LeftToRight,
            60,
            64,
            4096,
        )
        .unwrap();
        for g in &shaped.glyphs {
            assert!(g.x >= 60, "glyph at {} bleeds left of the pen", g.x);
        }
    }

    #[test]
    fn spaces_produce_advance_but_no_glyphs() {
        let Some(fonts) = load_default() else { return };
        let faces = fonts.create_shaping_faces();
        let shaped = shape_run(
            &fonts,
            &faces,
            &default_run("   "),
            Direction::LeftToRight,
            60,
            64,
            4096,
        )
        .unwrap();
        assert!(shaped.glyphs.is_empty());
        assert!(shaped.advance > 0.0);
    }

    #[test]
    fn rtl_run_shapes_in_visual_order() {
        let Some(fonts) = load_default() else { return };
        if !fonts.covers(FaceIdx(0), 'ש') {
            return;
        }
        let faces = fonts.create_shaping_faces();
        let shaped = shape_run(
            &fonts,
            &faces,
            &default_run("שלום"),
            Direction::RightToLeft,
            60,
            64,
            4096,
        )
        .unwrap();
        assert!(!shaped.glyphs.is_empty());
        for pair in shaped.glyphs.windows(2) {
            assert!(pair[0].x <= pair[1].x, "visual order must ascend");
        }
    }

    #[test]
    fn canvas_width_guard_drops_glyphs() {
        let Some(fonts) = load_default() else { return };
        let faces = fonts.create_shaping_faces();
        let shaped = shape_run(
            &fonts,
            &faces,
            &default_run("Hello"),
            Direction::LeftToRight,
            60,
            64,
            // Narrower than the pen start: every glyph lands past the edge.
            50,
        )
        .unwrap();
        assert!(shaped.glyphs.is_empty());
    }

    #[test]
    fn missing_run_shapes_a_substitute() {
        let Some(fonts) = load_default() else { return };
        let faces = fonts.create_shaping_faces();
        let run = FontRun {
            text: "\u{e777}",
            face: FaceIdx((fonts.face_count() - 1) as u16),
            missing: true,
        };
        let shaped = shape_run(&fonts, &faces, &run, Direction::LeftToRight, 60, 64, 4096);
        // Must not fail; the replacement (or .notdef) glyph stands in.
        assert!(shaped.is_some());
    }
}
