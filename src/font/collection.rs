//! Font data collection — owns raw bytes and fontdue rasterizers, creates
//! transient rustybuzz faces, and answers coverage queries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;

use crate::error::{GlyphError, Result};

use super::config::FontsConfig;
use super::fallback::GlyphCoverage;
use super::{FaceIdx, discovery};

/// Per-face data: raw bytes + fontdue rasterizer.
#[derive(Debug)]
struct FaceData {
    /// Raw font file bytes (kept alive for rustybuzz `Face` borrowing).
    bytes: Arc<Vec<u8>>,
    /// fontdue font for rasterization (owns its parsed data).
    raster: fontdue::Font,
    /// Index within a .ttc collection file (0 for single-font files).
    face_index: u32,
    /// Ascent in pixels at the collection's render size.
    ascent: f32,
}

impl FaceData {
    fn load(path: &Path, size: f32) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| GlyphError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        let face_index = 0;
        let settings = fontdue::FontSettings {
            collection_index: face_index,
            ..fontdue::FontSettings::default()
        };
        let raster =
            fontdue::Font::from_bytes(bytes.as_slice(), settings).map_err(|reason| {
                GlyphError::FontParse {
                    path: path.to_path_buf(),
                    reason: reason.to_owned(),
                }
            })?;
        let ascent = raster
            .horizontal_line_metrics(size)
            .map_or(size, |lm| lm.ascent);
        Ok(Self {
            bytes: Arc::new(bytes),
            raster,
            face_index,
            ascent,
        })
    }

    fn line_height(&self, size: f32) -> usize {
        self.raster
            .horizontal_line_metrics(size)
            .map_or(size, |lm| lm.new_line_size)
            .ceil() as usize
    }
}

/// The resolved, loaded font list for label rendering.
///
/// Faces are ordered most specific first, with the platform default font
/// appended last so every configuration has a face of maximal coverage.
/// Raw bytes are kept in `Arc<Vec<u8>>` so rustybuzz faces can borrow them
/// transiently during a render call.
#[derive(Debug)]
pub struct FontCollection {
    faces: Vec<FaceData>,
    /// OpenType features to apply during shaping.
    pub features: Vec<rustybuzz::Feature>,
    /// Render size in pixels.
    pub size: f32,
    /// Max over all faces of the font line height, in pixels. The scale
    /// unit for all emitted label geometry.
    line_height: usize,
}

impl FontCollection {
    /// Resolve and load every configured font, appending the default font
    /// when it is not already present.
    ///
    /// Fails on the first font that cannot be resolved, read, or parsed —
    /// configuration errors surface here, before any rendering.
    pub fn load(config: &FontsConfig) -> Result<Self> {
        let index = discovery::build_font_index();

        let mut paths: Vec<PathBuf> = Vec::with_capacity(config.fonts.len() + 1);
        for source in config.sources() {
            paths.push(discovery::resolve_source(&source, config.style, &index)?);
        }
        let default_path = discovery::default_font_path(&index)?;
        if !paths.contains(&default_path) {
            paths.push(default_path);
        }

        let size = config.size.max(1.0);
        let mut faces = Vec::with_capacity(paths.len());
        for path in &paths {
            faces.push(FaceData::load(path, size)?);
        }

        let line_height = faces
            .iter()
            .map(|fd| fd.line_height(size))
            .max()
            .ok_or(GlyphError::NoDefaultFont)?;

        info!(
            "loaded {} label faces at {size}px, line height {line_height}px",
            faces.len()
        );

        Ok(Self {
            faces,
            features: Self::parse_features(&config.features),
            size,
            line_height,
        })
    }

    /// Parse feature strings into rustybuzz features.
    ///
    /// Each string is a 4-char OpenType tag, optionally prefixed with `-` to
    /// disable. Examples: `"calt"` (enable), `"-dlig"` (disable).
    fn parse_features(strings: &[String]) -> Vec<rustybuzz::Feature> {
        strings
            .iter()
            .filter_map(|s| {
                let (tag_str, value) = if let Some(rest) = s.strip_prefix('-') {
                    (rest, 0)
                } else {
                    (s.as_str(), 1)
                };
                let bytes = tag_str.as_bytes();
                let Ok(tag_bytes) = <[u8; 4]>::try_from(bytes) else {
                    log::warn!("ignoring invalid feature tag: {s}");
                    return None;
                };
                let tag = rustybuzz::ttf_parser::Tag::from_bytes(&tag_bytes);
                Some(rustybuzz::Feature::new(tag, value, ..))
            })
            .collect()
    }

    /// The scale unit for emitted geometry: max line height over all faces.
    pub fn line_height(&self) -> usize {
        self.line_height
    }

    /// Ascent of a face in pixels.
    pub fn ascent(&self, idx: FaceIdx) -> f32 {
        self.face(idx).map_or(self.size, |fd| fd.ascent)
    }

    /// Glyph id of `ch` in the given face (0 = not covered).
    pub fn glyph_index(&self, idx: FaceIdx, ch: char) -> u16 {
        self.face(idx)
            .map_or(0, |fd| fd.raster.lookup_glyph_index(ch))
    }

    /// Rasterize a glyph by id from the given face at the render size.
    pub fn rasterize_glyph(
        &self,
        idx: FaceIdx,
        glyph_id: u16,
    ) -> Option<(fontdue::Metrics, Vec<u8>)> {
        let fd = self.face(idx)?;
        Some(fd.raster.rasterize_indexed(glyph_id, self.size))
    }

    /// Create transient rustybuzz faces that borrow from stored bytes.
    ///
    /// Returns a vec parallel to the face indices. A face whose data
    /// rustybuzz cannot parse is `None`.
    pub fn create_shaping_faces(&self) -> Vec<Option<rustybuzz::Face<'_>>> {
        self.faces
            .iter()
            .map(|fd| rustybuzz::Face::from_slice(&fd.bytes, fd.face_index))
            .collect()
    }

    fn face(&self, idx: FaceIdx) -> Option<&FaceData> {
        self.faces.get(idx.0 as usize)
    }
}

impl GlyphCoverage for FontCollection {
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn covers(&self, face: FaceIdx, ch: char) -> bool {
        self.glyph_index(face, ch) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Load the default configuration, or skip when the host has no fonts.
    fn load_default() -> Option<FontCollection> {
        FontCollection::load(&FontsConfig::default()).ok()
    }

    #[test]
    fn default_config_appends_default_font() {
        let Some(fonts) = load_default() else { return };
        assert_eq!(fonts.face_count(), 1);
        assert!(fonts.line_height() > 0);
        assert!(fonts.ascent(FaceIdx(0)) > 0.0);
    }

    #[test]
    fn default_face_covers_ascii() {
        let Some(fonts) = load_default() else { return };
        let default_face = FaceIdx((fonts.face_count() - 1) as u16);
        assert!(fonts.covers(default_face, 'A'));
        assert!(fonts.covers(default_face, ' '));
    }

    #[test]
    fn rasterize_by_glyph_id() {
        let Some(fonts) = load_default() else { return };
        let glyph_id = fonts.glyph_index(FaceIdx(0), 'A');
        assert_ne!(glyph_id, 0);
        let (metrics, bitmap) = fonts.rasterize_glyph(FaceIdx(0), glyph_id).unwrap();
        assert!(metrics.width > 0);
        assert!(metrics.height > 0);
        assert_eq!(bitmap.len(), metrics.width * metrics.height);
    }

    #[test]
    fn shaping_faces_parallel_to_face_indices() {
        let Some(fonts) = load_default() else { return };
        let faces = fonts.create_shaping_faces();
        assert_eq!(faces.len(), fonts.face_count());
        assert!(faces[0].is_some());
    }

    #[test]
    fn missing_font_is_a_config_error() {
        let config = FontsConfig {
            fonts: vec!["NoSuchFontFamily12345".to_owned()],
            ..FontsConfig::default()
        };
        let err = FontCollection::load(&config).unwrap_err();
        assert!(matches!(err, GlyphError::FontNotFound(_)));
    }

    #[test]
    fn feature_parsing() {
        let features = FontCollection::parse_features(&[
            "calt".to_owned(),
            "-liga".to_owned(),
            "bogus-tag".to_owned(),
        ]);
        assert_eq!(features.len(), 2, "malformed tag must be dropped");
    }
}
