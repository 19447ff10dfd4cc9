//! Font configuration, discovery, fallback segmentation, and shaping.
//!
//! `FontCollection` resolves a `FontsConfig` into loaded faces (raw bytes +
//! fontdue rasterizers), `font_runs` splits text into maximal substrings
//! displayable by one face, and `shape_run` lays a run out into positioned
//! glyph bitmaps via `rustybuzz`.

mod collection;
mod config;
mod discovery;
mod fallback;
mod shaper;

pub use collection::FontCollection;
pub use config::{DEFAULT_FONT_SIZE, FontSource, FontStyle, FontsConfig};
pub use fallback::{FontRun, GlyphCoverage, font_runs};
pub use shaper::{ShapedGlyph, ShapedRun, shape_run};

/// Compact face index within a `FontCollection`.
///
/// Faces are ordered most specific first; the guaranteed default face is
/// always last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceIdx(pub u16);
