//! Glyph atlas construction for GPU label rendering.
//!
//! This crate turns label text into texture-atlas rectangles and compact
//! placement records: text is cleaned and split into direction and font
//! runs, shaped into glyph bitmaps, drawn onto a canvas, merged where boxes
//! touch, and packed into fixed-size grayscale pages. The `gpu` module
//! mirrors the packed pages and rectangle coordinates into wgpu resources
//! that label shaders index directly.

#![deny(unsafe_code)]

pub mod atlas;
pub mod canvas;
pub mod direction;
pub mod error;
pub mod font;
pub mod gpu;
pub mod manager;
pub mod merge;

pub use atlas::{DEFAULT_PAGE_SIZE, RectanglePacker};
pub use direction::{Direction, DirectionRun, clean_text, direction_runs};
pub use error::{GlyphError, Result};
pub use font::{
    DEFAULT_FONT_SIZE, FaceIdx, FontCollection, FontSource, FontStyle, FontsConfig,
};
pub use gpu::{AtlasBackend, AtlasSync, GlyphTexture};
pub use manager::{BufferedGlyphStream, GlyphManager, GlyphStream, LabelBuffer};
pub use merge::{GlyphBox, MergedGlyphGroup, merge_boxes};
