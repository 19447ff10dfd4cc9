//! Error types for font configuration and label rendering.

use std::path::PathBuf;

use thiserror::Error;

use crate::font::FaceIdx;

/// Errors surfaced by font configuration and the glyph pipeline.
///
/// Only configuration-time failures reach callers; rendering recovers
/// internally and never returns one of these.
#[derive(Debug, Error)]
pub enum GlyphError {
    /// A configured font name or file could not be resolved on this system.
    #[error("font not found: {0}")]
    FontNotFound(String),

    /// A font file exists but could not be read.
    #[error("failed to read font file {path}: {source}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A font file was read but its data could not be parsed.
    #[error("failed to parse font {path}: {reason}")]
    FontParse { path: PathBuf, reason: String },

    /// No known-good default font could be resolved on this system.
    #[error("no default font available on this system")]
    NoDefaultFont,

    /// A transient shaping face could not be constructed for a loaded font.
    #[error("shaping failed for face {0:?}")]
    ShapingFailed(FaceIdx),

    /// Font configuration text was not valid TOML.
    #[error("invalid font configuration: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    /// A texture page index outside the packed range.
    #[error("texture page {page} out of range (page count {count})")]
    PageOutOfRange { page: usize, count: usize },

    /// PNG encoding of a texture page failed.
    #[error("failed to encode texture page: {0}")]
    PngEncode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, GlyphError>;
