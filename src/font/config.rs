//! Font configuration — the ordered font list, style flag, render size, and
//! OpenType features, deserializable from TOML.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Base render size in pixels. Glyphs are rasterized at this size and
/// downscaled by the consumer, so it is deliberately large.
pub const DEFAULT_FONT_SIZE: f32 = 64.0;

/// Style applied to every configured font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

/// How one entry of the font list is resolved.
///
/// Names ending in `.otf`/`.ttf`/`.ttc` are treated as file references,
/// resolved against the platform font directories; anything else is looked
/// up as a family name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    System(String),
    File(PathBuf),
}

impl FontSource {
    pub fn parse(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".otf") || lower.ends_with(".ttf") || lower.ends_with(".ttc") {
            Self::File(PathBuf::from(name))
        } else {
            Self::System(name.to_owned())
        }
    }
}

/// Label font configuration.
///
/// ```toml
/// fonts = ["Noto Sans Arabic", "NotoSansCJK-Regular.ttc"]
/// style = "bold"
/// size = 64.0
/// features = ["calt", "-liga"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Font names or file paths, most specific first. A known-good default
    /// font is appended automatically when not already present.
    pub fonts: Vec<String>,
    pub style: FontStyle,
    /// Render size in pixels.
    pub size: f32,
    /// OpenType features to apply during shaping.
    ///
    /// Each string is a 4-character feature tag, optionally prefixed with
    /// `-` to disable. Examples: `"calt"`, `"-liga"`.
    pub features: Vec<String>,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            fonts: Vec::new(),
            style: FontStyle::Regular,
            size: DEFAULT_FONT_SIZE,
            features: Vec::new(),
        }
    }
}

impl FontsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// The configured list parsed into sources.
    pub fn sources(&self) -> Vec<FontSource> {
        self.fonts.iter().map(|name| FontSource::parse(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GlyphError;

    #[test]
    fn source_parse_distinguishes_files() {
        assert_eq!(
            FontSource::parse("NotoSansCJK-Regular.ttc"),
            FontSource::File(PathBuf::from("NotoSansCJK-Regular.ttc"))
        );
        assert_eq!(
            FontSource::parse("/fonts/Custom.OTF"),
            FontSource::File(PathBuf::from("/fonts/Custom.OTF"))
        );
        assert_eq!(
            FontSource::parse("Noto Sans"),
            FontSource::System("Noto Sans".to_owned())
        );
    }

    #[test]
    fn parse_full_config() {
        let config = FontsConfig::from_toml_str(
            r#"
            fonts = ["Noto Sans", "NotoSansArabic-Regular.ttf"]
            style = "bold_italic"
            size = 48.0
            features = ["calt", "-liga"]
            "#,
        )
        .unwrap();
        assert_eq!(config.fonts.len(), 2);
        assert_eq!(config.style, FontStyle::BoldItalic);
        assert_eq!(config.size, 48.0);
        assert_eq!(config.features, vec!["calt", "-liga"]);
    }

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config = FontsConfig::from_toml_str("").unwrap();
        assert!(config.fonts.is_empty());
        assert_eq!(config.style, FontStyle::Regular);
        assert_eq!(config.size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = FontsConfig::from_toml_str("fonts = 3").unwrap_err();
        assert!(matches!(err, GlyphError::InvalidConfig(_)));
    }
}
