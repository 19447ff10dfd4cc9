//! Platform-specific font discovery — finding font files on disk.
//!
//! DirectWrite resolution on Windows, directory scanning elsewhere. Pure
//! discovery: no font loading or caching.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{GlyphError, Result};

use super::config::{FontSource, FontStyle};

/// Default font filename candidates (broad Unicode coverage, sans-serif),
/// most preferred first.
#[cfg(not(target_os = "windows"))]
const DEFAULT_FONT_NAMES: &[&str] = &[
    "DejaVuSans.ttf",
    "NotoSans-Regular.ttf",
    "NotoSans-Regular.otf",
    "LiberationSans-Regular.ttf",
    "FreeSans.ttf",
    "Arimo-Regular.ttf",
];

#[cfg(target_os = "windows")]
const DEFAULT_FONT_FAMILIES: &[&str] = &["Segoe UI", "Arial", "Tahoma"];

#[cfg(target_os = "windows")]
const DEFAULT_FONT_PATHS: &[&str] = &[
    r"C:\Windows\Fonts\segoeui.ttf",
    r"C:\Windows\Fonts\arial.ttf",
    r"C:\Windows\Fonts\tahoma.ttf",
];

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    #[cfg(target_os = "windows")]
    {
        dirs.push(PathBuf::from(r"C:\Windows\Fonts"));
        if let Some(local) = std::env::var_os("LOCALAPPDATA") {
            dirs.push(PathBuf::from(local).join(r"Microsoft\Windows\Fonts"));
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
    }
    dirs
}

/// Build a filename → full path index by scanning all font directories once.
pub(super) fn build_font_index() -> HashMap<String, PathBuf> {
    let mut index = HashMap::new();
    for dir in font_dirs() {
        index_font_dir(&dir, &mut index);
    }
    index
}

fn index_font_dir(dir: &std::path::Path, index: &mut HashMap<String, PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            index_font_dir(&path, index);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            index.entry(name.to_owned()).or_insert(path);
        } else {
            // Non-UTF-8 filename — skip
        }
    }
}

/// Resolve one configured font source to a file path.
///
/// File references are checked as given, then looked up by filename in the
/// font index. Family names go through DirectWrite on Windows and through
/// variant filename candidates everywhere. A source that cannot be resolved
/// is a configuration error naming the attempted font.
pub(super) fn resolve_source(
    source: &FontSource,
    style: FontStyle,
    index: &HashMap<String, PathBuf>,
) -> Result<PathBuf> {
    match source {
        FontSource::File(path) => {
            if path.exists() {
                return Ok(path.clone());
            }
            if let Some(found) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| index.get(n))
            {
                return Ok(found.clone());
            }
            Err(GlyphError::FontNotFound(path.display().to_string()))
        }
        FontSource::System(name) => {
            #[cfg(target_os = "windows")]
            if let Some(path) = resolve_font_dwrite(name, style) {
                return Ok(path);
            }
            for candidate in variant_candidates(name, style) {
                if let Some(path) = index.get(&candidate) {
                    return Ok(path.clone());
                }
            }
            Err(GlyphError::FontNotFound(name.clone()))
        }
    }
}

/// Resolve the known-good default font appended to every configuration.
pub(super) fn default_font_path(index: &HashMap<String, PathBuf>) -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        for family in DEFAULT_FONT_FAMILIES {
            if let Some(path) = resolve_font_dwrite(family, FontStyle::Regular) {
                return Ok(path);
            }
        }
        for p in DEFAULT_FONT_PATHS {
            let path = PathBuf::from(*p);
            if path.exists() {
                return Ok(path);
            }
        }
        let _ = index;
    }
    #[cfg(not(target_os = "windows"))]
    for name in DEFAULT_FONT_NAMES {
        if let Some(path) = index.get(*name) {
            return Ok(path.clone());
        }
    }
    Err(GlyphError::NoDefaultFont)
}

/// Candidate filenames for a family name + style, e.g. `"Noto Sans"` bold →
/// `NotoSans-Bold.ttf` and friends.
fn variant_candidates(name: &str, style: FontStyle) -> Vec<String> {
    let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    let suffixes: &[&str] = match style {
        FontStyle::Regular => &["-Regular", ""],
        FontStyle::Bold => &["-Bold"],
        FontStyle::Italic => &["-Italic", "-Oblique"],
        FontStyle::BoldItalic => &["-BoldItalic", "-BoldOblique"],
    };

    let mut candidates = Vec::new();
    for suffix in suffixes {
        for ext in ["ttf", "otf", "ttc"] {
            candidates.push(format!("{compact}{suffix}.{ext}"));
        }
    }
    candidates
}

/// Resolve a single font via DirectWrite by family name + weight + slant.
#[cfg(target_os = "windows")]
fn resolve_font_dwrite(family_name: &str, style: FontStyle) -> Option<PathBuf> {
    let weight = match style {
        FontStyle::Bold | FontStyle::BoldItalic => dwrote::FontWeight::Bold,
        FontStyle::Regular | FontStyle::Italic => dwrote::FontWeight::Regular,
    };
    let slant = match style {
        FontStyle::Italic | FontStyle::BoldItalic => dwrote::FontStyle::Italic,
        FontStyle::Regular | FontStyle::Bold => dwrote::FontStyle::Normal,
    };

    let collection = dwrote::FontCollection::system();
    let descriptor = dwrote::FontDescriptor {
        family_name: family_name.to_string(),
        weight,
        stretch: dwrote::FontStretch::Normal,
        style: slant,
    };
    let font = collection.font_from_descriptor(&descriptor).ok().flatten()?;
    let face = font.create_font_face();
    let files = face.files().ok()?;
    let file = files.first()?;
    file.font_file_path().ok()
}
