//! Font fallback segmentation — splitting a direction run into maximal
//! substrings displayable by one face.

use log::debug;

use super::FaceIdx;

/// Coverage queries the segmenter needs from a font collection.
///
/// A trait seam so segmentation logic is testable without on-disk fonts.
pub trait GlyphCoverage {
    /// Number of faces, most specific first; the last face is the default.
    fn face_count(&self) -> usize;
    /// Whether the face has a real glyph for `ch`.
    fn covers(&self, face: FaceIdx, ch: char) -> bool;
}

/// A maximal substring displayable by one face.
///
/// `missing` marks an injected single-codepoint run for which no configured
/// face had coverage; it is shaped as the default face's replacement glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontRun<'a> {
    pub text: &'a str,
    pub face: FaceIdx,
    pub missing: bool,
}

/// Split `text` into font runs, in original (not reversed) order.
///
/// Each codepoint picks the lowest-index face that covers it. A plain space
/// reuses the previous codepoint's face when one was determined, so
/// whitespace never forces a font switch mid-word-sequence. A codepoint no
/// face covers becomes its own `missing` run against the default face;
/// that is a rendering degradation, not an error.
pub fn font_runs<'a>(text: &'a str, fonts: &impl GlyphCoverage) -> Vec<FontRun<'a>> {
    let default_face = FaceIdx((fonts.face_count() - 1) as u16);

    let mut runs = Vec::new();
    let mut open: Option<(usize, FaceIdx)> = None;
    let mut prev_face: Option<FaceIdx> = None;

    for (i, ch) in text.char_indices() {
        let chosen = if ch == ' ' && prev_face.is_some() {
            prev_face
        } else {
            (0..fonts.face_count())
                .map(|f| FaceIdx(f as u16))
                .find(|&f| fonts.covers(f, ch))
        };

        match chosen {
            Some(face) => {
                prev_face = Some(face);
                match open {
                    Some((_, open_face)) if open_face == face => {}
                    Some((start, open_face)) => {
                        runs.push(FontRun {
                            text: &text[start..i],
                            face: open_face,
                            missing: false,
                        });
                        open = Some((i, face));
                    }
                    None => open = Some((i, face)),
                }
            }
            None => {
                debug!("no configured font displays U+{:04X}", ch as u32);
                if let Some((start, open_face)) = open.take() {
                    runs.push(FontRun {
                        text: &text[start..i],
                        face: open_face,
                        missing: false,
                    });
                }
                runs.push(FontRun {
                    text: &text[i..i + ch.len_utf8()],
                    face: default_face,
                    missing: true,
                });
                prev_face = None;
            }
        }
    }

    if let Some((start, face)) = open {
        runs.push(FontRun {
            text: &text[start..],
            face,
            missing: false,
        });
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Face 0 covers ASCII uppercase only; face 1 (default) covers
    /// everything except a designated gap character.
    struct TwoFaces {
        gap: Option<char>,
    }

    impl GlyphCoverage for TwoFaces {
        fn face_count(&self) -> usize {
            2
        }

        fn covers(&self, face: FaceIdx, ch: char) -> bool {
            match face.0 {
                0 => ch.is_ascii_uppercase(),
                _ => Some(ch) != self.gap,
            }
        }
    }

    #[test]
    fn fallback_is_first_fit() {
        let fonts = TwoFaces { gap: None };
        let runs = font_runs("AxB", &fonts);
        assert_eq!(runs.len(), 3);
        assert_eq!((runs[0].text, runs[0].face), ("A", FaceIdx(0)));
        assert_eq!((runs[1].text, runs[1].face), ("x", FaceIdx(1)));
        assert_eq!((runs[2].text, runs[2].face), ("B", FaceIdx(0)));
    }

    #[test]
    fn same_face_extends_the_run() {
        let fonts = TwoFaces { gap: None };
        let runs = font_runs("ABC", &fonts);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "ABC");
    }

    #[test]
    fn space_reuses_previous_face() {
        // Face 0 has no space glyph, but the space between uppercase words
        // must not fall through to the default face.
        let fonts = TwoFaces { gap: None };
        let runs = font_runs("AB CD", &fonts);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].face, FaceIdx(0));
    }

    #[test]
    fn leading_space_uses_first_fit() {
        let fonts = TwoFaces { gap: None };
        let runs = font_runs(" AB", &fonts);
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].text, runs[0].face), (" ", FaceIdx(1)));
        assert_eq!((runs[1].text, runs[1].face), ("AB", FaceIdx(0)));
    }

    #[test]
    fn uncovered_codepoint_becomes_missing_run() {
        let fonts = TwoFaces { gap: Some('€') };
        let runs = font_runs("A€B", &fonts);
        assert_eq!(runs.len(), 3);
        assert!(!runs[0].missing);
        assert_eq!(runs[1].text, "€");
        assert_eq!(runs[1].face, FaceIdx(1));
        assert!(runs[1].missing);
        assert_eq!((runs[2].text, runs[2].face), ("B", FaceIdx(0)));
    }

    #[test]
    fn empty_text_no_runs() {
        let fonts = TwoFaces { gap: None };
        assert!(font_runs("", &fonts).is_empty());
    }
}
