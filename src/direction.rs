//! Bidirectional direction segmentation — splitting label text into runs of
//! uniform direction and reordering them into visual order.

use unicode_bidi::{BidiClass, bidi_class};

/// Horizontal rendering direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

/// A maximal substring whose codepoints share one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionRun<'a> {
    pub text: &'a str,
    pub direction: Direction,
}

/// Remove codepoints that can ruin layouts.
///
/// Trims surrounding whitespace and strips the bidi override/control ranges
/// U+202A–U+202E and U+206A–U+206F, which would otherwise fight the run
/// segmentation below.
pub fn clean_text(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|&c| {
            let cp = c as u32;
            !((0x202a..=0x202e).contains(&cp) || (0x206a..=0x206f).contains(&cp))
        })
        .collect()
}

/// Direction of a single codepoint, if it has a strong one.
///
/// Strong LTR maps to `LeftToRight`; strong RTL (R and AL, covering Hebrew
/// and Arabic) maps to `RightToLeft`. Everything else — spaces, combining
/// marks, digits, punctuation — has no strong direction and inherits.
fn strong_direction(c: char) -> Option<Direction> {
    match bidi_class(c) {
        BidiClass::L => Some(Direction::LeftToRight),
        BidiClass::R | BidiClass::AL => Some(Direction::RightToLeft),
        _ => None,
    }
}

/// Split `text` into direction runs in visual order.
///
/// A new run starts whenever the effective direction changes. Codepoints
/// without a strong direction continue the current run (keeping whitespace
/// attached to the adjacent word) and default to LTR at the start of the
/// string. If more than one run exists, or the sole run is RTL, the run
/// order is reversed so the result reflects visual rather than logical
/// order. An empty string yields no runs.
pub fn direction_runs(text: &str) -> Vec<DirectionRun<'_>> {
    let mut runs = Vec::new();
    let mut current: Option<Direction> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        let effective = strong_direction(c)
            .or(current)
            .unwrap_or(Direction::LeftToRight);
        match current {
            None => current = Some(effective),
            Some(direction) if direction != effective => {
                runs.push(DirectionRun {
                    text: &text[start..i],
                    direction,
                });
                start = i;
                current = Some(effective);
            }
            Some(_) => {}
        }
    }

    if let Some(direction) = current {
        runs.push(DirectionRun {
            text: &text[start..],
            direction,
        });
    }

    if runs.len() > 1 || runs.first().is_some_and(|r| r.direction == Direction::RightToLeft) {
        runs.reverse();
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_bidi_controls() {
        assert_eq!(clean_text("  ab\u{202e}cd\u{206a}  "), "abcd");
    }

    #[test]
    fn clean_empty() {
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn empty_string_no_runs() {
        assert!(direction_runs("").is_empty());
    }

    #[test]
    fn pure_ltr_single_run() {
        let runs = direction_runs("hello world");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "hello world");
        assert_eq!(runs[0].direction, Direction::LeftToRight);
    }

    #[test]
    fn single_codepoint_single_run() {
        let runs = direction_runs("A");
        assert_eq!(runs.len(), 1);
        let runs = direction_runs("א");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].direction, Direction::RightToLeft);
    }

    #[test]
    fn mixed_runs_reversed_to_visual_order() {
        // Logical order: Latin then Hebrew. Visual order puts the Hebrew
        // run first because the run list is reversed.
        let runs = direction_runs("abc שלום");
        assert!(runs.len() >= 2);
        assert_eq!(runs[0].direction, Direction::RightToLeft);
        assert_eq!(runs.last().unwrap().direction, Direction::LeftToRight);
        assert_eq!(runs.last().unwrap().text, "abc ");
    }

    #[test]
    fn space_inherits_direction() {
        // The space between the Hebrew words stays inside the RTL run.
        let runs = direction_runs("שלום עולם");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].direction, Direction::RightToLeft);
    }

    #[test]
    fn digits_inherit_direction() {
        let runs = direction_runs("abc123");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].direction, Direction::LeftToRight);
    }
}
