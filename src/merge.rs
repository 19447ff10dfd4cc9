//! Merging of horizontally touching or overlapping glyph bounding boxes into
//! combined groups, so cursive joins render as one atlas image without seams.

/// Pixel bounding box of one shaped glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphBox {
    /// Index of the glyph within the rendered line (shaping order).
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Ascent of the glyph's face in pixels.
    pub ascent: f32,
}

impl GlyphBox {
    #[allow(dead_code)]
    fn right(&self) -> i32 {
        self.x + self.width
    }
}

/// One or more glyphs whose boxes touch or overlap on the x axis, packed and
/// rendered as a single rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedGlyphGroup {
    /// Source glyph indices in shaping order.
    pub indices: Vec<usize>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl MergedGlyphGroup {
    fn from_box(b: GlyphBox) -> Self {
        Self {
            indices: vec![b.index],
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
        }
    }

    fn right(&self) -> i32 {
        self.x + self.width
    }

    fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Extend the union rectangle to cover `b`.
    fn join(&mut self, b: GlyphBox) {
        let right = self.right().max(b.x + b.width);
        let bottom = self.bottom().max(b.y + b.height);
        self.x = self.x.min(b.x);
        self.y = self.y.min(b.y);
        self.width = right - self.x;
        self.height = bottom - self.y;
        self.indices.push(b.index);
    }
}

/// Merge boxes that touch or overlap on the x axis.
///
/// Boxes are stable-sorted by left edge (ties keep shaping order so the
/// atlas content is deterministic), then swept left to right: a box whose
/// left edge lies at or before the current group's right extent joins it,
/// a box strictly to the right closes the group and starts a new one.
/// Isolated glyphs come out as singleton groups.
pub fn merge_boxes(mut boxes: Vec<GlyphBox>) -> Vec<MergedGlyphGroup> {
    boxes.sort_by_key(|b| b.x);

    let mut groups = Vec::new();
    let mut iter = boxes.into_iter();
    let Some(first) = iter.next() else {
        return groups;
    };

    let mut current = MergedGlyphGroup::from_box(first);
    for b in iter {
        if b.x <= current.right() {
            current.join(b);
        } else {
            groups.push(current);
            current = MergedGlyphGroup::from_box(b);
        }
    }
    groups.push(current);

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gbox(index: usize, x: i32, width: i32) -> GlyphBox {
        GlyphBox {
            index,
            x,
            y: 0,
            width,
            height: 10,
            ascent: 8.0,
        }
    }

    #[test]
    fn empty_input() {
        assert!(merge_boxes(Vec::new()).is_empty());
    }

    #[test]
    fn isolated_boxes_stay_singletons() {
        let groups = merge_boxes(vec![gbox(0, 0, 5), gbox(1, 10, 5)]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].indices, vec![0]);
        assert_eq!(groups[1].indices, vec![1]);
    }

    #[test]
    fn overlap_and_singleton() {
        // x-ranges [0,10], [8,20], [25,30]: first two merge, third stands alone.
        let groups = merge_boxes(vec![gbox(0, 0, 10), gbox(1, 8, 12), gbox(2, 25, 5)]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].indices, vec![0, 1]);
        assert_eq!((groups[0].x, groups[0].width), (0, 20));
        assert_eq!(groups[1].indices, vec![2]);
        assert_eq!((groups[1].x, groups[1].width), (25, 5));
    }

    #[test]
    fn touching_edges_merge() {
        // Right extent 10, next left edge exactly 10: still joins.
        let groups = merge_boxes(vec![gbox(0, 0, 10), gbox(1, 10, 5)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].width, 15);
    }

    #[test]
    fn union_takes_min_y_and_max_bottom() {
        let a = GlyphBox { index: 0, x: 0, y: 4, width: 10, height: 6, ascent: 8.0 };
        let b = GlyphBox { index: 1, x: 5, y: 1, width: 10, height: 5, ascent: 8.0 };
        let groups = merge_boxes(vec![a, b]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].y, 1);
        assert_eq!(groups[0].height, 9);
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        let groups = merge_boxes(vec![gbox(1, 25, 5), gbox(0, 0, 10)]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].indices, vec![0]);
    }

    #[test]
    fn identical_left_edges_keep_shaping_order() {
        let groups = merge_boxes(vec![gbox(3, 5, 4), gbox(7, 5, 4)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].indices, vec![3, 7]);
    }
}
