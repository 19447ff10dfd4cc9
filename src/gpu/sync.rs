//! Incremental synchronization between a `RectanglePacker` and GPU state.
//!
//! The packer only ever appends, so uploads are cheap deltas: new coordinate
//! records from the first unsynced rectangle onward, and only the pages that
//! changed since the last call.

use crate::atlas::RectanglePacker;

/// Upload target for atlas synchronization.
///
/// A trait seam so the sync bookkeeping is testable without a GPU device.
pub trait AtlasBackend {
    /// Replace the full pixel contents of one texture page.
    fn upload_page(&mut self, page: usize, pixels: &[u8]);

    /// Write coordinate records starting at `first_rectangle` (4 floats per
    /// rectangle).
    fn upload_coordinates(&mut self, first_rectangle: usize, coordinates: &[f32]);
}

/// Tracks what a backend has already received from a packer.
///
/// `sync` is idempotent: calling it again with no new rectangles uploads
/// nothing, so it can run every frame.
#[derive(Debug, Default)]
pub struct AtlasSync {
    glyphs_uploaded: usize,
    pages_uploaded: usize,
    generation: u64,
}

impl AtlasSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload whatever the backend is missing.
    ///
    /// A packer reset (detected via its generation counter) restarts the
    /// upload from scratch. The last page uploaded previously is always
    /// re-uploaded, since the packer may have drawn further into it.
    pub fn sync(&mut self, packer: &RectanglePacker, backend: &mut dyn AtlasBackend) {
        if packer.generation() != self.generation {
            self.generation = packer.generation();
            self.glyphs_uploaded = 0;
            self.pages_uploaded = 0;
        }

        if packer.rectangle_count() <= self.glyphs_uploaded {
            return;
        }

        let first_page = self.pages_uploaded.saturating_sub(1);
        for page in first_page..packer.page_count() {
            if let Some(pixels) = packer.page_pixels(page) {
                backend.upload_page(page, pixels);
            }
        }

        backend.upload_coordinates(
            self.glyphs_uploaded,
            &packer.coordinates()[self.glyphs_uploaded * 4..],
        );

        self.glyphs_uploaded = packer.rectangle_count();
        self.pages_uploaded = packer.page_count();
    }
}
