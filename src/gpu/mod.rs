//! GPU-side atlas state: incremental synchronization bookkeeping and the
//! wgpu texture/buffer backend it drives.

mod sync;
mod texture;

pub use sync::{AtlasBackend, AtlasSync};
pub use texture::{GlyphTexture, MAX_PAGES};
