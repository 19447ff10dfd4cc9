//! wgpu backend for the glyph atlas: a grayscale `D2Array` texture holding
//! the packed pages and a storage buffer holding the rectangle coordinates.

use log::warn;

use super::sync::AtlasBackend;

/// Texture array depth. Pages past this limit are dropped with a warning;
/// their glyphs sample from page 0 instead of crashing the device.
pub const MAX_PAGES: u32 = 8;

/// Coordinate buffer capacity in rectangles (4 floats each).
const COORDINATE_BUDGET: usize = 65536;

const COORDINATE_STRIDE: u64 = 4 * std::mem::size_of::<f32>() as u64;

/// GPU-resident glyph atlas: texture array, sampler, and coordinate buffer.
///
/// Sized once at creation; the packer side grows dynamically and the
/// `AtlasBackend` impl clamps anything beyond the fixed budgets.
pub struct GlyphTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    coordinates: wgpu::Buffer,
    queue: wgpu::Queue,
    page_size: u32,
}

impl GlyphTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, page_size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph_atlas"),
            size: wgpu::Extent3d {
                width: page_size,
                height: page_size,
                depth_or_array_layers: MAX_PAGES,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        // Labels are drawn scaled well below the render size, so sampling
        // must be linear.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glyph_atlas_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let coordinates = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glyph_coordinates"),
            size: COORDINATE_BUDGET as u64 * COORDINATE_STRIDE,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            sampler,
            coordinates,
            queue: queue.clone(),
            page_size,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn coordinate_buffer(&self) -> &wgpu::Buffer {
        &self.coordinates
    }

    /// Bind group layout for label pipelines: binding 0 = page array,
    /// binding 1 = sampler, binding 2 = coordinate storage (read in the
    /// vertex shader to place quads, in the fragment shader to sample).
    pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glyph_atlas_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(COORDINATE_STRIDE),
                    },
                    count: None,
                },
            ],
        })
    }

    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glyph_atlas_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.coordinates.as_entire_binding(),
                },
            ],
        })
    }
}

impl AtlasBackend for GlyphTexture {
    fn upload_page(&mut self, page: usize, pixels: &[u8]) {
        if page as u32 >= MAX_PAGES {
            warn!("atlas page {page} exceeds texture array depth {MAX_PAGES}, dropping");
            return;
        }
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: page as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.page_size),
                rows_per_image: Some(self.page_size),
            },
            wgpu::Extent3d {
                width: self.page_size,
                height: self.page_size,
                depth_or_array_layers: 1,
            },
        );
    }

    fn upload_coordinates(&mut self, first_rectangle: usize, coordinates: &[f32]) {
        let mut coordinates = coordinates;
        if first_rectangle + coordinates.len() / 4 > COORDINATE_BUDGET {
            warn!("coordinate budget {COORDINATE_BUDGET} exceeded, truncating upload");
            let room = COORDINATE_BUDGET.saturating_sub(first_rectangle) * 4;
            coordinates = &coordinates[..room];
        }
        if coordinates.is_empty() {
            return;
        }

        let mut bytes = Vec::with_capacity(coordinates.len() * 4);
        for value in coordinates {
            bytes.extend_from_slice(&value.to_ne_bytes());
        }
        self.queue.write_buffer(
            &self.coordinates,
            first_rectangle as u64 * COORDINATE_STRIDE,
            &bytes,
        );
    }
}
