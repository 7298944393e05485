//! Depth attachment for the scene pass.

/// Depth format shared by every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

fn depth_extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    }
}

/// Depth buffer that follows the surface size.
pub struct DepthTarget {
    texture: wgpu::Texture,
    /// View bound as the pass's depth attachment.
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    /// Allocate a `width` x `height` depth buffer. Zero extents become 1.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("nozzle depth"),
            size: depth_extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Reallocate if the size changed.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.texture.size() != depth_extent(width, height) {
            self.texture.destroy();
            *self = Self::new(device, width, height);
        }
    }
}
