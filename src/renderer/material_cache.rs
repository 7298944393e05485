//! Uniform buffers for pooled materials.

use rustc_hash::FxHashMap;

use crate::gpu::pipeline_helpers::UniformBinding;
use crate::scene::{MaterialId, ResourcePool, StandardMaterial};

/// Material uniform.
/// NOTE: Must match the WGSL `MaterialUniform` layout (32 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Linear RGB + alpha.
    pub color: [f32; 4],
    /// Roughness, metalness, unused, unused.
    pub params: [f32; 4],
}

impl From<&StandardMaterial> for MaterialUniform {
    fn from(m: &StandardMaterial) -> Self {
        Self {
            color: [m.color[0], m.color[1], m.color[2], m.alpha()],
            params: [m.roughness, m.metalness, 0.0, 0.0],
        }
    }
}

struct GpuMaterial {
    binding: UniformBinding<MaterialUniform>,
    generation: u64,
}

/// One bind group per material, rewritten when the pool generation moves.
pub struct MaterialCache {
    layout: wgpu::BindGroupLayout,
    materials: FxHashMap<MaterialId, GpuMaterial>,
}

impl MaterialCache {
    /// Empty cache creating bind groups against `layout`.
    #[must_use]
    pub fn new(layout: wgpu::BindGroupLayout) -> Self {
        Self {
            layout,
            materials: FxHashMap::default(),
        }
    }

    /// Material bind group layout (group 2).
    #[must_use]
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Make sure `id` has a current uniform. Returns `false` for stale ids.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pool: &ResourcePool<StandardMaterial>,
        id: MaterialId,
    ) -> bool {
        let (Some(material), Some(generation)) =
            (pool.get(id), pool.generation(id))
        else {
            return false;
        };
        let uniform = MaterialUniform::from(material);

        match self.materials.get_mut(&id) {
            Some(gpu) if gpu.generation == generation => {}
            Some(gpu) => {
                gpu.binding.write(queue, &uniform);
                gpu.generation = generation;
            }
            None => {
                let binding =
                    UniformBinding::new(device, &self.layout, "Material", &uniform);
                let _ = self
                    .materials
                    .insert(id, GpuMaterial { binding, generation });
            }
        }
        true
    }

    /// Bind group for `id`, if synced.
    #[must_use]
    pub fn bind_group(&self, id: MaterialId) -> Option<&wgpu::BindGroup> {
        self.materials.get(&id).map(|m| m.binding.bind_group())
    }

    /// Free uniforms of materials the pool disposed.
    pub fn evict(&mut self, disposed: &[MaterialId]) {
        for id in disposed {
            if let Some(gpu) = self.materials.remove(id) {
                gpu.binding.destroy();
            }
        }
    }

    /// Free every uniform.
    pub fn clear(&mut self) {
        for (_, gpu) in self.materials.drain() {
            gpu.binding.destroy();
        }
    }

    /// Number of materials with live uniforms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether no material is uploaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
