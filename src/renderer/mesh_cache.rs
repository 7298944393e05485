//! GPU buffers for pooled geometries.

use rustc_hash::FxHashMap;

use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::scene::{Geometry, GeometryId, MeshVertex, ResourcePool};

/// Vertex and index buffers for one geometry.
pub struct GpuMesh {
    /// Vertex buffer.
    pub vertices: TypedBuffer<MeshVertex>,
    /// Index buffer.
    pub indices: TypedBuffer<u32>,
    generation: u64,
}

/// Uploads geometries on first use and whenever their pool generation
/// moves; drops buffers of disposed geometries.
#[derive(Default)]
pub struct MeshCache {
    meshes: FxHashMap<GeometryId, GpuMesh>,
}

impl MeshCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `id` has current buffers. Returns `false` for stale ids.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pool: &ResourcePool<Geometry>,
        id: GeometryId,
    ) -> bool {
        let (Some(geometry), Some(generation)) =
            (pool.get(id), pool.generation(id))
        else {
            return false;
        };
        let mesh = geometry.mesh();

        match self.meshes.get_mut(&id) {
            Some(gpu) if gpu.generation == generation => {}
            Some(gpu) => {
                let _ = gpu.vertices.write(device, queue, &mesh.vertices);
                let _ = gpu.indices.write(device, queue, &mesh.indices);
                gpu.generation = generation;
            }
            None => {
                log::debug!(
                    "uploading {:?}: {} vertices, {} indices",
                    id,
                    mesh.vertices.len(),
                    mesh.indices.len()
                );
                let _ = self.meshes.insert(
                    id,
                    GpuMesh {
                        vertices: TypedBuffer::new_with_data(
                            device,
                            "Mesh Vertices",
                            &mesh.vertices,
                            wgpu::BufferUsages::VERTEX,
                        ),
                        indices: TypedBuffer::new_with_data(
                            device,
                            "Mesh Indices",
                            &mesh.indices,
                            wgpu::BufferUsages::INDEX,
                        ),
                        generation,
                    },
                );
            }
        }
        true
    }

    /// Buffers for `id`, if synced.
    #[must_use]
    pub fn get(&self, id: GeometryId) -> Option<&GpuMesh> {
        self.meshes.get(&id)
    }

    /// Free buffers of geometries the pool disposed.
    pub fn evict(&mut self, disposed: &[GeometryId]) {
        for id in disposed {
            if let Some(gpu) = self.meshes.remove(id) {
                gpu.vertices.destroy();
                gpu.indices.destroy();
            }
        }
    }

    /// Free every buffer.
    pub fn clear(&mut self) {
        for (_, gpu) in self.meshes.drain() {
            gpu.vertices.destroy();
            gpu.indices.destroy();
        }
    }

    /// Number of geometries with live GPU buffers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether no geometry is uploaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
