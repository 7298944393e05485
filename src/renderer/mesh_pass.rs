//! Lit mesh pass: opaque groups first, then transparent groups.

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;

use super::draw_list::{self, BlendMode, DrawItem};
use super::material_cache::MaterialCache;
use super::mesh_cache::MeshCache;
use super::pipeline_util::{create_pipeline, PipelineSpec};
use crate::error::NozzleError;
use crate::gpu::pipeline_helpers::{uniform_layout, UniformBinding};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{ShaderComposer, STANDARD_SHADER};
use crate::scene::{MeshVertex, NodeId, Scene, Side};

/// Per-node transform uniform.
/// NOTE: Must match the WGSL `ModelUniform` layout (128 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    /// Local-to-world matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals.
    pub normal: [[f32; 4]; 4],
}

impl ModelUniform {
    /// Uniform for a node with the given world matrix.
    #[must_use]
    pub fn new(world: Mat4) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            normal: world.inverse().transpose().to_cols_array_2d(),
        }
    }
}

/// Record `epoch` as the scene being drawn. Returns `true` when it differs
/// from the previous one, meaning every cached handle and node id is void.
fn switch_epoch(current: &mut Option<u64>, epoch: u64) -> bool {
    current.replace(epoch).is_some_and(|previous| previous != epoch)
}

/// Pipelines, resource caches and per-node uniforms for mesh drawing.
pub struct MeshPass {
    pipelines: FxHashMap<(BlendMode, Side), wgpu::RenderPipeline>,
    model_layout: wgpu::BindGroupLayout,
    models: FxHashMap<NodeId, UniformBinding<ModelUniform>>,
    /// Uploaded geometries.
    pub meshes: MeshCache,
    /// Uploaded materials.
    pub materials: MaterialCache,
    draws: Vec<DrawItem>,
    /// Epoch of the scene the caches were filled from.
    scene_epoch: Option<u64>,
}

impl MeshPass {
    /// Compose the standard shader and build one pipeline per blend mode
    /// and face side.
    ///
    /// # Errors
    ///
    /// [`NozzleError::Shader`] if the shader fails to compose.
    pub fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
        camera_layout: &wgpu::BindGroupLayout,
        lighting_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self, NozzleError> {
        let device = &context.device;
        let shader = composer.compose(device, "Standard Shader", STANDARD_SHADER)?;
        let material_layout =
            uniform_layout(device, "Material", wgpu::ShaderStages::FRAGMENT);
        let model_layout =
            uniform_layout(device, "Model", wgpu::ShaderStages::VERTEX);
        let layouts = [
            camera_layout,
            lighting_layout,
            &material_layout,
            &model_layout,
        ];

        let mut pipelines = FxHashMap::default();
        for blend in [BlendMode::Opaque, BlendMode::Transparent] {
            for side in [Side::Front, Side::Double] {
                let label = format!("Mesh {blend:?} {side:?}");
                let spec = PipelineSpec {
                    label: &label,
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: match side {
                        Side::Front => Some(wgpu::Face::Back),
                        Side::Double => None,
                    },
                    blend: match blend {
                        BlendMode::Opaque => None,
                        BlendMode::Transparent => {
                            Some(wgpu::BlendState::ALPHA_BLENDING)
                        }
                    },
                    depth_write: blend == BlendMode::Opaque,
                };
                let pipeline = create_pipeline(
                    device,
                    context.format(),
                    &shader,
                    &layouts,
                    MeshVertex::layout(),
                    &spec,
                );
                let _ = pipelines.insert((blend, side), pipeline);
            }
        }

        Ok(Self {
            pipelines,
            model_layout,
            models: FxHashMap::default(),
            meshes: MeshCache::new(),
            materials: MaterialCache::new(material_layout),
            draws: Vec::new(),
            scene_epoch: None,
        })
    }

    /// Drop GPU resources the scene disposed, then upload whatever the
    /// current draw list needs.
    pub fn prepare(
        &mut self,
        context: &RenderContext,
        scene: &mut Scene,
        eye: Vec3,
    ) {
        let device = &context.device;
        let queue = &context.queue;

        if switch_epoch(&mut self.scene_epoch, scene.epoch()) {
            log::debug!("scene replaced, flushing GPU caches");
            self.flush();
        }
        self.meshes.evict(&scene.geometries.drain_disposed());
        self.materials.evict(&scene.materials.drain_disposed());

        self.draws = draw_list::build(scene, eye);
        self.draws.retain(|draw| {
            self.meshes.sync(device, queue, &scene.geometries, draw.geometry)
                && self.materials.sync(
                    device,
                    queue,
                    &scene.materials,
                    draw.material,
                )
        });

        for draw in &self.draws {
            let uniform = ModelUniform::new(draw.world);
            match self.models.get(&draw.node) {
                Some(binding) => binding.write(queue, &uniform),
                None => {
                    let binding = UniformBinding::new(
                        device,
                        &self.model_layout,
                        "Model",
                        &uniform,
                    );
                    let _ = self.models.insert(draw.node, binding);
                }
            }
        }
    }

    /// Drop every cached GPU resource.
    fn flush(&mut self) {
        self.meshes.clear();
        self.materials.clear();
        for (_, binding) in self.models.drain() {
            binding.destroy();
        }
        self.draws.clear();
    }

    /// Number of draws recorded by the last `prepare`.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Record the draws. Camera and lighting must already be bound at
    /// groups 0 and 1.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        for draw in &self.draws {
            let (Some(pipeline), Some(mesh), Some(material), Some(model)) = (
                self.pipelines.get(&(draw.blend, draw.side)),
                self.meshes.get(draw.geometry),
                self.materials.bind_group(draw.material),
                self.models.get(&draw.node),
            ) else {
                continue;
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(2, material, &[]);
            render_pass.set_bind_group(3, model.bind_group(), &[]);
            render_pass.set_vertex_buffer(0, mesh.vertices.buffer().slice(..));
            render_pass.set_index_buffer(
                mesh.indices.buffer().slice(..),
                wgpu::IndexFormat::Uint32,
            );
            render_pass.draw_indexed(draw.indices.clone(), 0, 0..1);
        }
    }
}
