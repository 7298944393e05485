//! Scene rendering: resource caches, the lit mesh pass and the axes pass.

pub mod axes_pass;
pub mod draw_list;
pub mod material_cache;
pub mod mesh_cache;
pub mod mesh_pass;
pub(crate) mod pipeline_util;

use crate::camera::core::{Camera, CameraUniform};
use crate::error::NozzleError;
use crate::gpu::lighting::Lighting;
use crate::gpu::pipeline_helpers::{uniform_layout, UniformBinding};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::DepthTarget;
use crate::scene::Scene;

use self::axes_pass::AxesPass;
use self::mesh_pass::MeshPass;

/// Everything needed to turn a [`Scene`] into a frame.
pub struct SceneRenderer {
    camera: UniformBinding<CameraUniform>,
    depth: DepthTarget,
    /// Lit meshes.
    pub mesh_pass: MeshPass,
    axes_pass: AxesPass,
}

impl SceneRenderer {
    /// Compile shaders and create pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`NozzleError::Shader`] if a shader fails to compose.
    pub fn new(
        context: &RenderContext,
        lighting: &Lighting,
    ) -> Result<Self, NozzleError> {
        let mut composer = ShaderComposer::new()?;
        let camera_layout = uniform_layout(
            &context.device,
            "Camera",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let camera = UniformBinding::new(
            &context.device,
            &camera_layout,
            "Camera",
            &<CameraUniform as bytemuck::Zeroable>::zeroed(),
        );
        let mesh_pass = MeshPass::new(
            context,
            &mut composer,
            &camera_layout,
            &lighting.layout,
        )?;
        let axes_pass = AxesPass::new(context, &mut composer, &camera_layout)?;
        let (width, height) = context.size();

        Ok(Self {
            camera,
            depth: DepthTarget::new(&context.device, width, height),
            mesh_pass,
            axes_pass,
        })
    }

    /// Recreate size-dependent targets.
    pub fn resize(&mut self, context: &RenderContext) {
        let (width, height) = context.size();
        self.depth.resize(&context.device, width, height);
    }

    /// Upload camera, geometry, material and transform changes.
    pub fn prepare(
        &mut self,
        context: &RenderContext,
        scene: &mut Scene,
        camera: &Camera,
    ) {
        self.camera
            .write(&context.queue, &CameraUniform::from(camera));
        self.mesh_pass.prepare(context, scene, camera.eye);
        self.axes_pass.prepare(context, scene);
        scene.mark_rendered();
    }

    /// Record the scene pass into `encoder`, targeting `view`.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        lighting: &Lighting,
        background: [f32; 3],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(background[0]),
                        g: f64::from(background[1]),
                        b: f64::from(background[2]),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, self.camera.bind_group(), &[]);
        pass.set_bind_group(1, lighting.bind_group(), &[]);
        self.axes_pass.draw(&mut pass);
        self.mesh_pass.draw(&mut pass);
    }
}
