//! Line-list pass for the axes helper.

use glam::Mat4;

use super::pipeline_util::{create_pipeline, PipelineSpec};
use crate::error::NozzleError;
use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{ShaderComposer, LINE_SHADER};
use crate::scene::{axes_lines, LineVertex, Scene};

/// World-space line vertices for every visible axes helper.
#[must_use]
pub fn axes_vertices(helpers: &[(Mat4, f32)]) -> Vec<LineVertex> {
    helpers
        .iter()
        .flat_map(|(world, size)| {
            axes_lines(*size).into_iter().map(move |mut v| {
                v.position = world
                    .transform_point3(v.position.into())
                    .to_array();
                v
            })
        })
        .collect()
}

/// Pipeline and vertex buffer for the axes helper lines.
pub struct AxesPass {
    pipeline: wgpu::RenderPipeline,
    vertices: TypedBuffer<LineVertex>,
}

impl AxesPass {
    /// Compose the line shader and build its pipeline.
    ///
    /// # Errors
    ///
    /// [`NozzleError::Shader`] if the shader fails to compose.
    pub fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
        camera_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self, NozzleError> {
        let shader =
            composer.compose(&context.device, "Line Shader", LINE_SHADER)?;
        let pipeline = create_pipeline(
            &context.device,
            context.format(),
            &shader,
            &[camera_layout],
            LineVertex::layout(),
            &PipelineSpec {
                label: "Axes",
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                blend: None,
                depth_write: true,
            },
        );
        let vertices = TypedBuffer::new_with_data(
            &context.device,
            "Axes Vertices",
            &[],
            wgpu::BufferUsages::VERTEX,
        );
        Ok(Self { pipeline, vertices })
    }

    /// Rebuild the line vertices from the scene's visible helpers.
    pub fn prepare(&mut self, context: &RenderContext, scene: &Scene) {
        let vertices = axes_vertices(&scene.axes());
        let _ = self
            .vertices
            .write(&context.device, &context.queue, &vertices);
    }

    /// Record the lines. The camera must already be bound at group 0.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.vertices.is_empty() {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, self.vertices.buffer().slice(..));
        render_pass.draw(0..self.vertices.count() as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn helpers_are_transformed() {
        let world = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let v = axes_vertices(&[(world, 5.0)]);
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].position, [1.0, 0.0, 0.0]);
        assert_eq!(v[1].position, [6.0, 0.0, 0.0]);
    }

    #[test]
    fn hidden_helper_yields_nothing() {
        assert!(axes_vertices(&[]).is_empty());
    }
}
