use glam::Vec3;

use crate::camera::core::Camera;
use crate::gpu::pipeline_helpers::{uniform_layout, UniformBinding};
use crate::gpu::render_context::RenderContext;
use crate::options::LightingOptions;

/// Lighting uniform shared by the lit shaders.
/// NOTE: Must match the WGSL struct layout exactly (48 bytes)
///
///   ambient: vec3<f32>      (offset 0, align 16)
///   _pad0: f32              (offset 12)
///   directional: vec3<f32>  (offset 16, align 16)
///   _pad1: f32              (offset 28)
///   direction: vec3<f32>    (offset 32, align 16)
///   exposure: f32           (offset 44)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    /// Ambient color premultiplied by intensity.
    pub ambient: [f32; 3],
    /// Padding.
    pub _pad0: f32,
    /// Directional color premultiplied by intensity.
    pub directional: [f32; 3],
    /// Padding.
    pub _pad1: f32,
    /// Unit vector from the surface toward the directional light.
    pub direction: [f32; 3],
    /// Scale applied before tone mapping.
    pub exposure: f32,
}

impl LightingUniform {
    /// Derive the uniform from options and the current camera.
    ///
    /// The directional light sits at `directional_offset` in camera space
    /// and shines toward the world origin, so it follows the viewer.
    #[must_use]
    pub fn from_options(options: &LightingOptions, camera: &Camera) -> Self {
        let position = camera.to_world(Vec3::from(options.directional_offset));
        let direction = position.try_normalize().unwrap_or(Vec3::Y);
        Self {
            ambient: (Vec3::from(options.ambient_color)
                * options.ambient_intensity)
                .to_array(),
            _pad0: 0.0,
            directional: (Vec3::from(options.directional_color)
                * options.directional_intensity)
                .to_array(),
            _pad1: 0.0,
            direction: direction.to_array(),
            exposure: options.exposure,
        }
    }
}

/// GPU side of the lighting uniform.
pub struct Lighting {
    /// Last uploaded values.
    pub uniform: LightingUniform,
    /// Bind group layout (group 1).
    pub layout: wgpu::BindGroupLayout,
    binding: UniformBinding<LightingUniform>,
}

impl Lighting {
    /// Create the uniform buffer for the initial camera.
    #[must_use]
    pub fn new(
        context: &RenderContext,
        options: &LightingOptions,
        camera: &Camera,
    ) -> Self {
        let uniform = LightingUniform::from_options(options, camera);
        let layout = uniform_layout(
            &context.device,
            "Lighting",
            wgpu::ShaderStages::FRAGMENT,
        );
        let binding =
            UniformBinding::new(&context.device, &layout, "Lighting", &uniform);
        Self {
            uniform,
            layout,
            binding,
        }
    }

    /// Recompute from the camera and upload if anything changed.
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        options: &LightingOptions,
        camera: &Camera,
    ) {
        let uniform = LightingUniform::from_options(options, camera);
        if uniform != self.uniform {
            self.uniform = uniform;
            self.binding.write(queue, &uniform);
        }
    }

    /// Bind group for group 1.
    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        self.binding.bind_group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(eye: Vec3) -> Camera {
        Camera {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy: 75.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }

    #[test]
    fn layout_is_48_bytes() {
        assert_eq!(size_of::<LightingUniform>(), 48);
    }

    #[test]
    fn intensities_are_premultiplied() {
        let u = LightingUniform::from_options(
            &LightingOptions::default(),
            &camera_at(Vec3::new(0.0, 0.0, 7.0)),
        );
        assert_eq!(u.ambient, [2.0; 3]);
        assert_eq!(u.directional, [4.0; 3]);
        assert_eq!(u.exposure, 0.35);
    }

    #[test]
    fn light_follows_camera() {
        let options = LightingOptions::default();
        let front = LightingUniform::from_options(
            &options,
            &camera_at(Vec3::new(0.0, 0.0, 7.0)),
        );
        // Camera space (0, 5, 10) from an eye on +Z lands above and in front.
        let d = Vec3::from(front.direction);
        assert!(d.y > 0.0 && d.z > 0.0);

        let back = LightingUniform::from_options(
            &options,
            &camera_at(Vec3::new(0.0, 0.0, -7.0)),
        );
        assert!(Vec3::from(back.direction).z < 0.0);
    }
}
