use glam::{Mat4, Vec3};

/// Look-at perspective camera.
///
/// Owned by [`OrbitController`](super::controller::OrbitController), which
/// rewrites `eye`, `target` and `up` on every gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World-space eye position.
    pub eye: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Width over height of the viewport.
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near plane.
    pub znear: f32,
    /// Far plane.
    pub zfar: f32,
}

impl Camera {
    /// World-to-view matrix.
    #[must_use]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// View-to-clip matrix with wgpu's `[0, 1]` depth range.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }

    /// World-to-clip matrix.
    #[must_use]
    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Map a point given in the camera's own frame to world space.
    ///
    /// Lights attached to the camera are placed with this.
    #[must_use]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.view().inverse().transform_point3(local)
    }
}

/// Camera block bound at group 0.
/// NOTE: Must match `nozzle::camera::CameraUniform` (80 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// World-to-clip matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Eye position, for specular terms.
    pub position: [f32; 3],
    /// Viewport aspect ratio.
    pub aspect: f32,
}

impl From<&Camera> for CameraUniform {
    fn from(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            position: camera.eye.to_array(),
            aspect: camera.aspect,
        }
    }
}
