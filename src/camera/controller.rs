use glam::{Quat, Vec2, Vec3};

use crate::camera::core::Camera;
use crate::options::CameraOptions;

/// Orbit controller: the eye circles a focus point at some distance.
///
/// Pure math; the renderer copies [`OrbitController::camera`] into its
/// uniform buffer once per frame.
#[derive(Debug, Clone)]
pub struct OrbitController {
    orientation: Quat,
    distance: f32,
    focus_point: Vec3,
    camera: Camera,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    home_distance: f32,
}

impl OrbitController {
    /// Camera looking down -Z at the origin from `options.eye_z`.
    #[must_use]
    pub fn new(options: &CameraOptions, width: u32, height: u32) -> Self {
        let distance = options.eye_z;
        let mut controller = Self {
            orientation: Quat::IDENTITY,
            distance,
            focus_point: Vec3::ZERO,
            camera: Camera {
                eye: Vec3::new(0.0, 0.0, distance),
                target: Vec3::ZERO,
                up: Vec3::Y,
                aspect: aspect(width, height),
                fovy: options.fovy,
                znear: options.znear,
                zfar: options.zfar,
            },
            rotate_speed: options.rotate_speed,
            pan_speed: options.pan_speed,
            zoom_speed: options.zoom_speed,
            min_distance: options.min_distance,
            max_distance: options.max_distance,
            home_distance: distance,
        };
        controller.update_camera_pos();
        controller
    }

    /// Current camera.
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current orbit distance.
    #[must_use]
    pub const fn distance(&self) -> f32 {
        self.distance
    }

    /// Re-read projection and sensitivity settings.
    pub fn apply_options(&mut self, options: &CameraOptions) {
        self.camera.fovy = options.fovy;
        self.camera.znear = options.znear;
        self.camera.zfar = options.zfar;
        self.rotate_speed = options.rotate_speed;
        self.pan_speed = options.pan_speed;
        self.zoom_speed = options.zoom_speed;
        self.min_distance = options.min_distance;
        self.max_distance = options.max_distance;
        self.home_distance = options.eye_z;
        self.distance = self.clamp_distance(self.distance);
        self.update_camera_pos();
    }

    fn clamp_distance(&self, d: f32) -> f32 {
        d.clamp(self.min_distance, self.max_distance)
    }

    fn update_camera_pos(&mut self) {
        let dir = self.orientation * Vec3::Z;

        self.camera.eye = self.focus_point + (dir * self.distance);
        self.camera.target = self.focus_point;
        self.camera.up = self.orientation * Vec3::Y;
    }

    /// Update the aspect ratio for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.aspect = aspect(width, height);
    }

    /// Orbit by a mouse delta in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        // Horizontal rotation around the world up axis keeps the horizon
        // level, vertical rotation around the camera's right vector.
        let horizontal =
            Quat::from_axis_angle(Vec3::Y, -delta.x * self.rotate_speed);
        self.orientation = horizontal * self.orientation;

        let right = self.orientation * Vec3::X;
        let vertical =
            Quat::from_axis_angle(right, -delta.y * self.rotate_speed);
        self.orientation = (vertical * self.orientation).normalize();

        self.update_camera_pos();
    }

    /// Slide the focus point by a mouse delta in pixels.
    pub fn pan(&mut self, delta: Vec2) {
        let right = self.orientation * Vec3::X;
        let up = self.orientation * Vec3::Y;
        let scale = self.pan_speed * self.distance;

        self.focus_point += right * (-delta.x * scale) + up * (delta.y * scale);
        self.update_camera_pos();
    }

    /// Move toward (positive) or away from (negative) the focus point.
    pub fn zoom(&mut self, delta: f32) {
        self.distance =
            self.clamp_distance(self.distance * (1.0 - delta * self.zoom_speed));
        self.update_camera_pos();
    }

    /// Place the eye so that its Z coordinate equals `z` along the current
    /// view axis.
    ///
    /// With the default orientation this is exactly `camera.eye.z = z`.
    /// A zero distance is nudged to the minimum orbit distance.
    pub fn set_eye_z(&mut self, z: f32) {
        let axis_z = (self.orientation * Vec3::Z).z;
        let along = if axis_z.abs() > 1e-3 {
            (z - self.focus_point.z) / axis_z
        } else {
            z
        };
        self.distance = self.clamp_distance(along.abs());
        self.update_camera_pos();
    }

    /// Return to the initial view.
    pub fn reset(&mut self) {
        self.orientation = Quat::IDENTITY;
        self.focus_point = Vec3::ZERO;
        self.distance = self.clamp_distance(self.home_distance);
        self.update_camera_pos();
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> OrbitController {
        OrbitController::new(&CameraOptions::default(), 800, 600)
    }

    #[test]
    fn starts_on_positive_z() {
        let c = controller();
        assert_eq!(c.camera().eye, Vec3::new(0.0, 0.0, 7.0));
        assert_eq!(c.camera().fovy, 75.0);
        assert!((c.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn rotate_keeps_distance() {
        let mut c = controller();
        c.rotate(Vec2::new(120.0, -40.0));
        let d = (c.camera().eye - c.camera().target).length();
        assert!((d - 7.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut c = controller();
        for _ in 0..200 {
            c.zoom(1.0);
        }
        assert_eq!(c.distance(), CameraOptions::default().min_distance);
        for _ in 0..200 {
            c.zoom(-1.0);
        }
        assert_eq!(c.distance(), CameraOptions::default().max_distance);
    }

    #[test]
    fn set_eye_z_moves_along_axis() {
        let mut c = controller();
        c.set_eye_z(3.0);
        assert!((c.camera().eye.z - 3.0).abs() < 1e-5);
        c.set_eye_z(0.0);
        assert_eq!(c.distance(), CameraOptions::default().min_distance);
    }

    #[test]
    fn reset_restores_home() {
        let mut c = controller();
        c.rotate(Vec2::new(50.0, 10.0));
        c.pan(Vec2::new(5.0, 5.0));
        c.reset();
        assert_eq!(c.camera().eye, Vec3::new(0.0, 0.0, 7.0));
        assert_eq!(c.camera().target, Vec3::ZERO);
    }

    #[test]
    fn zero_height_resize_is_safe() {
        let mut c = controller();
        c.resize(640, 0);
        assert!(c.camera().aspect.is_finite());
    }
}
