use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection and orbit-control parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 120.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Initial eye distance along +Z.
    #[schemars(title = "Eye Z", range(min = 0.0, max = 10.0), extend("step" = 1.0))]
    pub eye_z: f32,
    /// Rotation sensitivity (radians per pixel).
    #[schemars(title = "Rotate Speed", range(min = 0.001, max = 0.05), extend("step" = 0.001))]
    pub rotate_speed: f32,
    /// Pan sensitivity (world units per pixel at unit distance).
    #[schemars(title = "Pan Speed", range(min = 0.0005, max = 0.01), extend("step" = 0.0005))]
    pub pan_speed: f32,
    /// Zoom sensitivity per scroll line.
    #[schemars(title = "Zoom Speed", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub zoom_speed: f32,
    /// Closest allowed orbit distance.
    #[schemars(skip)]
    pub min_distance: f32,
    /// Farthest allowed orbit distance.
    #[schemars(skip)]
    pub max_distance: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 75.0,
            znear: 0.1,
            zfar: 100.0,
            eye_z: 7.0,
            rotate_speed: 0.005,
            pan_speed: 0.002,
            zoom_speed: 0.1,
            min_distance: 0.5,
            max_distance: 50.0,
        }
    }
}
