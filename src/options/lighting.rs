use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Ambient light plus one directional light carried by the camera.
pub struct LightingOptions {
    /// Ambient light color (linear RGB).
    #[schemars(skip)]
    pub ambient_color: [f32; 3],
    #[schemars(title = "Ambient", range(min = 0.0, max = 4.0), extend("step" = 0.1))]
    /// Ambient light intensity.
    pub ambient_intensity: f32,
    /// Directional light color (linear RGB).
    #[schemars(skip)]
    pub directional_color: [f32; 3],
    /// Directional light intensity.
    #[schemars(title = "Key Light", range(min = 0.0, max = 8.0), extend("step" = 0.1))]
    pub directional_intensity: f32,
    /// Directional light position in camera space; it shines toward the
    /// camera's target.
    #[schemars(skip)]
    pub directional_offset: [f32; 3],
    /// Scale applied before tone mapping.
    #[schemars(title = "Exposure", range(min = 0.05, max = 2.0), extend("step" = 0.05))]
    pub exposure: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 2.0,
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 4.0,
            directional_offset: [0.0, 5.0, 10.0],
            exposure: 0.35,
        }
    }
}
