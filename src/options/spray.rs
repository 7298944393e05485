use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which spray instances the parameter controller drives.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ApplyScope {
    /// Only the first spray instance in scene order.
    #[default]
    One,
    /// Every spray instance.
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Spray", inline)]
#[serde(default)]
/// Spray cone construction and control parameters.
pub struct SprayOptions {
    /// Instances the angle slider and clear button act on.
    #[schemars(title = "Apply To")]
    pub scope: ApplyScope,
    /// Number of spray instances arranged around the box.
    #[schemars(skip)]
    pub instance_count: u32,
    /// Base radius of the shared cone before any angle is set.
    #[schemars(skip)]
    pub initial_radius: f32,
    /// Spray material opacity.
    #[schemars(title = "Opacity", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub opacity: f32,
}

impl Default for SprayOptions {
    fn default() -> Self {
        Self {
            scope: ApplyScope::One,
            instance_count: 5,
            initial_radius: 0.5,
            opacity: 0.6,
        }
    }
}
