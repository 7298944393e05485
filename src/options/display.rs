use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Scene content toggles and construction parameters.
pub struct DisplayOptions {
    /// Draw the RGB axes helper.
    #[schemars(title = "Show Axes")]
    pub show_axes: bool,
    /// Axes helper length.
    #[schemars(skip)]
    pub axes_size: f32,
    /// Segments per edge of the central box.
    #[schemars(skip)]
    pub box_segments: u32,
    /// Clear color (linear RGB).
    #[schemars(skip)]
    pub background: [f32; 3],
    /// Directory the material texture sets are referenced from.
    #[schemars(skip)]
    pub texture_dir: PathBuf,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_axes: true,
            axes_size: 5.0,
            box_segments: 64,
            background: [0.0, 0.0, 0.0],
            texture_dir: PathBuf::from("images/metal"),
        }
    }
}
