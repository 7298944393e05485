//! Centralized scene/view options with TOML preset support.
//!
//! Camera, lighting, spray, display and key-binding settings are
//! consolidated here. Options serialize to/from TOML so a session can be
//! started from a preset file.

mod camera;
mod display;
mod lighting;
mod spray;

use std::path::Path;

pub use camera::CameraOptions;
pub use display::DisplayOptions;
pub use lighting::LightingOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use spray::{ApplyScope, SprayOptions};

use crate::error::NozzleError;
use crate::input::KeyBindings;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[lighting]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
    /// Lighting parameters.
    pub lighting: LightingOptions,
    /// Spray construction and controller scope.
    pub spray: SprayOptions,
    /// Display toggles and scene construction parameters.
    pub display: DisplayOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeyBindings,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// [`NozzleError::Io`] if the file cannot be read,
    /// [`NozzleError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, NozzleError> {
        let content = std::fs::read_to_string(path).map_err(NozzleError::Io)?;
        toml::from_str(&content)
            .map_err(|e| NozzleError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// [`NozzleError::OptionsParse`] on serialization failure,
    /// [`NozzleError::Io`] if the file or its directory cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), NozzleError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| NozzleError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(NozzleError::Io)?;
        }
        std::fs::write(path, content).map_err(NozzleError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NozzleCommand;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[spray]
scope = "all"

[lighting]
exposure = 0.8
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.spray.scope, ApplyScope::All);
        assert_eq!(opts.lighting.exposure, 0.8);
        // Everything else should be default
        assert_eq!(opts.spray.instance_count, 5);
        assert_eq!(opts.camera.fovy, 75.0);
        assert_eq!(opts.camera.eye_z, 7.0);
        assert!(opts.display.show_axes);
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("KeyC"),
            Some(NozzleCommand::ClearSpray)
        );
        assert_eq!(
            opts.keybindings.lookup("KeyQ"),
            Some(NozzleCommand::ResetCamera)
        );
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!(
            "nozzle-options-{}",
            std::process::id()
        ));
        let path = dir.join("preset.toml");
        let mut opts = Options::default();
        opts.spray.scope = ApplyScope::All;
        opts.save(&path).unwrap();
        assert_eq!(Options::load(&path).unwrap(), opts);
        assert_eq!(Options::list_presets(&dir), vec![String::from("preset")]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("lighting"));
        assert!(props.contains_key("spray"));
        assert!(props.contains_key("display"));
        assert!(!props.contains_key("keybindings"));

        let lighting = &props["lighting"]["properties"];
        assert!(lighting.get("ambient_intensity").is_some());
        assert!(lighting.get("directional_offset").is_none());
    }
}
