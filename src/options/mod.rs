//! Editor configuration with TOML file support.
//!
//! All tweakable settings (camera, editor behavior, panel ranges, lighting,
//! keybindings) are consolidated here. Every section is `#[serde(default)]`
//! so a file only needs the values it overrides.

mod camera;
mod editor;
mod keybindings;
mod lighting;
mod panel;

use std::path::Path;

pub use camera::CameraOptions;
pub use editor::EditorOptions;
pub use keybindings::KeybindingOptions;
pub use lighting::LightingOptions;
pub use panel::{PanelOptions, SliderRange};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::MboxError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[lighting]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
    /// Object store and edit session behavior.
    pub editor: EditorOptions,
    /// Parameter panel slider ranges.
    pub panel: PanelOptions,
    /// Light and background parameters.
    pub lighting: LightingOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::OptionsParse`] for malformed TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, MboxError> {
        let mut options: Self = toml::from_str(content)
            .map_err(|e| MboxError::OptionsParse(e.to_string()))?;
        options.keybindings.rebuild_reverse_map();
        Ok(options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::Io`] if the file cannot be read, or
    /// [`MboxError::OptionsParse`] for malformed TOML.
    pub fn load(path: &Path) -> Result<Self, MboxError> {
        let content = std::fs::read_to_string(path).map_err(MboxError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::OptionsParse`] if serialization fails, or
    /// [`MboxError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), MboxError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MboxError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(MboxError::Io)?;
        }
        std::fs::write(path, content).map_err(MboxError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[lighting]
ambient = 0.3

[editor]
max_objects = 64
";
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.lighting.ambient, 0.3);
        assert_eq!(opts.editor.max_objects, Some(64));
        // Everything else should be default
        assert_eq!(opts.lighting.position, [1.2, 1.0, 2.0]);
        assert_eq!(opts.editor.new_object_distance, 4.5);
        assert_eq!(opts.camera.fov, 45.0);
        assert!(opts.editor.seed_demo_scene);
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(opts.keybindings.lookup("KeyN"), Some(KeyAction::NewObject));
        assert_eq!(opts.keybindings.lookup("Escape"), Some(KeyAction::Exit));
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn loaded_keybindings_rebuild_reverse_map() {
        let toml_str = r#"
[keybindings.bindings]
new_object = "KeyB"
"#;
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.keybindings.lookup("KeyB"), Some(KeyAction::NewObject));
        assert_eq!(opts.keybindings.lookup("KeyN"), None);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            Options::from_toml_str("[camera\nfov = "),
            Err(MboxError::OptionsParse(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("mbox-options-{}.toml", std::process::id()));
        let mut opts = Options::default();
        opts.camera.move_speed = 4.0;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, opts);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("editor"));
        assert!(props.contains_key("panel"));
        assert!(props.contains_key("lighting"));
        assert!(!props.contains_key("keybindings"));

        let lighting = &props["lighting"]["properties"];
        assert!(lighting.get("ambient").is_some());
        assert!(lighting.get("clear_color").is_none());
    }
}
