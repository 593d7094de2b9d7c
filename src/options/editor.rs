use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Editor", inline)]
#[serde(default)]
/// Object store and edit session behavior.
pub struct EditorOptions {
    /// Maximum number of store slots; unbounded when absent.
    #[schemars(skip)]
    pub max_objects: Option<usize>,
    /// Distance in front of the camera at which new objects appear.
    #[schemars(title = "New Object Distance", range(min = 1.0, max = 20.0), extend("step" = 0.5))]
    pub new_object_distance: f32,
    /// Color given to new and demo objects.
    #[schemars(skip)]
    pub default_color: [f32; 3],
    /// Populate the store with the demo cubes on startup.
    #[schemars(skip)]
    pub seed_demo_scene: bool,
    /// Directory of WGSL sources read on startup and on shader reload.
    /// Embedded sources are used when absent.
    #[schemars(skip)]
    pub shader_dir: Option<PathBuf>,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            max_objects: None,
            new_object_distance: 4.5,
            default_color: [1.0, 0.5, 0.31],
            seed_demo_scene: true,
            shader_dir: None,
        }
    }
}
