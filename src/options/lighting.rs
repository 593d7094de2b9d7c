use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Point light and background parameters.
pub struct LightingOptions {
    /// World-space light position.
    #[schemars(skip)]
    pub position: [f32; 3],
    /// Light color.
    #[schemars(skip)]
    pub color: [f32; 3],
    /// Ambient strength applied to every object.
    #[schemars(title = "Ambient", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub ambient: f32,
    /// Uniform scale of the light marker cube.
    #[schemars(title = "Marker Size", range(min = 0.05, max = 1.0), extend("step" = 0.05))]
    pub marker_scale: f32,
    /// Framebuffer clear color.
    #[schemars(skip)]
    pub clear_color: [f32; 3],
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            position: [1.2, 1.0, 2.0],
            color: [1.0, 1.0, 1.0],
            ambient: 0.1,
            marker_scale: 0.2,
            clear_color: [0.1, 0.1, 0.1],
        }
    }
}
