use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Fly-camera projection and control parameters.
pub struct CameraOptions {
    /// Horizontal field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 120.0), extend("step" = 1.0))]
    pub fov: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Movement speed in world units per second.
    #[schemars(title = "Move Speed", range(min = 0.5, max = 10.0), extend("step" = 0.1))]
    pub move_speed: f32,
    /// Degrees of yaw/pitch per pixel of mouse motion.
    #[schemars(title = "Look Sensitivity", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub look_sensitivity: f32,
    /// Initial eye position.
    #[schemars(skip)]
    pub position: [f32; 3],
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fov: 45.0,
            znear: 0.1,
            zfar: 100.0,
            move_speed: 2.5,
            look_sensitivity: 0.1,
            position: [0.0, 0.0, 3.0],
        }
    }
}
