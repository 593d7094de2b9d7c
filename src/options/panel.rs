use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Inclusive slider bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SliderRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl SliderRange {
    /// Range `[min, max]`.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp `value` into the range.
    #[must_use]
    pub fn clamp(self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Panel", inline)]
#[serde(default)]
/// Slider ranges for the parameter panel.
pub struct PanelOptions {
    /// Uniform scale.
    pub scale: SliderRange,
    /// Rotation angle in degrees.
    pub angle: SliderRange,
    /// Each rotation axis component.
    pub axis: SliderRange,
    /// Each position component.
    pub position: SliderRange,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            scale: SliderRange::new(0.1, 2.5),
            angle: SliderRange::new(0.0, 180.0),
            axis: SliderRange::new(0.0, 1.0),
            position: SliderRange::new(-15.0, 15.0),
        }
    }
}
