//! Slider limits for the external parameter panel.

use crate::options::PanelOptions;
use crate::transform::DecomposedTransform;

/// Clamp every field of `transform` into the panel's slider ranges.
/// Color channels are clamped to `[0, 1]`.
pub fn clamp_to_panel(transform: &mut DecomposedTransform, panel: &PanelOptions) {
    transform.scale = panel.scale.clamp(transform.scale);
    transform.rotation_angle = panel.angle.clamp(transform.rotation_angle);
    transform.rotation_axis = transform.rotation_axis.map(|c| panel.axis.clamp(c));
    transform.position = transform.position.map(|c| panel.position.clamp(c));
    transform.color = transform.color.clamp(glam::Vec3::ZERO, glam::Vec3::ONE);
}
