use glam::Vec3;

/// Axis reported for a transform with no recoverable rotation.
pub const DEFAULT_ROTATION_AXIS: Vec3 = Vec3::Y;

/// Editable, panel-facing form of an object transform.
///
/// `rotation_axis` is used exactly as given; it is never normalized, so a
/// non-unit axis also scales the rotation block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecomposedTransform {
    /// Uniform scale factor.
    pub scale: f32,
    /// Rotation angle in degrees.
    pub rotation_angle: f32,
    /// Rotation axis (not required to be unit length).
    pub rotation_axis: Vec3,
    /// World-space translation.
    pub position: Vec3,
    /// Linear RGB object color.
    pub color: Vec3,
}

impl Default for DecomposedTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_angle: 0.0,
            rotation_axis: DEFAULT_ROTATION_AXIS,
            position: Vec3::ZERO,
            color: Vec3::ONE,
        }
    }
}

impl DecomposedTransform {
    /// Compose into a model matrix. See [`super::compose`].
    #[must_use]
    pub fn to_model(&self) -> glam::Mat4 {
        super::compose(self)
    }
}
