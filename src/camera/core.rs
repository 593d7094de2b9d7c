use glam::{Mat4, Vec3};

use crate::transform::{frustum_hfov, OPENGL_TO_WGPU};

/// Maximum pitch magnitude in degrees; keeps the view off the poles.
pub const PITCH_LIMIT: f32 = 89.0;

/// First-person camera defined by eye position and yaw/pitch angles.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    /// Eye position in world space.
    pub position: Vec3,
    /// Heading in degrees; -90 looks down -Z.
    pub yaw: f32,
    /// Elevation in degrees, clamped to [`PITCH_LIMIT`].
    pub pitch: f32,
    /// World up direction.
    pub world_up: Vec3,
    /// Horizontal field of view in degrees.
    pub fov: f32,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0,
            pitch: 0.0,
            world_up: Vec3::Y,
            fov: 45.0,
            aspect: 1.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

impl FlyCamera {
    /// Unit view direction.
    pub fn front(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize()
    }

    /// Unit right vector.
    pub fn right(&self) -> Vec3 {
        self.front().cross(self.world_up).normalize()
    }

    /// Unit camera up vector.
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.front()).normalize()
    }

    /// World-to-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), self.up())
    }

    /// Horizontal-FOV projection remapped to wgpu's `[0, 1]` depth range.
    pub fn projection(&self) -> Mat4 {
        OPENGL_TO_WGPU * frustum_hfov(self.fov, self.aspect, self.znear, self.zfar)
    }

    /// Combined projection * view.
    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = FlyCamera::default();
        assert!(camera.front().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-6));
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_view_moves_eye_to_origin() {
        let camera = FlyCamera::default();
        let eye = camera.view_matrix().transform_point3(camera.position);
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let camera = FlyCamera::default();
        let clip = camera.view_proj() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!((0.0..1.0).contains(&ndc.z));
    }
}
