use glam::{Vec2, Vec3};

use super::core::{FlyCamera, PITCH_LIMIT};
use crate::options::CameraOptions;

/// Applies movement and mouse look to a [`FlyCamera`].
pub struct CameraController {
    /// The controlled camera.
    pub camera: FlyCamera,
    move_speed: f32,
    look_sensitivity: f32,
}

impl CameraController {
    /// Controller for a camera configured from `options`.
    pub fn new(options: &CameraOptions, width: u32, height: u32) -> Self {
        let mut controller = Self {
            camera: FlyCamera {
                position: Vec3::from(options.position),
                fov: options.fov,
                znear: options.znear,
                zfar: options.zfar,
                ..FlyCamera::default()
            },
            move_speed: options.move_speed,
            look_sensitivity: options.look_sensitivity,
        };
        controller.resize(width, height);
        controller
    }

    /// Apply changed speed and projection settings, keeping the pose.
    pub fn apply_options(&mut self, options: &CameraOptions) {
        self.camera.fov = options.fov;
        self.camera.znear = options.znear;
        self.camera.zfar = options.zfar;
        self.move_speed = options.move_speed;
        self.look_sensitivity = options.look_sensitivity;
    }

    /// Update the aspect ratio. Zero-sized viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera.aspect = width as f32 / height as f32;
        }
    }

    /// Move by `direction` = `(right, up, forward)` for `dt` seconds.
    pub fn translate(&mut self, direction: Vec3, dt: f32) {
        let velocity = self.move_speed * dt;
        let camera = &mut self.camera;
        let offset = camera.right() * direction.x
            + camera.up() * direction.y
            + camera.front() * direction.z;
        camera.position += offset * velocity;
    }

    /// Turn by a cursor delta in window pixels (y grows downward).
    pub fn look(&mut self, delta: Vec2) {
        let camera = &mut self.camera;
        camera.yaw += delta.x * self.look_sensitivity;
        camera.pitch = (camera.pitch - delta.y * self.look_sensitivity)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CameraController {
        CameraController::new(&CameraOptions::default(), 800, 600)
    }

    #[test]
    fn test_forward_motion_scales_with_dt() {
        let mut c = controller();
        c.translate(Vec3::Z, 0.5);
        // 2.5 units/s for half a second along -Z
        assert!(c.camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 1.75), 1e-5));
    }

    #[test]
    fn test_strafe_and_rise() {
        let mut c = controller();
        c.translate(Vec3::new(1.0, 1.0, 0.0), 1.0);
        assert!(c.camera.position.abs_diff_eq(Vec3::new(2.5, 2.5, 3.0), 1e-5));
    }

    #[test]
    fn test_look_clamps_pitch() {
        let mut c = controller();
        c.look(Vec2::new(100.0, -10_000.0));
        assert!((c.camera.yaw - -80.0).abs() < 1e-4);
        assert_eq!(c.camera.pitch, PITCH_LIMIT);
    }

    #[test]
    fn test_resize_sets_aspect() {
        let mut c = controller();
        assert!((c.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        c.resize(0, 100);
        assert!((c.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }
}
