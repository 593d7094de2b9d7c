//! Camera system for 3D scene viewing.
//!
//! Provides a first-person fly camera with WASD movement, mouse look, and
//! a horizontal-FOV projection.

/// Movement and mouse-look controller.
pub mod controller;
/// Fly camera pose and projection.
pub mod core;

pub use self::controller::CameraController;
pub use self::core::FlyCamera;
