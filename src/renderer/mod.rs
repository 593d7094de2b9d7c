//! Rendering subsystems: cube geometry, frame and per-draw uniforms, and
//! the lit scene pass.
//!
//! The picking pass lives in [`crate::picking`] and reuses the same mesh,
//! frame bindings, and draw uniform layout.

pub mod draw;
pub mod frame;
pub mod mesh;
pub(crate) mod pipeline_util;
pub mod scene_pass;

pub use draw::DrawUniform;
pub use frame::{FrameBindings, FrameUniform};
pub use mesh::CubeMesh;
pub use scene_pass::ScenePass;
