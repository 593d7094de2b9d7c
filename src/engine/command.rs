//! The engine's complete interactive vocabulary.
//!
//! Every user-facing operation, whether triggered by a key, a mouse
//! gesture or a programmatic call, is an `EditorCommand`. Consumers
//! construct commands and pass them to
//! [`EditorEngine::execute`](super::EditorEngine::execute).

use glam::{Vec2, Vec3};

/// A discrete operation on the editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorCommand {
    // ── Edit session ────────────────────────────────────────────────
    /// Open a new object in front of the camera, committing any open
    /// session first.
    NewObject,

    /// Discard the object being edited.
    DeleteObject,

    /// Pick whatever is visible at a window position and apply it to the
    /// edit session.
    Pick {
        /// Horizontal cursor position in window pixels.
        x: f32,
        /// Vertical cursor position in window pixels (origin top-left).
        y: f32,
    },

    // ── Camera ──────────────────────────────────────────────────────
    /// Fly the camera along `(right, up, forward)` for `dt` seconds.
    MoveCamera {
        /// Movement direction in camera space.
        direction: Vec3,
        /// Elapsed time in seconds.
        dt: f32,
    },

    /// Turn the camera by `delta` pixels of mouse movement.
    LookCamera {
        /// Horizontal and vertical cursor delta.
        delta: Vec2,
    },

    // ── Application ─────────────────────────────────────────────────
    /// Recompile the scene and picking pipelines from shader sources.
    ReloadShaders,

    /// Ask the host event loop to shut down.
    Exit,
}
