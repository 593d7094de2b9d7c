use serde::{Deserialize, Serialize};

/// Editor actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML files stay readable:
/// ```toml
/// [keybindings.bindings]
/// new_object = "KeyN"
/// reload_shaders = "KeyP"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Open a new object in front of the camera.
    NewObject,
    /// Discard the object being edited.
    DeleteObject,
    /// Recompile the render and picking pipelines.
    ReloadShaders,
    /// Close the editor.
    Exit,
    /// Fly forward while held.
    MoveForward,
    /// Fly backward while held.
    MoveBackward,
    /// Strafe left while held.
    MoveLeft,
    /// Strafe right while held.
    MoveRight,
    /// Rise while held.
    MoveUp,
    /// Sink while held.
    MoveDown,
}

impl KeyAction {
    /// Whether the action is continuous (acts every frame while held)
    /// rather than firing once on release.
    #[must_use]
    pub const fn is_held(self) -> bool {
        matches!(
            self,
            Self::MoveForward
                | Self::MoveBackward
                | Self::MoveLeft
                | Self::MoveRight
                | Self::MoveUp
                | Self::MoveDown
        )
    }
}
