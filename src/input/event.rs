/// Platform-agnostic input events.
///
/// These are fed into an [`InputProcessor`](super::InputProcessor) which
/// converts them into [`EditorCommand`](crate::engine::EditorCommand)
/// values.
///
/// # Example
///
/// ```ignore
/// if let Some(cmd) = input_processor.handle_event(
///     InputEvent::MouseButton { button: MouseButton::Left, pressed: false },
/// ) {
///     engine.execute(cmd);
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to absolute window position (origin top-left).
    CursorMoved {
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Physical key pressed or released.
    Key {
        /// Key code string in `winit::keyboard::KeyCode` debug format,
        /// e.g. `"KeyN"`.
        code: String,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// The window lost focus; held keys and buttons are released.
    FocusLost,
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button: picking.
    Left,
    /// Secondary (right) mouse button: mouse look while held.
    Right,
    /// Middle mouse button (wheel click).
    Middle,
    /// Back, forward and vendor buttons; ignored by the editor.
    Other,
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Left => Self::Left,
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            winit::event::MouseButton::Back
            | winit::event::MouseButton::Forward
            | winit::event::MouseButton::Other(_) => Self::Other,
        }
    }
}
