//! Converts raw platform events into editor commands.
//!
//! The `InputProcessor` owns all transient input state (cursor position,
//! held buttons and keys) and the key-binding map. Discrete actions are
//! edge-triggered: they fire once when a key that was seen going down is
//! released. A left-button release after a press yields exactly one pick.

use std::collections::HashSet;

use glam::{Vec2, Vec3};

use super::event::{InputEvent, MouseButton};
use super::keyboard::KeyAction;
use crate::engine::command::EditorCommand;
use crate::options::KeybindingOptions;

/// Converts raw window events into [`EditorCommand`]s.
///
/// # Usage
///
/// ```ignore
/// // In the event loop:
/// if let Some(cmd) = input_processor.handle_event(event) {
///     engine.execute(cmd);
/// }
/// // Once per frame:
/// let direction = input_processor.movement();
/// ```
pub struct InputProcessor {
    /// Last cursor position in window pixels.
    cursor: Option<Vec2>,
    /// Whether the left button went down and has not been released.
    left_pressed: bool,
    /// Whether the right button is held (mouse look).
    right_pressed: bool,
    /// Discrete actions whose key is down.
    armed: HashSet<KeyAction>,
    /// Continuous actions whose key is down.
    held: HashSet<KeyAction>,
    /// Key string → action mapping.
    key_bindings: KeybindingOptions,
}

impl InputProcessor {
    /// Create a new processor with default key bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_bindings(KeybindingOptions::default())
    }

    /// Create a processor with custom key bindings.
    #[must_use]
    pub fn with_key_bindings(key_bindings: KeybindingOptions) -> Self {
        Self {
            cursor: None,
            left_pressed: false,
            right_pressed: false,
            armed: HashSet::new(),
            held: HashSet::new(),
            key_bindings,
        }
    }

    /// Current cursor position in window pixels.
    #[must_use]
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Whether mouse look is active.
    #[must_use]
    pub fn looking(&self) -> bool {
        self.right_pressed
    }

    /// Read-only access to the key bindings.
    #[must_use]
    pub fn key_bindings(&self) -> &KeybindingOptions {
        &self.key_bindings
    }

    /// Held movement as `(right, up, forward)`, each component in
    /// `{-1, 0, 1}`.
    #[must_use]
    pub fn movement(&self) -> Vec3 {
        let axis = |pos: KeyAction, neg: KeyAction| {
            f32::from(u8::from(self.held.contains(&pos)))
                - f32::from(u8::from(self.held.contains(&neg)))
        };
        Vec3::new(
            axis(KeyAction::MoveRight, KeyAction::MoveLeft),
            axis(KeyAction::MoveUp, KeyAction::MoveDown),
            axis(KeyAction::MoveForward, KeyAction::MoveBackward),
        )
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<EditorCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => self.handle_cursor_moved(x, y),
            InputEvent::MouseButton { button, pressed } => {
                self.handle_mouse_button(button, pressed)
            }
            InputEvent::Key { code, pressed } => self.handle_key(&code, pressed),
            InputEvent::FocusLost => {
                self.left_pressed = false;
                self.right_pressed = false;
                self.armed.clear();
                self.held.clear();
                None
            }
        }
    }

    /// Cursor moved: mouse look while the right button is held.
    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> Option<EditorCommand> {
        let pos = Vec2::new(x, y);
        let last = self.cursor.replace(pos);
        match last {
            Some(last) if self.right_pressed && pos != last => {
                Some(EditorCommand::LookCamera { delta: pos - last })
            }
            _ => None,
        }
    }

    fn handle_mouse_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
    ) -> Option<EditorCommand> {
        match button {
            MouseButton::Left if pressed => {
                self.left_pressed = true;
                None
            }
            MouseButton::Left => {
                if !std::mem::take(&mut self.left_pressed) {
                    return None;
                }
                let cursor = self.cursor?;
                Some(EditorCommand::Pick {
                    x: cursor.x,
                    y: cursor.y,
                })
            }
            MouseButton::Right => {
                self.right_pressed = pressed;
                None
            }
            MouseButton::Middle | MouseButton::Other => None,
        }
    }

    fn handle_key(&mut self, code: &str, pressed: bool) -> Option<EditorCommand> {
        let action = self.key_bindings.lookup(code)?;
        let set = if action.is_held() {
            &mut self.held
        } else {
            &mut self.armed
        };
        if pressed {
            let _ = set.insert(action);
            return None;
        }
        let was_down = set.remove(&action);
        if !was_down || action.is_held() {
            return None;
        }
        match action {
            KeyAction::NewObject => Some(EditorCommand::NewObject),
            KeyAction::DeleteObject => Some(EditorCommand::DeleteObject),
            KeyAction::ReloadShaders => Some(EditorCommand::ReloadShaders),
            KeyAction::Exit => Some(EditorCommand::Exit),
            _ => None,
        }
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: &str, pressed: bool) -> InputEvent {
        InputEvent::Key {
            code: code.into(),
            pressed,
        }
    }

    fn button(button: MouseButton, pressed: bool) -> InputEvent {
        InputEvent::MouseButton { button, pressed }
    }

    #[test]
    fn test_discrete_action_fires_on_release() {
        let mut input = InputProcessor::new();
        assert_eq!(input.handle_event(key("KeyN", true)), None);
        // key repeat does not re-fire
        assert_eq!(input.handle_event(key("KeyN", true)), None);
        assert_eq!(
            input.handle_event(key("KeyN", false)),
            Some(EditorCommand::NewObject)
        );
        assert_eq!(input.handle_event(key("KeyN", false)), None);
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut input = InputProcessor::new();
        assert_eq!(input.handle_event(key("Escape", false)), None);
        assert_eq!(input.handle_event(key("KeyZ", true)), None);
    }

    #[test]
    fn test_left_release_picks_once() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(InputEvent::CursorMoved { x: 10.0, y: 20.0 });
        assert_eq!(input.handle_event(button(MouseButton::Left, true)), None);
        assert_eq!(
            input.handle_event(button(MouseButton::Left, false)),
            Some(EditorCommand::Pick { x: 10.0, y: 20.0 })
        );
        assert_eq!(input.handle_event(button(MouseButton::Left, false)), None);
    }

    #[test]
    fn test_right_drag_looks() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(InputEvent::CursorMoved { x: 0.0, y: 0.0 });
        assert_eq!(
            input.handle_event(InputEvent::CursorMoved { x: 5.0, y: 0.0 }),
            None
        );
        let _ = input.handle_event(button(MouseButton::Right, true));
        assert_eq!(
            input.handle_event(InputEvent::CursorMoved { x: 8.0, y: -2.0 }),
            Some(EditorCommand::LookCamera {
                delta: Vec2::new(3.0, -2.0)
            })
        );
    }

    #[test]
    fn test_movement_tracks_held_keys() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(key("KeyW", true));
        let _ = input.handle_event(key("KeyA", true));
        assert_eq!(input.movement(), Vec3::new(-1.0, 0.0, 1.0));
        // held actions never produce commands
        assert_eq!(input.handle_event(key("KeyW", false)), None);
        assert_eq!(input.movement(), Vec3::new(-1.0, 0.0, 0.0));
        let _ = input.handle_event(InputEvent::FocusLost);
        assert_eq!(input.movement(), Vec3::ZERO);
    }
}
