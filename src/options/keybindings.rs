use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::KeyAction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Configurable keyboard bindings mapping actions to key codes.
pub struct KeybindingOptions {
    /// Maps action → key string (e.g. `NewObject` → `"KeyN"`).
    pub bindings: HashMap<KeyAction, String>,
    /// Reverse lookup cache (key string → action). Rebuilt on load.
    #[serde(skip)]
    key_to_action: HashMap<String, KeyAction>,
}

impl Default for KeybindingOptions {
    fn default() -> Self {
        let bindings = HashMap::from([
            (KeyAction::NewObject, "KeyN".into()),
            (KeyAction::DeleteObject, "Delete".into()),
            (KeyAction::ReloadShaders, "KeyP".into()),
            (KeyAction::Exit, "Escape".into()),
            (KeyAction::MoveForward, "KeyW".into()),
            (KeyAction::MoveBackward, "KeyS".into()),
            (KeyAction::MoveLeft, "KeyA".into()),
            (KeyAction::MoveRight, "KeyD".into()),
            (KeyAction::MoveUp, "Space".into()),
            (KeyAction::MoveDown, "ShiftLeft".into()),
        ]);

        let mut opts = Self {
            bindings,
            key_to_action: HashMap::new(),
        };
        opts.rebuild_reverse_map();
        opts
    }
}

impl KeybindingOptions {
    /// Rebuild the reverse lookup map (key string → action).
    pub fn rebuild_reverse_map(&mut self) {
        self.key_to_action.clear();
        for (action, key) in &self.bindings {
            let _ = self.key_to_action.insert(key.clone(), *action);
        }
    }

    /// Bind `action` to `key`. An action previously bound to the same key
    /// loses its binding, so every key maps to at most one action.
    pub fn rebind(&mut self, action: KeyAction, key: impl Into<String>) {
        let key = key.into();
        self.bindings.retain(|a, k| *a == action || *k != key);
        let _ = self.bindings.insert(action, key);
        self.rebuild_reverse_map();
    }

    /// Look up the action for a key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.key_to_action.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_both_ways() {
        let keys = KeybindingOptions::default();
        assert_eq!(keys.lookup("KeyN"), Some(KeyAction::NewObject));
        assert_eq!(keys.lookup("ShiftLeft"), Some(KeyAction::MoveDown));
        assert_eq!(keys.lookup("KeyZ"), None);
        assert_eq!(keys.bindings.len(), keys.key_to_action.len());
    }

    #[test]
    fn rebind_moves_the_key() {
        let mut keys = KeybindingOptions::default();
        keys.rebind(KeyAction::NewObject, "KeyB");
        assert_eq!(keys.lookup("KeyB"), Some(KeyAction::NewObject));
        assert_eq!(keys.lookup("KeyN"), None);
    }

    #[test]
    fn rebind_displaces_a_conflicting_action() {
        let mut keys = KeybindingOptions::default();
        keys.rebind(KeyAction::Exit, "KeyP");
        assert_eq!(keys.lookup("KeyP"), Some(KeyAction::Exit));
        assert!(!keys.bindings.contains_key(&KeyAction::ReloadShaders));
        assert_eq!(keys.lookup("Escape"), None);
    }
}
