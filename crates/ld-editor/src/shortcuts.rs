//! Editor keyboard bindings.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. On macOS
//! `meta` is ⌘; on other platforms `ctrl` serves the same role.

use crate::input::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Delete,
    Duplicate,
    SelectAll,
    Deselect,
    ZoomIn,
    ZoomOut,
    /// Back to 100%.
    ZoomReset,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Look up the binding for a key press.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"d"`, `"Delete"`).
    /// Unbound combos give `None`; command combos never fall through to the
    /// plain bindings.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
