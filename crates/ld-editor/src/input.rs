//! Input abstraction layer.
//!
//! Normalizes pointer, wheel and keyboard events from the host into a
//! unified `InputEvent` enum. Pointer coordinates are in screen space
//! (container pixels); the editor maps them to canvas space.

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    /// Shift, Ctrl or Meta toggles membership instead of replacing the
    /// selection.
    pub fn additive(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Platform command key: ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64, modifiers: Modifiers },
    PointerMove { x: f64, y: f64, modifiers: Modifiers },
    PointerUp { x: f64, y: f64, modifiers: Modifiers },
    DoubleClick { x: f64, y: f64 },

    /// Wheel scroll; `delta_y > 0` scrolls down (zooms out).
    Wheel { x: f64, y: f64, delta_y: f64 },

    /// `key` is the DOM `KeyboardEvent.key` value (e.g. `"d"`, `"Delete"`).
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.to_owned(),
            modifiers,
        }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::DoubleClick { x, y }
            | Self::Wheel { x, y, .. } => Some((*x, *y)),
            Self::Key { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_modifiers() {
        assert!(!Modifiers::NONE.additive());
        assert!(Modifiers::SHIFT.additive());
        assert!(
            Modifiers {
                meta: true,
                ..Modifiers::NONE
            }
            .additive()
        );
        assert!(
            !Modifiers {
                alt: true,
                ..Modifiers::NONE
            }
            .additive()
        );
    }

    #[test]
    fn position_of_events() {
        assert_eq!(InputEvent::down(1.0, 2.0).position(), Some((1.0, 2.0)));
        assert_eq!(InputEvent::key("a", Modifiers::NONE).position(), None);
    }
}
