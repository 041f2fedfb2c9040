//! Keyboard input as seen by the controller.

use gw_core::Action;

/// A physical key.  Only the arrows and space mean anything to the task;
/// everything else arrives as `Other` and is ignored.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Other(u32),
}

impl Key {
    /// Map a DOM-style key code (37–40 arrows, 32 space).
    pub fn from_key_code(code: u32) -> Key {
        match code {
            37 => Key::ArrowLeft,
            38 => Key::ArrowUp,
            39 => Key::ArrowRight,
            40 => Key::ArrowDown,
            32 => Key::Space,
            other => Key::Other(other),
        }
    }

    /// The action this key requests.  Space means wait only on grids that
    /// allow waiting.
    pub fn action(self, include_wait: bool) -> Option<Action> {
        match self {
            Key::ArrowUp    => Some(Action::Up),
            Key::ArrowDown  => Some(Action::Down),
            Key::ArrowLeft  => Some(Action::Left),
            Key::ArrowRight => Some(Action::Right),
            Key::Space if include_wait => Some(Action::Wait),
            _ => None,
        }
    }

    /// The key that produces `action`.
    pub fn for_action(action: Action) -> Key {
        match action {
            Action::Up    => Key::ArrowUp,
            Action::Down  => Key::ArrowDown,
            Action::Left  => Key::ArrowLeft,
            Action::Right => Key::ArrowRight,
            Action::Wait  => Key::Space,
        }
    }
}
