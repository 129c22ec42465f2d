use std::fmt;

/// Keyboard key identifier.
///
/// Physical keys the viewer binds to. Keys without a variant map to
/// `Key::Unknown` carrying the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        /// True when the event is an auto-repeat of a held key.
        repeat: bool,
    },

    /// The user asked to close the window.
    CloseRequested,

    Focused(bool),
}

impl InputEvent {
    /// The key of a fresh (non-repeat) press.
    pub fn pressed_key(&self) -> Option<Key> {
        match *self {
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                repeat: false,
            } => Some(key),
            _ => None,
        }
    }
}
