use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState};

/// Held keys and focus for the window.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies `ev` to the held state and appends it to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered while unfocused.
                    self.keys_down.clear();
                }
            }
            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    self.keys_down.insert(*key);
                }
                KeyState::Released => {
                    self.keys_down.remove(key);
                }
            },
            InputEvent::CloseRequested => {}
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key { key, state, repeat }
    }

    #[test]
    fn presses_keep_order_and_skip_repeats() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        for ev in [
            key(Key::B, KeyState::Pressed, false),
            key(Key::B, KeyState::Pressed, true),
            key(Key::B, KeyState::Released, false),
            key(Key::I, KeyState::Pressed, false),
            key(Key::B, KeyState::Pressed, false),
        ] {
            state.apply_event(&mut frame, ev);
        }

        assert_eq!(frame.presses().collect::<Vec<_>>(), vec![Key::B, Key::I, Key::B]);
        assert!(state.key_down(Key::B));
        assert!(state.key_down(Key::I));
    }

    #[test]
    fn focus_loss_releases_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed, false));
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(!state.key_down(Key::W));
    }

    #[test]
    fn close_request_is_visible_in_frame() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        assert!(!frame.close_requested());
        state.apply_event(&mut frame, InputEvent::CloseRequested);
        assert!(frame.close_requested());
        frame.clear();
        assert!(!frame.close_requested());
    }
}
