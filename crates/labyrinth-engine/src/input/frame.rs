use super::types::{InputEvent, Key};

/// Input received since the previous frame.
#[derive(Debug, Default, Clone)]
pub struct InputFrame {
    /// Events in arrival order.
    pub events: Vec<InputEvent>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    /// Fresh key presses in arrival order. A key pressed twice appears twice.
    pub fn presses(&self) -> impl Iterator<Item = Key> + '_ {
        self.events.iter().filter_map(InputEvent::pressed_key)
    }

    pub fn close_requested(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, InputEvent::CloseRequested))
    }
}
