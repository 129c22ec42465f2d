use crate::core::AppControl;
use crate::gfx::Graphics;
use crate::input::{InputFrame, Key};

use super::Drawer;

impl<G: Graphics> Drawer<G> {
    /// Dispatches the frame's key presses in arrival order.
    ///
    /// Returns `Exit` on a close request or the quit key; presses after a quit
    /// are not processed.
    pub fn handle_input(&mut self, frame: &InputFrame) -> AppControl {
        if frame.close_requested() {
            return AppControl::Exit;
        }
        for key in frame.presses() {
            if self.handle_key(key) == AppControl::Exit {
                return AppControl::Exit;
            }
        }
        AppControl::Continue
    }

    /// Handles one key press.
    ///
    /// Keys bound to the drawer take precedence over pass toggles.
    pub fn handle_key(&mut self, key: Key) -> AppControl {
        let keys = self.config.keys;

        if key == keys.quit {
            return AppControl::Exit;
        }

        if key == keys.cycle_stereo {
            self.stereo = self.stereo.next();
            log::info!("stereo mode: {}", self.stereo);
        } else if key == keys.write_info {
            self.write_info();
        } else if key == keys.screenshot {
            self.request_screenshot();
        } else {
            self.passes.toggle_key(key);
        }

        AppControl::Continue
    }
}
