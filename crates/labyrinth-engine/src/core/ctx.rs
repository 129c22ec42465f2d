use winit::window::Window;

use crate::device::WgpuGraphics;
use crate::drawer::Drawer;
use crate::input::{InputFrame, InputState};
use crate::time::FrameTime;

use super::app::AppControl;

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `WgpuGraphics<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub drawer: &'a mut Drawer<WgpuGraphics<'w>>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
}

impl FrameCtx<'_, '_> {
    /// Routes this frame's input through the drawer's key handling.
    pub fn handle_input(&mut self) -> AppControl {
        self.drawer.handle_input(self.input_frame)
    }
}
