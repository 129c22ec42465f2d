use anyhow::Result;

use crate::device::WgpuGraphics;
use crate::drawer::Drawer;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once after the drawer is created, before the first frame.
    ///
    /// An error stops the runtime and is returned from `Runtime::run`.
    fn init(&mut self, drawer: &mut Drawer<WgpuGraphics<'_>>) -> Result<()> {
        let _ = drawer;
        Ok(())
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
