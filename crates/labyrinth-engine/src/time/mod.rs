//! Frame timing.
//!
//! One `FrameClock` lives in the window runtime; `tick()` runs once per redraw
//! and the resulting `FrameTime` is handed to the app.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
