//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single window, builds the drawer on it
//! and drives the app once per redraw.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
