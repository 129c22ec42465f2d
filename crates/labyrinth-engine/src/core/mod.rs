//! Core application contracts.
//!
//! This module defines the interface between the window runtime and the
//! application driving the drawer, plus the per-frame context handed to it.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
