//! Labyrinth rendering core.
//!
//! The [`drawer::Drawer`] context owns render state for a first-person maze
//! viewer: shader programs, mesh drawing, two ping-pong render targets with a
//! chain of full-screen post-processing passes, uniform binding, stereo 3D
//! and key-driven diagnostics. GPU work goes through the [`gfx::Graphics`]
//! seam; [`device::WgpuGraphics`] implements it on wgpu and [`window::Runtime`]
//! hosts it in a winit window.

pub mod assets;
pub mod config;
pub mod core;
pub mod device;
pub mod diagnostics;
pub mod drawer;
pub mod gfx;
pub mod input;
pub mod logging;
pub mod mesh;
pub mod postprocess;
pub mod shader;
pub mod stereo;
pub mod target;
pub mod time;
pub mod uniforms;
pub mod window;
