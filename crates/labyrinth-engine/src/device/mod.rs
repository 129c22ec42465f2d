//! wgpu backend for the graphics command seam.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue and the window surface
//! - compiling WGSL with naga and reflecting the named interface of each stage
//! - recording the frame's command stream into render passes
//! - encoding, submitting and presenting the frame, with optional read-back

mod arena;
mod context;
mod frame;
mod graphics;
mod init;
mod pipeline;
mod readback;
mod reflect;
mod resources;
mod surface;
mod uniform;

pub use graphics::WgpuGraphics;
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
