//! Drawer configuration.

use std::path::PathBuf;

use glam::Mat4;

use crate::assets::Assets;
use crate::input::Key;

/// Perspective projection, fixed for the lifetime of the drawer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 90.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    /// Projection matrix for a `width` x `height` screen.
    pub fn matrix(&self, size: [u32; 2]) -> Mat4 {
        let aspect = size[0] as f32 / size[1].max(1) as f32;
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }
}

/// Keys handled by the drawer itself. Any other key toggles the post-process
/// passes registered on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub quit: Key,
    pub cycle_stereo: Key,
    pub write_info: Key,
    pub screenshot: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: Key::Escape,
            cycle_stereo: Key::R,
            write_info: Key::F5,
            screenshot: Key::F12,
        }
    }
}

/// Where screenshots are written: `<directory>/<prefix><n>.<extension>`.
///
/// The image format follows the extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotConfig {
    pub directory: PathBuf,
    pub prefix: String,
    pub extension: String,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            prefix: "Screenshot".to_string(),
            extension: "jpg".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DrawerConfig {
    pub projection: Projection,
    pub keys: KeyBindings,
    pub assets: Assets,
    /// Target of the device info dump.
    pub diagnostics_path: PathBuf,
    pub screenshot: ScreenshotConfig,
    /// Promote meshes to GPU buffers when the backend supports it.
    pub resident_buffers: bool,
    /// Vertex shader shared by every post-process pass.
    pub pp_vertex: String,
    /// Fragment shader of the pass used when no pass is enabled.
    pub pp_fragment: String,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            keys: KeyBindings::default(),
            assets: Assets::default(),
            diagnostics_path: PathBuf::from("glinfo.txt"),
            screenshot: ScreenshotConfig::default(),
            resident_buffers: true,
            pp_vertex: "pp.vert.wgsl".to_string(),
            pp_fragment: "pp.frag.wgsl".to_string(),
        }
    }
}
