use std::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

handle!(
    /// Single compiled shader stage.
    ShaderId
);
handle!(
    /// Linked vertex + fragment program.
    ProgramId
);
handle!(
    /// GPU-resident vertex or index buffer.
    BufferId
);
handle!(
    /// Sampled image or render-target color image.
    TextureId
);
handle!(
    /// Offscreen framebuffer (color + depth attachments).
    FramebufferId
);
handle!(
    /// Depth storage attached to a framebuffer.
    RenderbufferId
);
handle!(
    /// Uniform slot inside a program, resolved by name.
    UniformLocation
);
handle!(
    /// Vertex input slot inside a program, resolved by name.
    AttribLocation
);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Result of a compile or link step.
///
/// The handle is always returned; `log` carries the backend diagnostic when the
/// step failed. A failed handle stays usable as an identifier but draws nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled<T> {
    pub handle: T,
    pub log: Option<String>,
}

impl<T> Compiled<T> {
    pub fn ok(handle: T) -> Self {
        Self { handle, log: None }
    }

    pub fn failed(handle: T, log: impl Into<String>) -> Self {
        Self {
            handle,
            log: Some(log.into()),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// Interleaved attribute description, in bytes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttribPointer {
    /// Number of `f32` components (2 or 3).
    pub components: u32,
    pub stride: u32,
    pub offset: u32,
}

/// Where vertex data for an attribute comes from.
#[derive(Debug, Copy, Clone)]
pub enum VertexSource<'a> {
    /// The currently bound vertex buffer; `offset` is relative to its start.
    Bound,
    /// Host memory; `offset` is relative to the slice start.
    Host(&'a [f32]),
}

/// Where index data for a draw comes from.
#[derive(Debug, Copy, Clone)]
pub enum IndexSource<'a> {
    Bound,
    Host(&'a [u32]),
}

/// Value uploaded to a uniform slot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue<'a> {
    /// Column-major 4x4 matrix.
    Mat4(&'a [f32; 16]),
    Vec2Array(&'a [[f32; 2]]),
    IVec2([i32; 2]),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureKind {
    /// Filtered, repeating image sampled by shaders.
    Sampled,
    /// Floating-point color image rendered into and read back by later passes.
    RenderTarget,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub kind: TextureKind,
}

/// Destination of draw and clear commands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawTarget {
    /// The visible window surface.
    Window,
    Framebuffer(FramebufferId),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: Self = Self { color: true, depth: false };
    pub const DEPTH: Self = Self { color: false, depth: true };
    pub const ALL: Self = Self { color: true, depth: true };
}

/// Per-channel color write enables.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ColorMask {
    pub r: bool,
    pub g: bool,
    pub b: bool,
    pub a: bool,
}

impl ColorMask {
    pub const ALL: Self = Self { r: true, g: true, b: true, a: true };
    pub const RED: Self = Self { r: true, g: false, b: false, a: false };
    pub const GREEN_BLUE: Self = Self { r: false, g: true, b: true, a: false };
}

impl Default for ColorMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Viewport rectangle in physical pixels, origin top-left.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub const fn full(size: [u32; 2]) -> Self {
        Self::new(0, 0, size[0], size[1])
    }
}

/// Backend capabilities queried once at init.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Capabilities {
    /// GPU-resident vertex/index buffers are available.
    pub vertex_buffers: bool,
}

/// Human-readable description of the device, written by the info dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceInfo {
    pub version: String,
    pub shading_language: String,
    pub renderer: String,
    pub vendor: String,
    pub extensions: Vec<String>,
}

/// Window contents read back after a present, as float RGB rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<f32>,
}
