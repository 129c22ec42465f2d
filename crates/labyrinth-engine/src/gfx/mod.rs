//! Graphics command seam.
//!
//! Everything the rendering core does on the GPU goes through [`Graphics`]: a
//! single ordered command stream with bind-then-draw state semantics. Commands
//! take effect in submission order, so a draw that samples a render target
//! observes every earlier draw into that target.
//!
//! Backends:
//! - [`crate::device::WgpuGraphics`] records the stream and encodes it with wgpu
//! - [`recording::RecordingGraphics`] keeps the stream in memory (tests, headless tooling)

pub mod recording;
mod types;

pub use types::{
    AttribLocation, AttribPointer, BufferId, BufferTarget, Capabilities, CapturedFrame, ClearMask,
    ColorMask, Compiled, DeviceInfo, DrawTarget, FramebufferId, IndexSource, ProgramId,
    RenderbufferId, ShaderId, ShaderStage, TextureDesc, TextureId, TextureKind, UniformLocation,
    UniformValue, VertexSource, Viewport,
};

/// Single-stream graphics command interface.
///
/// Compile and link never fail hard: the handle is returned together with the
/// diagnostic, and a broken program simply produces no output when drawn with.
pub trait Graphics {
    // ── shaders / programs ────────────────────────────────────────────────

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Compiled<ShaderId>;

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Compiled<ProgramId>;

    /// Makes `program` the program used by subsequent draws and uniform uploads.
    fn use_program(&mut self, program: ProgramId);

    /// Resolves a uniform declared by `program`; `None` when it is not declared.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Uploads a value to a slot of the program in use.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue<'_>);

    /// Resolves a vertex input declared by `program`; `None` when it is not declared.
    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation>;

    // ── buffers / draws ───────────────────────────────────────────────────

    /// Creates a buffer filled with `data`. The new buffer is left bound to `target`.
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferId;

    fn delete_buffer(&mut self, buffer: BufferId);

    /// Binds `buffer` to `target`; `None` unbinds.
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>);

    fn vertex_attrib_pointer(
        &mut self,
        location: AttribLocation,
        pointer: AttribPointer,
        source: VertexSource<'_>,
    );

    fn enable_vertex_attrib(&mut self, location: AttribLocation);

    /// Draws `count` indices as a triangle list with the current state.
    fn draw_elements(&mut self, count: u32, indices: IndexSource<'_>);

    // ── textures / framebuffers ───────────────────────────────────────────

    /// Creates a texture. `rgb` holds float RGB texels for sampled images; when
    /// `None` the storage is only allocated.
    fn create_texture(&mut self, desc: TextureDesc, rgb: Option<&[f32]>) -> TextureId;

    /// Binds the texture sampled by the program in use; `None` unbinds.
    fn bind_texture(&mut self, texture: Option<TextureId>);

    fn create_framebuffer(&mut self) -> FramebufferId;

    fn create_depth_buffer(&mut self, width: u32, height: u32) -> RenderbufferId;

    fn attach_color(&mut self, framebuffer: FramebufferId, texture: TextureId);

    fn attach_depth(&mut self, framebuffer: FramebufferId, depth: RenderbufferId);

    fn bind_framebuffer(&mut self, target: DrawTarget);

    // ── fixed-function state ──────────────────────────────────────────────

    fn clear(&mut self, mask: ClearMask);

    fn color_mask(&mut self, mask: ColorMask);

    fn viewport(&mut self, viewport: Viewport);

    fn depth_mask(&mut self, write: bool);

    // ── device ────────────────────────────────────────────────────────────

    fn capabilities(&self) -> Capabilities;

    fn info(&self) -> DeviceInfo;

    /// Asks for the window contents of an upcoming present to be read back.
    fn request_capture(&mut self);

    /// Submits the recorded frame and shows it.
    ///
    /// Returns a captured frame once a requested read-back has completed.
    fn present(&mut self) -> Option<CapturedFrame>;
}
