//! In-memory [`Graphics`] backend.
//!
//! Every command is appended to a call log that tests (and headless tools) can
//! inspect. Shaders use a line-based declaration format instead of a real
//! shading language:
//!
//! ```text
//! uniform MVPMatrix
//! in in_position
//! error unexpected token
//! ```
//!
//! `uniform` and `in` declare names visible to uniform/attribute lookup after
//! linking; any `error` line makes the compile fail with that message.

use std::collections::HashMap;

use super::{
    AttribLocation, AttribPointer, BufferId, BufferTarget, Capabilities, CapturedFrame, ClearMask,
    ColorMask, Compiled, DeviceInfo, DrawTarget, FramebufferId, Graphics, IndexSource, ProgramId,
    RenderbufferId, ShaderId, ShaderStage, TextureDesc, TextureId, TextureKind, UniformLocation,
    UniformValue, VertexSource, Viewport,
};

/// Owned copy of an uploaded uniform value.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedUniform {
    Mat4([f32; 16]),
    Vec2Array(Vec<[f32; 2]>),
    IVec2([i32; 2]),
}

impl From<UniformValue<'_>> for RecordedUniform {
    fn from(value: UniformValue<'_>) -> Self {
        match value {
            UniformValue::Mat4(m) => RecordedUniform::Mat4(*m),
            UniformValue::Vec2Array(v) => RecordedUniform::Vec2Array(v.to_vec()),
            UniformValue::IVec2(v) => RecordedUniform::IVec2(v),
        }
    }
}

/// State snapshot taken at each draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub program: Option<ProgramId>,
    pub target: DrawTarget,
    pub texture: Option<TextureId>,
    pub count: u32,
    /// Indices came from host memory rather than a bound buffer.
    pub host_indices: bool,
    pub viewport: Viewport,
    pub color_mask: ColorMask,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CompileShader {
        shader: ShaderId,
        stage: ShaderStage,
        ok: bool,
    },
    LinkProgram {
        program: ProgramId,
        vertex: ShaderId,
        fragment: ShaderId,
        ok: bool,
    },
    UseProgram(ProgramId),
    Uniform {
        program: ProgramId,
        name: String,
        value: RecordedUniform,
    },
    CreateBuffer {
        buffer: BufferId,
        target: BufferTarget,
        len: usize,
    },
    DeleteBuffer(BufferId),
    BindBuffer {
        target: BufferTarget,
        buffer: Option<BufferId>,
    },
    AttribPointer {
        name: String,
        pointer: AttribPointer,
        host: bool,
    },
    EnableAttrib(String),
    Draw(DrawRecord),
    CreateTexture {
        texture: TextureId,
        desc: TextureDesc,
        uploaded: bool,
    },
    BindTexture(Option<TextureId>),
    CreateFramebuffer(FramebufferId),
    CreateDepthBuffer {
        depth: RenderbufferId,
        width: u32,
        height: u32,
    },
    AttachColor {
        framebuffer: FramebufferId,
        texture: TextureId,
    },
    AttachDepth {
        framebuffer: FramebufferId,
        depth: RenderbufferId,
    },
    BindFramebuffer(DrawTarget),
    Clear(ClearMask),
    ColorMask(ColorMask),
    Viewport(Viewport),
    DepthMask(bool),
    RequestCapture,
    Present,
}

#[derive(Debug, Default)]
struct ShaderDecl {
    uniforms: Vec<String>,
    inputs: Vec<String>,
    error: Option<String>,
}

#[derive(Debug, Default)]
struct ProgramDecl {
    uniforms: Vec<String>,
    inputs: Vec<String>,
}

/// Graphics backend that records commands instead of executing them.
#[derive(Debug)]
pub struct RecordingGraphics {
    calls: Vec<Call>,
    size: [u32; 2],
    capabilities: Capabilities,

    next_id: u32,
    shaders: HashMap<ShaderId, ShaderDecl>,
    programs: HashMap<ProgramId, ProgramDecl>,
    color_attachments: HashMap<FramebufferId, TextureId>,

    program: Option<ProgramId>,
    target: DrawTarget,
    texture: Option<TextureId>,
    viewport: Viewport,
    color_mask: ColorMask,
    capture_requested: bool,
}

impl RecordingGraphics {
    /// Creates a backend whose window is `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            calls: Vec::new(),
            size: [width, height],
            capabilities: Capabilities {
                vertex_buffers: true,
            },
            next_id: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            color_attachments: HashMap::new(),
            program: None,
            target: DrawTarget::Window,
            texture: None,
            viewport: Viewport::full([width, height]),
            color_mask: ColorMask::ALL,
            capture_requested: false,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Drains the call log.
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawRecord> {
        self.calls.iter().filter_map(|c| match c {
            Call::Draw(d) => Some(d),
            _ => None,
        })
    }

    /// Uniform uploads named `name`, in order.
    pub fn uniform_uploads<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a RecordedUniform> + 'a {
        self.calls.iter().filter_map(move |c| match c {
            Call::Uniform { name: n, value, .. } if n == name => Some(value),
            _ => None,
        })
    }

    /// Color image attached to `framebuffer`, if any.
    pub fn color_attachment(&self, framebuffer: FramebufferId) -> Option<TextureId> {
        self.color_attachments.get(&framebuffer).copied()
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.program
    }

    fn next<T>(&mut self, make: fn(u32) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        make(id)
    }

    fn uniform_name(&self, location: UniformLocation) -> Option<(ProgramId, &str)> {
        let program = self.program?;
        let decl = self.programs.get(&program)?;
        decl.uniforms
            .get(location.raw() as usize)
            .map(|n| (program, n.as_str()))
    }

    fn attrib_name(&self, location: AttribLocation) -> String {
        self.program
            .and_then(|p| self.programs.get(&p))
            .and_then(|d| d.inputs.get(location.raw() as usize))
            .cloned()
            .unwrap_or_else(|| format!("#{}", location.raw()))
    }
}

fn parse_declarations(source: &str) -> ShaderDecl {
    let mut decl = ShaderDecl::default();
    for line in source.lines().map(str::trim) {
        if let Some(name) = line.strip_prefix("uniform ") {
            decl.uniforms.push(name.trim().to_owned());
        } else if let Some(name) = line.strip_prefix("in ") {
            decl.inputs.push(name.trim().to_owned());
        } else if let Some(msg) = line.strip_prefix("error ") {
            decl.error = Some(msg.trim().to_owned());
        }
    }
    decl
}

fn push_unique(into: &mut Vec<String>, names: &[String]) {
    for n in names {
        if !into.contains(n) {
            into.push(n.clone());
        }
    }
}

impl Graphics for RecordingGraphics {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Compiled<ShaderId> {
        let shader = self.next(ShaderId::from_raw);
        let decl = parse_declarations(source);
        let error = decl.error.clone();
        self.shaders.insert(shader, decl);
        self.calls.push(Call::CompileShader {
            shader,
            stage,
            ok: error.is_none(),
        });

        match error {
            None => Compiled::ok(shader),
            Some(msg) => Compiled::failed(shader, format!("0:1: error: {msg}")),
        }
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Compiled<ProgramId> {
        let program = self.next(ProgramId::from_raw);

        let mut decl = ProgramDecl::default();
        let mut problems = Vec::new();
        for shader in [vertex, fragment] {
            match self.shaders.get(&shader) {
                Some(s) if s.error.is_none() => {
                    push_unique(&mut decl.uniforms, &s.uniforms);
                    push_unique(&mut decl.inputs, &s.inputs);
                }
                Some(_) => problems.push(format!("{shader} is not compiled")),
                None => problems.push(format!("{shader} does not exist")),
            }
        }

        let ok = problems.is_empty();
        if ok {
            self.programs.insert(program, decl);
        }
        self.calls.push(Call::LinkProgram {
            program,
            vertex,
            fragment,
            ok,
        });

        if ok {
            Compiled::ok(program)
        } else {
            Compiled::failed(program, problems.join("\n"))
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        self.program = Some(program);
        self.calls.push(Call::UseProgram(program));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let decl = self.programs.get(&program)?;
        decl.uniforms
            .iter()
            .position(|n| n == name)
            .map(|i| UniformLocation::from_raw(i as u32))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue<'_>) {
        let Some((program, name)) = self.uniform_name(location) else { return };
        let name = name.to_owned();
        self.calls.push(Call::Uniform {
            program,
            name,
            value: value.into(),
        });
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        let decl = self.programs.get(&program)?;
        decl.inputs
            .iter()
            .position(|n| n == name)
            .map(|i| AttribLocation::from_raw(i as u32))
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferId {
        let buffer = self.next(BufferId::from_raw);
        self.calls.push(Call::CreateBuffer {
            buffer,
            target,
            len: data.len(),
        });
        buffer
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        self.calls.push(Call::BindBuffer { target, buffer });
    }

    fn vertex_attrib_pointer(
        &mut self,
        location: AttribLocation,
        pointer: AttribPointer,
        source: VertexSource<'_>,
    ) {
        let name = self.attrib_name(location);
        self.calls.push(Call::AttribPointer {
            name,
            pointer,
            host: matches!(source, VertexSource::Host(_)),
        });
    }

    fn enable_vertex_attrib(&mut self, location: AttribLocation) {
        let name = self.attrib_name(location);
        self.calls.push(Call::EnableAttrib(name));
    }

    fn draw_elements(&mut self, count: u32, indices: IndexSource<'_>) {
        self.calls.push(Call::Draw(DrawRecord {
            program: self.program,
            target: self.target,
            texture: self.texture,
            count,
            host_indices: matches!(indices, IndexSource::Host(_)),
            viewport: self.viewport,
            color_mask: self.color_mask,
        }));
    }

    fn create_texture(&mut self, desc: TextureDesc, rgb: Option<&[f32]>) -> TextureId {
        let texture = self.next(TextureId::from_raw);
        self.calls.push(Call::CreateTexture {
            texture,
            desc,
            uploaded: rgb.is_some(),
        });
        texture
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.texture = texture;
        self.calls.push(Call::BindTexture(texture));
    }

    fn create_framebuffer(&mut self) -> FramebufferId {
        let framebuffer = self.next(FramebufferId::from_raw);
        self.calls.push(Call::CreateFramebuffer(framebuffer));
        framebuffer
    }

    fn create_depth_buffer(&mut self, width: u32, height: u32) -> RenderbufferId {
        let depth = self.next(RenderbufferId::from_raw);
        self.calls.push(Call::CreateDepthBuffer {
            depth,
            width,
            height,
        });
        depth
    }

    fn attach_color(&mut self, framebuffer: FramebufferId, texture: TextureId) {
        self.color_attachments.insert(framebuffer, texture);
        self.calls.push(Call::AttachColor {
            framebuffer,
            texture,
        });
    }

    fn attach_depth(&mut self, framebuffer: FramebufferId, depth: RenderbufferId) {
        self.calls.push(Call::AttachDepth { framebuffer, depth });
    }

    fn bind_framebuffer(&mut self, target: DrawTarget) {
        self.target = target;
        self.calls.push(Call::BindFramebuffer(target));
    }

    fn clear(&mut self, mask: ClearMask) {
        self.calls.push(Call::Clear(mask));
    }

    fn color_mask(&mut self, mask: ColorMask) {
        self.color_mask = mask;
        self.calls.push(Call::ColorMask(mask));
    }

    fn viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.calls.push(Call::Viewport(viewport));
    }

    fn depth_mask(&mut self, write: bool) {
        self.calls.push(Call::DepthMask(write));
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            version: "recording 1.0".to_owned(),
            shading_language: "declarations".to_owned(),
            renderer: "RecordingGraphics".to_owned(),
            vendor: "labyrinth".to_owned(),
            extensions: vec!["vertex_buffers".to_owned()],
        }
    }

    fn request_capture(&mut self) {
        self.capture_requested = true;
        self.calls.push(Call::RequestCapture);
    }

    fn present(&mut self) -> Option<CapturedFrame> {
        self.calls.push(Call::Present);
        if !std::mem::take(&mut self.capture_requested) {
            return None;
        }
        let [width, height] = self.size;
        Some(CapturedFrame {
            width,
            height,
            rgb: vec![0.0; (width * height * 3) as usize],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_compile_still_returns_handle() {
        let mut g = RecordingGraphics::new(4, 4);
        let out = g.compile_shader(ShaderStage::Fragment, "error missing semicolon");
        assert!(out.log.as_deref().unwrap().contains("missing semicolon"));
        assert!(matches!(g.calls()[0], Call::CompileShader { ok: false, .. }));
    }

    #[test]
    fn link_merges_declarations_of_both_stages() {
        let mut g = RecordingGraphics::new(4, 4);
        let vs = g.compile_shader(ShaderStage::Vertex, "uniform MVPMatrix\nin in_position").handle;
        let fs = g.compile_shader(ShaderStage::Fragment, "uniform screen_size").handle;
        let p = g.link_program(vs, fs);
        assert!(p.log.is_none());
        assert!(g.uniform_location(p.handle, "MVPMatrix").is_some());
        assert!(g.uniform_location(p.handle, "screen_size").is_some());
        assert!(g.attrib_location(p.handle, "in_position").is_some());
        assert!(g.uniform_location(p.handle, "MVMatrix").is_none());
    }

    #[test]
    fn link_with_broken_shader_reports_log() {
        let mut g = RecordingGraphics::new(4, 4);
        let vs = g.compile_shader(ShaderStage::Vertex, "error bad").handle;
        let fs = g.compile_shader(ShaderStage::Fragment, "").handle;
        let p = g.link_program(vs, fs);
        assert!(p.log.is_some());
        assert!(g.uniform_location(p.handle, "anything").is_none());
    }

    #[test]
    fn capture_is_returned_by_the_next_present_only() {
        let mut g = RecordingGraphics::new(2, 3);
        assert!(g.present().is_none());
        g.request_capture();
        let frame = g.present().unwrap();
        assert_eq!((frame.width, frame.height), (2, 3));
        assert_eq!(frame.rgb.len(), 18);
        assert!(g.present().is_none());
    }
}
