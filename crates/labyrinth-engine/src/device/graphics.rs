use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::NonZeroU64;

use anyhow::Result;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::gfx::{
    AttribLocation, AttribPointer, BufferId, BufferTarget, Capabilities, CapturedFrame, ClearMask,
    ColorMask, Compiled, DeviceInfo, DrawTarget, FramebufferId, Graphics, IndexSource, ProgramId,
    RenderbufferId, ShaderId, ShaderStage, TextureDesc, TextureId, TextureKind, UniformLocation,
    UniformValue, VertexSource, Viewport,
};

use super::arena::GpuArena;
use super::context::GpuContext;
use super::frame::{FramePlan, PassRecord};
use super::pipeline::{PipelineKey, VertexSlot, build_pipeline};
use super::readback::{ByteOrder, Readback};
use super::resources::{
    CompiledStage, DepthEntry, FramebufferEntry, LinkedProgram, ShaderEntry, TextureEntry,
    create_color_texture, create_depth_texture, create_sampler, create_texture_group,
    create_texture_layout, create_uniform_layout,
};
use super::{GpuInit, SurfaceErrorAction, reflect, uniform};

/// Where a draw reads vertex or index bytes from.
#[derive(Clone)]
enum DataRef {
    Resident(wgpu::Buffer),
    /// The frame's streaming arena.
    Stream,
}

struct AttribState {
    pointer: AttribPointer,
    /// Source captured when the pointer was set, with its base byte offset.
    data: Option<(DataRef, u64)>,
    enabled: bool,
}

/// Bind-then-draw state carried between commands.
struct BindState {
    program: Option<ProgramId>,
    target: DrawTarget,
    texture: Option<TextureId>,
    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
    attribs: BTreeMap<u32, AttribState>,
    viewport: Viewport,
    color_mask: ColorMask,
    depth_write: bool,
}

struct DrawRecord {
    pipeline: PipelineKey,
    uniform_offsets: Vec<u32>,
    /// Sampled image; `None` samples the fallback image.
    texture: Option<TextureId>,
    vertex: Vec<(DataRef, u64)>,
    index: (DataRef, u64),
    count: u32,
    viewport: Viewport,
}

/// Color/depth attachments behind a [`DrawTarget`].
struct ResolvedTarget<'a> {
    /// `None` for the window; its view is only known at present.
    color: Option<&'a wgpu::TextureView>,
    color_texture: Option<TextureId>,
    format: wgpu::TextureFormat,
    depth: Option<&'a wgpu::TextureView>,
    size: [u32; 2],
}

/// wgpu implementation of [`Graphics`].
///
/// Commands are recorded into render passes during the frame and encoded into
/// a single command buffer at [`Graphics::present`]. Uniform values and
/// host-memory vertex data are snapshotted at draw time, so later updates do
/// not affect draws already recorded.
pub struct WgpuGraphics<'w> {
    window: &'w Window,
    gpu: GpuContext<'w>,
    vertex_buffers: bool,
    next_id: u32,

    shaders: HashMap<ShaderId, ShaderEntry>,
    /// `None` marks a program whose link failed.
    programs: HashMap<ProgramId, Option<LinkedProgram>>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    textures: HashMap<TextureId, TextureEntry>,
    texture_groups: HashMap<TextureId, wgpu::BindGroup>,
    depth_buffers: HashMap<RenderbufferId, DepthEntry>,
    framebuffers: HashMap<FramebufferId, FramebufferEntry>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    window_depth: DepthEntry,
    texture_layout: wgpu::BindGroupLayout,
    sampled_sampler: wgpu::Sampler,
    target_sampler: wgpu::Sampler,
    fallback_group: wgpu::BindGroup,

    uniforms: GpuArena,
    stream: GpuArena,
    /// Last host slice streamed, reused by consecutive attribute pointers.
    last_host: Option<(usize, usize, u64)>,

    state: BindState,
    frame: FramePlan<DrawRecord>,
    capture_requested: bool,
    readback: Option<Readback>,
    warned: HashSet<(Option<ProgramId>, String)>,
}

impl<'w> WgpuGraphics<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let gpu = GpuContext::new(window, &init).await?;
        let device = gpu.device();

        let adapter = gpu.adapter_info();
        log::info!(
            "wgpu adapter: {} ({:?}), surface format {:?}",
            adapter.name,
            adapter.backend,
            gpu.surface_format()
        );
        log::debug!("device limits: {:?}", device.limits());

        let window_depth = create_depth_texture(device, gpu.size());
        let texture_layout = create_texture_layout(device);
        let sampled_sampler = create_sampler(device, TextureKind::Sampled);
        let target_sampler = create_sampler(device, TextureKind::RenderTarget);

        let fallback = create_color_texture(
            device,
            gpu.queue(),
            TextureDesc {
                width: 1,
                height: 1,
                kind: TextureKind::Sampled,
            },
            Some(&[0.0, 0.0, 0.0]),
        );
        let fallback_group =
            create_texture_group(device, &texture_layout, &fallback.view, &sampled_sampler);

        let uniform_align = device.limits().min_uniform_buffer_offset_alignment as usize;
        let uniforms = GpuArena::new(
            "labyrinth uniform arena",
            wgpu::BufferUsages::UNIFORM,
            uniform_align,
        );
        let stream = GpuArena::new(
            "labyrinth stream arena",
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::INDEX,
            4,
        );

        let state = BindState {
            program: None,
            target: DrawTarget::Window,
            texture: None,
            vertex_buffer: None,
            index_buffer: None,
            attribs: BTreeMap::new(),
            viewport: Viewport::full(gpu.size()),
            color_mask: ColorMask::ALL,
            depth_write: true,
        };

        Ok(Self {
            window,
            vertex_buffers: init.vertex_buffers,
            next_id: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            texture_groups: HashMap::new(),
            depth_buffers: HashMap::new(),
            framebuffers: HashMap::new(),
            pipelines: HashMap::new(),
            window_depth,
            texture_layout,
            sampled_sampler,
            target_sampler,
            fallback_group,
            uniforms,
            stream,
            last_host: None,
            state,
            frame: FramePlan::default(),
            capture_requested: false,
            readback: None,
            warned: HashSet::new(),
            gpu,
        })
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn warn_once(&mut self, program: Option<ProgramId>, message: String) {
        if self.warned.insert((program, message.clone())) {
            match program {
                Some(p) => log::warn!("draw with {p} skipped: {message}"),
                None => log::warn!("draw skipped: {message}"),
            }
        }
    }

    fn linked(&self, program: ProgramId) -> Option<&LinkedProgram> {
        self.programs.get(&program).and_then(Option::as_ref)
    }

    fn compiled_stage(&self, shader: ShaderId, stage: ShaderStage) -> Result<&CompiledStage, String> {
        match self.shaders.get(&shader) {
            Some(entry) if entry.stage != stage => Err(format!("{shader} is not a {stage} shader")),
            Some(ShaderEntry {
                compiled: Some(compiled),
                ..
            }) => Ok(compiled),
            Some(_) => Err(format!("{stage} shader {shader} did not compile")),
            None => Err(format!("unknown {shader}")),
        }
    }

    fn link(&self, vertex: ShaderId, fragment: ShaderId) -> Result<LinkedProgram, String> {
        let vs = self.compiled_stage(vertex, ShaderStage::Vertex)?;
        let fs = self.compiled_stage(fragment, ShaderStage::Fragment)?;
        let uniforms = reflect::link(&vs.interface, &fs.interface)?;
        let samples_texture = vs.interface.samples_texture || fs.interface.samples_texture;

        let device = self.gpu.device();
        let uniform_layout = create_uniform_layout(device, &uniforms);
        let mut groups = vec![&uniform_layout];
        if samples_texture {
            groups.push(&self.texture_layout);
        }
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("labyrinth program layout"),
            bind_group_layouts: &groups,
            immediate_size: 0,
        });

        let values = uniforms
            .iter()
            .map(|slot| vec![0u8; uniform::slot_size(slot) as usize])
            .collect();

        Ok(LinkedProgram {
            vertex: vs.module.clone(),
            vertex_entry: vs.interface.entry_point.clone(),
            fragment: fs.module.clone(),
            fragment_entry: fs.interface.entry_point.clone(),
            uniforms,
            values,
            inputs: vs.interface.inputs.clone(),
            samples_texture,
            uniform_layout,
            layout,
            uniform_group: None,
        })
    }

    fn resolve_target(&self, target: DrawTarget) -> Result<ResolvedTarget<'_>, String> {
        match target {
            DrawTarget::Window => Ok(ResolvedTarget {
                color: None,
                color_texture: None,
                format: self.gpu.surface_format(),
                depth: Some(&self.window_depth.view),
                size: self.gpu.size(),
            }),
            DrawTarget::Framebuffer(fb) => {
                let entry = self
                    .framebuffers
                    .get(&fb)
                    .ok_or_else(|| format!("unknown {fb}"))?;
                let color_id = entry
                    .color
                    .ok_or_else(|| format!("{fb} has no color attachment"))?;
                let color = self
                    .textures
                    .get(&color_id)
                    .ok_or_else(|| format!("{fb} color attachment {color_id} is missing"))?;
                let depth = entry
                    .depth
                    .and_then(|d| self.depth_buffers.get(&d))
                    .filter(|d| d.size == color.size)
                    .map(|d| &d.view);
                Ok(ResolvedTarget {
                    color: Some(&color.view),
                    color_texture: Some(color_id),
                    format: color.format,
                    depth,
                    size: color.size,
                })
            }
        }
    }

    /// Copies `slice` into the stream arena, reusing the last copy when the
    /// same slice is pointed at again before the draw.
    fn stream_host(&mut self, slice: &[f32]) -> u64 {
        let key = (slice.as_ptr() as usize, slice.len());
        if let Some((ptr, len, offset)) = self.last_host {
            if (ptr, len) == key {
                return offset;
            }
        }
        let offset = self.stream.bytes.push(bytemuck::cast_slice(slice));
        self.last_host = Some((key.0, key.1, offset));
        offset
    }

    /// Snapshots the current state into a draw. `Ok(None)` means there is
    /// nothing to draw.
    fn record_draw(&mut self, count: u32, indices: IndexSource<'_>) -> Result<Option<DrawRecord>, String> {
        let program = self.state.program.ok_or("no program in use")?;
        let linked = self
            .programs
            .get(&program)
            .and_then(Option::as_ref)
            .ok_or("program did not link")?;
        if count == 0 {
            return Ok(None);
        }

        let mut vertex_slots = Vec::with_capacity(linked.inputs.len());
        let mut vertex = Vec::with_capacity(linked.inputs.len());
        for input in &linked.inputs {
            let attrib = self
                .state
                .attribs
                .get(&input.location)
                .filter(|a| a.enabled)
                .ok_or_else(|| format!("vertex input {} is not enabled", input.name))?;
            let (data, base) = attrib
                .data
                .clone()
                .ok_or_else(|| format!("vertex input {} has no data", input.name))?;
            let slot = VertexSlot::from_pointer(input.location, attrib.pointer).ok_or_else(|| {
                format!(
                    "vertex input {} has {} components",
                    input.name, attrib.pointer.components
                )
            })?;
            vertex_slots.push(slot);
            vertex.push((data, base + u64::from(attrib.pointer.offset)));
        }

        let index = match indices {
            IndexSource::Bound => {
                let buffer = self
                    .state
                    .index_buffer
                    .and_then(|b| self.buffers.get(&b))
                    .ok_or("no index buffer bound")?;
                (DataRef::Resident(buffer.clone()), 0)
            }
            IndexSource::Host(host) => {
                if (count as usize) > host.len() {
                    return Err(format!("{count} indices requested, {} given", host.len()));
                }
                let offset = self
                    .stream
                    .bytes
                    .push(bytemuck::cast_slice(&host[..count as usize]));
                (DataRef::Stream, offset)
            }
        };

        let target = self.resolve_target(self.state.target)?;
        let texture = match self.state.texture {
            // Sampling the image being rendered into reads the fallback instead.
            Some(t) if linked.samples_texture && Some(t) != target.color_texture => {
                self.textures.contains_key(&t).then_some(t)
            }
            _ => None,
        };

        let [tw, th] = target.size;
        let vp = self.state.viewport;
        let x = vp.x.min(tw);
        let y = vp.y.min(th);
        let viewport = Viewport::new(x, y, vp.width.min(tw - x), vp.height.min(th - y));
        if viewport.width == 0 || viewport.height == 0 {
            return Ok(None);
        }

        let pipeline = PipelineKey {
            program,
            vertex: vertex_slots,
            format: target.format,
            depth: target.depth.is_some(),
            depth_write: self.state.depth_write,
            color_mask: self.state.color_mask,
        };

        let uniform_offsets = linked
            .values
            .iter()
            .map(|value| self.uniforms.bytes.push(value) as u32)
            .collect();

        Ok(Some(DrawRecord {
            pipeline,
            uniform_offsets,
            texture,
            vertex,
            index,
            count,
            viewport,
        }))
    }

    /// Rebuilds group 0 of every program whose bind group predates the
    /// current uniform arena buffer.
    fn refresh_uniform_groups(&mut self) {
        let device = self.gpu.device();
        let generation = self.uniforms.generation();
        let buffer = self.uniforms.buffer();

        for program in self.programs.values_mut().flatten() {
            if matches!(&program.uniform_group, Some((g, _)) if *g == generation) {
                continue;
            }
            let entries: Option<Vec<_>> = program
                .uniforms
                .iter()
                .map(|slot| {
                    buffer.map(|buffer| wgpu::BindGroupEntry {
                        binding: slot.binding,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer,
                            offset: 0,
                            size: NonZeroU64::new(u64::from(uniform::slot_size(slot))),
                        }),
                    })
                })
                .collect();
            // No arena buffer yet and the program needs one.
            let Some(entries) = entries else { continue };

            let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("labyrinth uniform group"),
                layout: &program.uniform_layout,
                entries: &entries,
            });
            program.uniform_group = Some((generation, group));
        }
    }

    fn build_pipelines(&mut self, passes: &[PassRecord<DrawRecord>]) {
        let device = self.gpu.device();
        for draw in passes.iter().flat_map(|p| &p.draws) {
            if self.pipelines.contains_key(&draw.pipeline) {
                continue;
            }
            let Some(program) = self.programs.get(&draw.pipeline.program).and_then(Option::as_ref)
            else {
                continue;
            };
            let pipeline = build_pipeline(device, &draw.pipeline, program);
            self.pipelines.insert(draw.pipeline.clone(), pipeline);
        }
    }

    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        pass: &PassRecord<DrawRecord>,
    ) {
        let target = match self.resolve_target(pass.target) {
            Ok(target) => target,
            Err(e) => {
                log::warn!("pass skipped: {e}");
                return;
            }
        };

        let color_load = if pass.clear.color {
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if pass.clear.depth {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("labyrinth pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color.unwrap_or(surface_view),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: target.depth.map(|view| {
                wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let stream = self.stream.buffer();
        for draw in &pass.draws {
            let Some(pipeline) = self.pipelines.get(&draw.pipeline) else {
                continue;
            };
            let Some(program) = self.linked(draw.pipeline.program) else {
                continue;
            };
            let Some((_, uniform_group)) = &program.uniform_group else {
                continue;
            };
            let resolve = |data: &DataRef| match data {
                DataRef::Resident(buffer) => Some(buffer.clone()),
                DataRef::Stream => stream.cloned(),
            };
            let Some(vertex) = draw
                .vertex
                .iter()
                .map(|(data, offset)| resolve(data).map(|b| (b, *offset)))
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };
            let Some(index) = resolve(&draw.index.0) else {
                continue;
            };

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, uniform_group, &draw.uniform_offsets);
            if program.samples_texture {
                let group = draw
                    .texture
                    .and_then(|t| self.texture_groups.get(&t))
                    .unwrap_or(&self.fallback_group);
                rpass.set_bind_group(1, group, &[]);
            }
            for (slot, (buffer, offset)) in vertex.iter().enumerate() {
                rpass.set_vertex_buffer(slot as u32, buffer.slice(*offset..));
            }
            rpass.set_index_buffer(index.slice(draw.index.1..), wgpu::IndexFormat::Uint32);

            let vp = draw.viewport;
            rpass.set_viewport(
                vp.x as f32,
                vp.y as f32,
                vp.width as f32,
                vp.height as f32,
                0.0,
                1.0,
            );
            rpass.draw_indexed(0..draw.count, 0, 0..1);
        }
    }

    fn reset_frame(&mut self) {
        self.frame.take();
        self.uniforms.bytes.clear();
        self.stream.bytes.clear();
        self.last_host = None;
    }

    fn poll_readback(&mut self) -> Option<CapturedFrame> {
        let readback = self.readback.as_ref()?;
        if let Err(e) = self.gpu.device().poll(wgpu::PollType::Poll) {
            log::warn!("device poll failed: {e}");
        }
        let result = readback.try_finish()?;
        self.readback = None;
        match result {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::error!("screenshot read-back failed: {e}");
                None
            }
        }
    }
}

impl Graphics for WgpuGraphics<'_> {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Compiled<ShaderId> {
        let id = ShaderId::from_raw(self.next_id());
        match reflect::reflect(stage, source) {
            Ok((_, interface)) => {
                let module = self
                    .gpu
                    .device()
                    .create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some(&format!("labyrinth {stage} {id}")),
                        source: wgpu::ShaderSource::Wgsl(source.into()),
                    });
                self.shaders.insert(
                    id,
                    ShaderEntry {
                        stage,
                        compiled: Some(CompiledStage { module, interface }),
                    },
                );
                Compiled::ok(id)
            }
            Err(log) => {
                self.shaders.insert(id, ShaderEntry { stage, compiled: None });
                Compiled::failed(id, log)
            }
        }
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Compiled<ProgramId> {
        let id = ProgramId::from_raw(self.next_id());
        match self.link(vertex, fragment) {
            Ok(program) => {
                self.programs.insert(id, Some(program));
                Compiled::ok(id)
            }
            Err(log) => {
                self.programs.insert(id, None);
                Compiled::failed(id, log)
            }
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        self.state.program = Some(program);
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let linked = self.linked(program)?;
        let index = linked.uniforms.iter().position(|u| u.name == name)?;
        Some(UniformLocation::from_raw(index as u32))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue<'_>) {
        let Some(program) = self.state.program else {
            log::warn!("uniform upload with no program in use");
            return;
        };
        let Some(Some(linked)) = self.programs.get_mut(&program) else {
            return;
        };
        let index = location.raw() as usize;
        let Some(slot) = linked.uniforms.get(index) else {
            log::warn!("{location} is out of range for {program}");
            return;
        };
        match uniform::pack(slot, value) {
            Ok(bytes) => linked.values[index] = bytes,
            Err(e) => log::warn!("uniform upload to {program} ignored: {e}"),
        }
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        self.linked(program)?
            .inputs
            .iter()
            .find(|i| i.name == name)
            .map(|i| AttribLocation::from_raw(i.location))
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferId {
        let id = BufferId::from_raw(self.next_id());
        let contents: &[u8] = if data.is_empty() { &[0; 4] } else { data };
        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("labyrinth mesh buffer"),
                contents,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::INDEX,
            });
        self.buffers.insert(id, buffer);
        self.bind_buffer(target, Some(id));
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        // Draws already recorded hold their own reference to the buffer.
        self.buffers.remove(&buffer);
        if self.state.vertex_buffer == Some(buffer) {
            self.state.vertex_buffer = None;
        }
        if self.state.index_buffer == Some(buffer) {
            self.state.index_buffer = None;
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        match target {
            BufferTarget::Vertex => self.state.vertex_buffer = buffer,
            BufferTarget::Index => self.state.index_buffer = buffer,
        }
    }

    fn vertex_attrib_pointer(
        &mut self,
        location: AttribLocation,
        pointer: AttribPointer,
        source: VertexSource<'_>,
    ) {
        let data = match source {
            VertexSource::Bound => {
                match self.state.vertex_buffer.and_then(|b| self.buffers.get(&b)) {
                    Some(buffer) => Some((DataRef::Resident(buffer.clone()), 0)),
                    None => {
                        log::warn!("attribute pointer for {location} with no vertex buffer bound");
                        None
                    }
                }
            }
            VertexSource::Host(slice) => Some((DataRef::Stream, self.stream_host(slice))),
        };

        let attrib = self
            .state
            .attribs
            .entry(location.raw())
            .or_insert(AttribState {
                pointer,
                data: None,
                enabled: false,
            });
        attrib.pointer = pointer;
        attrib.data = data;
    }

    fn enable_vertex_attrib(&mut self, location: AttribLocation) {
        self.state
            .attribs
            .entry(location.raw())
            .or_insert(AttribState {
                pointer: AttribPointer {
                    components: 4,
                    stride: 0,
                    offset: 0,
                },
                data: None,
                enabled: false,
            })
            .enabled = true;
    }

    fn draw_elements(&mut self, count: u32, indices: IndexSource<'_>) {
        let result = self.record_draw(count, indices);
        self.last_host = None;
        match result {
            Ok(Some(draw)) => self.frame.draw(self.state.target, draw),
            Ok(None) => {}
            Err(e) => self.warn_once(self.state.program, e),
        }
    }

    fn create_texture(&mut self, desc: TextureDesc, rgb: Option<&[f32]>) -> TextureId {
        let id = TextureId::from_raw(self.next_id());
        let device = self.gpu.device();
        let entry = create_color_texture(device, self.gpu.queue(), desc, rgb);
        let sampler = match entry.kind {
            TextureKind::Sampled => &self.sampled_sampler,
            TextureKind::RenderTarget => &self.target_sampler,
        };
        let group = create_texture_group(device, &self.texture_layout, &entry.view, sampler);
        self.texture_groups.insert(id, group);
        self.textures.insert(id, entry);
        id
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.state.texture = texture;
    }

    fn create_framebuffer(&mut self) -> FramebufferId {
        let id = FramebufferId::from_raw(self.next_id());
        self.framebuffers.insert(id, FramebufferEntry::default());
        id
    }

    fn create_depth_buffer(&mut self, width: u32, height: u32) -> RenderbufferId {
        let id = RenderbufferId::from_raw(self.next_id());
        let entry = create_depth_texture(self.gpu.device(), [width, height]);
        self.depth_buffers.insert(id, entry);
        id
    }

    fn attach_color(&mut self, framebuffer: FramebufferId, texture: TextureId) {
        match self.framebuffers.get_mut(&framebuffer) {
            Some(fb) => fb.color = Some(texture),
            None => log::warn!("attach_color: unknown {framebuffer}"),
        }
    }

    fn attach_depth(&mut self, framebuffer: FramebufferId, depth: RenderbufferId) {
        match self.framebuffers.get_mut(&framebuffer) {
            Some(fb) => fb.depth = Some(depth),
            None => log::warn!("attach_depth: unknown {framebuffer}"),
        }
    }

    fn bind_framebuffer(&mut self, target: DrawTarget) {
        self.state.target = target;
    }

    fn clear(&mut self, mask: ClearMask) {
        self.frame.clear(self.state.target, mask);
    }

    fn color_mask(&mut self, mask: ColorMask) {
        self.state.color_mask = mask;
    }

    fn viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
    }

    fn depth_mask(&mut self, write: bool) {
        self.state.depth_write = write;
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            vertex_buffers: self.vertex_buffers,
        }
    }

    fn info(&self) -> DeviceInfo {
        let adapter = self.gpu.adapter_info();
        DeviceInfo {
            version: format!(
                "wgpu {:?} ({} {})",
                adapter.backend, adapter.driver, adapter.driver_info
            ),
            shading_language: "WGSL".to_string(),
            renderer: adapter.name,
            vendor: format!("0x{:04x}", adapter.vendor),
            extensions: vec![format!("{:?}", self.gpu.device().features())],
        }
    }

    fn request_capture(&mut self) {
        self.capture_requested = true;
    }

    fn present(&mut self) -> Option<CapturedFrame> {
        let surface_texture = match self.gpu.acquire() {
            Ok(texture) => texture,
            Err(err) => {
                match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        log::debug!("frame dropped after surface error")
                    }
                    SurfaceErrorAction::Fatal => log::error!("surface error, frame dropped"),
                }
                self.reset_frame();
                return self.poll_readback();
            }
        };

        let passes = self.frame.take();
        self.uniforms.upload(self.gpu.device(), self.gpu.queue());
        self.stream.upload(self.gpu.device(), self.gpu.queue());
        self.refresh_uniform_groups();
        self.build_pipelines(&passes);

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("labyrinth frame encoder"),
            });

        for pass in &passes {
            self.encode_pass(&mut encoder, &view, pass);
        }

        let mut readback = None;
        if self.capture_requested && self.readback.is_none() {
            self.capture_requested = false;
            match ByteOrder::of(self.gpu.surface_format()) {
                Some(order) if self.gpu.can_read_back() => {
                    readback = Some(Readback::encode(
                        self.gpu.device(),
                        &mut encoder,
                        &surface_texture.texture,
                        order,
                    ));
                }
                _ => log::warn!(
                    "screenshot unsupported for surface format {:?}",
                    self.gpu.surface_format()
                ),
            }
        }

        self.window.pre_present_notify();
        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();

        if let Some(mut readback) = readback {
            readback.map();
            self.readback = Some(readback);
        }

        self.reset_frame();
        self.poll_readback()
    }
}
