//! Rendering context.
//!
//! [`Drawer`] owns every piece of render state (active program, matrices,
//! ping-pong targets, pass list, stereo mode) together with the graphics
//! backend, and exposes the operations the application loop drives:
//!
//! ```text
//! drawer.begin_scene();
//! drawer.use_program(scene); drawer.set_modelview(view); drawer.draw_mesh(&maze);
//! drawer.do_postprocess();
//! drawer.end_scene();
//! ```

mod events;

use anyhow::{Context, Result};
use glam::Mat4;

use crate::assets::AssetCategory;
use crate::config::DrawerConfig;
use crate::diagnostics;
use crate::gfx::{
    ClearMask, DrawTarget, Graphics, ProgramId, ShaderId, ShaderStage, TextureDesc, TextureId,
    TextureKind,
};
use crate::input::Key;
use crate::mesh::{self, BufferStrategy, Mesh};
use crate::postprocess::{ChainOutput, PassId, PassList, PingPong, plan_chain};
use crate::shader;
use crate::stereo::StereoMode;
use crate::target::RenderTarget;
use crate::uniforms::{self, UniformInputs};

pub struct Drawer<G: Graphics> {
    gfx: G,
    config: DrawerConfig,

    screen_size: [u32; 2],
    projection: Mat4,
    modelview: Mat4,

    program: Option<ProgramId>,
    strategy: BufferStrategy,
    buffers_bound: bool,
    stereo: StereoMode,

    /// Ping-pong targets; the scene is rendered into `targets[0]`.
    targets: [RenderTarget; 2],
    pp_vertex: ShaderId,
    pp_program: ProgramId,
    passes: PassList,
    screen_square: Mesh,
}

impl<G: Graphics> Drawer<G> {
    /// Sets up render targets and the default post-process program.
    ///
    /// Fails only when a shader file cannot be read.
    pub fn new(mut gfx: G, screen_size: [u32; 2], config: DrawerConfig) -> Result<Self> {
        let info = gfx.info();
        let strategy = BufferStrategy::select(gfx.capabilities(), config.resident_buffers);
        log::info!("graphics version: {}", info.version);
        log::info!("shading language: {}", info.shading_language);
        match strategy {
            BufferStrategy::Resident => log::info!("vertex buffers supported; meshes are GPU-resident"),
            BufferStrategy::Host => log::info!("vertex buffers unavailable; meshes stream from host memory"),
        }

        let projection = config.projection.matrix(screen_size);

        let targets = [
            RenderTarget::create(&mut gfx, screen_size),
            RenderTarget::create(&mut gfx, screen_size),
        ];

        let assets = &config.assets;
        let pp_vertex = shader::load_shader(&mut gfx, assets, ShaderStage::Vertex, &config.pp_vertex)?;
        let pp_fragment =
            shader::load_shader(&mut gfx, assets, ShaderStage::Fragment, &config.pp_fragment)?;
        let pp_program = shader::link_program(
            &mut gfx,
            pp_vertex,
            pp_fragment,
            &format!("{} + {}", config.pp_vertex, config.pp_fragment),
        );

        let mut screen_square = Mesh::screen_square();
        let mut buffers_bound = false;
        if strategy == BufferStrategy::Resident {
            mesh::upload_buffers(&mut gfx, &mut screen_square, &mut buffers_bound);
        }

        Ok(Self {
            gfx,
            config,
            screen_size,
            projection,
            modelview: Mat4::IDENTITY,
            program: None,
            strategy,
            buffers_bound,
            stereo: StereoMode::Off,
            targets,
            pp_vertex,
            pp_program,
            passes: PassList::new(),
            screen_square,
        })
    }

    /// Releases the core's own GPU buffers.
    pub fn shutdown(&mut self) {
        mesh::release_buffers(&mut self.gfx, &mut self.screen_square);
        log::info!("drawer shut down");
    }

    // ── matrices ──────────────────────────────────────────────────────────

    /// Replaces the modelview matrix and refreshes the active program's uniforms.
    pub fn set_modelview(&mut self, modelview: Mat4) {
        self.modelview = modelview;
        self.update_uniforms();
    }

    pub fn modelview(&self) -> Mat4 {
        self.modelview
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    // ── programs / textures ───────────────────────────────────────────────

    /// Loads, compiles and links a program from two shader files.
    pub fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId> {
        shader::load_program(&mut self.gfx, &self.config.assets, vertex, fragment)
    }

    /// Makes `program` the active program and populates its uniforms.
    pub fn use_program(&mut self, program: ProgramId) {
        self.gfx.use_program(program);
        self.program = Some(program);
        self.update_uniforms();
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.program
    }

    /// Decodes an image from the texture root and uploads it.
    pub fn load_texture(&mut self, name: &str) -> Result<TextureId> {
        let path = self.config.assets.resolve(AssetCategory::Texture, name);
        let image = image::open(&path)
            .with_context(|| format!("failed to load texture {}", path.display()))?
            .to_rgb32f();

        let (width, height) = image.dimensions();
        let texture = self.gfx.create_texture(
            TextureDesc {
                width,
                height,
                kind: TextureKind::Sampled,
            },
            Some(image.as_raw().as_slice()),
        );
        log::debug!("loaded texture {name} ({width}x{height}) as {texture}");
        Ok(texture)
    }

    /// Binds the texture sampled by subsequent draws.
    pub fn use_texture(&mut self, texture: Option<TextureId>) {
        self.gfx.bind_texture(texture);
    }

    pub fn depth_mask(&mut self, write: bool) {
        self.gfx.depth_mask(write);
    }

    // ── meshes ────────────────────────────────────────────────────────────

    /// Promotes `mesh` to GPU buffers when the resident strategy is active.
    pub fn prepare_mesh(&mut self, mesh: &mut Mesh) {
        if self.strategy == BufferStrategy::Resident {
            mesh::upload_buffers(&mut self.gfx, mesh, &mut self.buffers_bound);
        }
    }

    pub fn release_mesh(&mut self, mesh: &mut Mesh) {
        mesh::release_buffers(&mut self.gfx, mesh);
    }

    /// Draws `mesh` with the active program.
    pub fn draw_mesh(&mut self, mesh: &Mesh) {
        mesh::draw_mesh(&mut self.gfx, self.program, &mut self.buffers_bound, mesh);
    }

    pub fn buffer_strategy(&self) -> BufferStrategy {
        self.strategy
    }

    // ── post-processing ───────────────────────────────────────────────────

    /// Registers an enabled pass built from `fragment` and the shared
    /// post-process vertex shader. The pass program is activated once so its
    /// uniforms are populated immediately.
    pub fn add_postprocess_pass(&mut self, fragment: &str, toggle: Key) -> Result<PassId> {
        let shader = shader::load_shader(
            &mut self.gfx,
            &self.config.assets,
            ShaderStage::Fragment,
            fragment,
        )?;
        let label = format!("{} + {fragment}", self.config.pp_vertex);
        let program = shader::link_program(&mut self.gfx, self.pp_vertex, shader, &label);

        let id = self.passes.push(program, shader, toggle);
        log::info!("registered post-process {id} ({fragment}) on key {toggle}");

        self.use_program(program);
        Ok(id)
    }

    pub fn passes(&self) -> &PassList {
        &self.passes
    }

    pub fn passes_mut(&mut self) -> &mut PassList {
        &mut self.passes
    }

    /// Program used when no pass is enabled.
    pub fn default_pass_program(&self) -> ProgramId {
        self.pp_program
    }

    /// Runs the enabled passes over the scene in target A, ending on the window.
    pub fn do_postprocess(&mut self) {
        let steps = plan_chain(&self.passes.enabled_programs(), self.pp_program);

        for step in steps {
            self.use_program(step.program);

            let write = match step.write {
                ChainOutput::Target(t) => self.target(t).draw_target(),
                ChainOutput::Window => DrawTarget::Window,
            };
            let read = self.target(step.read).image;

            self.gfx.bind_framebuffer(write);
            self.gfx.bind_texture(Some(read));
            self.gfx.clear(ClearMask::ALL);

            mesh::draw_mesh(
                &mut self.gfx,
                self.program,
                &mut self.buffers_bound,
                &self.screen_square,
            );
        }
    }

    fn target(&self, which: PingPong) -> &RenderTarget {
        match which {
            PingPong::A => &self.targets[0],
            PingPong::B => &self.targets[1],
        }
    }

    pub fn render_targets(&self) -> &[RenderTarget; 2] {
        &self.targets
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Directs scene drawing into target A and clears it.
    pub fn begin_scene(&mut self) {
        self.gfx.bind_framebuffer(self.targets[0].draw_target());
        self.gfx.clear(ClearMask::ALL);
    }

    /// Presents the frame and writes a pending screenshot.
    pub fn end_scene(&mut self) {
        let Some(frame) = self.gfx.present() else {
            return;
        };

        let path = diagnostics::next_screenshot_path(&self.config.screenshot);
        match diagnostics::save_screenshot(&frame, &path) {
            Ok(()) => log::info!("saved screenshot {}", path.display()),
            Err(e) => log::error!("screenshot failed: {e:#}"),
        }
    }

    // ── stereo ────────────────────────────────────────────────────────────

    pub fn stereo_mode(&self) -> StereoMode {
        self.stereo
    }

    pub fn set_stereo_mode(&mut self, mode: StereoMode) {
        self.stereo = mode;
    }

    pub fn stereo_reset(&mut self) {
        self.stereo.reset(&mut self.gfx, self.screen_size);
    }

    pub fn stereo_left(&mut self) {
        self.stereo.left(&mut self.gfx, self.screen_size);
    }

    pub fn stereo_right(&mut self) {
        self.stereo.right(&mut self.gfx, self.screen_size);
    }

    // ── diagnostics ───────────────────────────────────────────────────────

    /// Writes the device report to the configured diagnostics path.
    pub fn write_info(&self) {
        let path = &self.config.diagnostics_path;
        match diagnostics::write_device_info(path, &self.gfx.info()) {
            Ok(()) => log::info!("wrote device info to {}", path.display()),
            Err(e) => log::error!("device info dump failed: {e:#}"),
        }
    }

    /// Captures the window contents at the next present.
    pub fn request_screenshot(&mut self) {
        self.gfx.request_capture();
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn screen_size(&self) -> [u32; 2] {
        self.screen_size
    }

    pub fn config(&self) -> &DrawerConfig {
        &self.config
    }

    pub fn gfx(&self) -> &G {
        &self.gfx
    }

    pub fn gfx_mut(&mut self) -> &mut G {
        &mut self.gfx
    }

    fn update_uniforms(&mut self) {
        let Some(program) = self.program else { return };
        let inputs = UniformInputs {
            modelview: self.modelview,
            projection: self.projection,
            screen_size: self.screen_size,
        };
        uniforms::bind_uniforms(&mut self.gfx, program, &inputs);
    }
}
