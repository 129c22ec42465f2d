//! Maze scene and the app driving it.

use anyhow::Result;

use labyrinth_engine::core::{App, AppControl, FrameCtx};
use labyrinth_engine::device::WgpuGraphics;
use labyrinth_engine::drawer::Drawer;
use labyrinth_engine::gfx::{Graphics, ProgramId, TextureId};
use labyrinth_engine::input::Key;
use labyrinth_engine::mesh::Mesh;
use labyrinth_engine::stereo::StereoMode;

use crate::camera::{Camera, Controls};
use crate::maze::Maze;

/// Distance between the two eyes in stereo modes.
const EYE_SEPARATION: f32 = 0.06;

/// Post-process passes, registered disabled, with their toggle keys.
const PASSES: &[(&str, Key)] = &[
    ("blur.frag.wgsl", Key::B),
    ("invert.frag.wgsl", Key::I),
    ("edge.frag.wgsl", Key::E),
];

pub struct Scene {
    maze: Maze,
    camera: Camera,
    program: ProgramId,
    floor_texture: TextureId,
    wall_texture: TextureId,
    floor: Mesh,
    walls: Mesh,
}

impl Scene {
    pub fn load<G: Graphics>(drawer: &mut Drawer<G>, maze: Maze) -> Result<Self> {
        let program = drawer.create_program("scene.vert.wgsl", "scene.frag.wgsl")?;
        let floor_texture = drawer.load_texture("floor.png")?;
        let wall_texture = drawer.load_texture("wall.png")?;

        let mut floor = maze.floor_mesh();
        let mut walls = maze.wall_mesh();
        drawer.prepare_mesh(&mut floor);
        drawer.prepare_mesh(&mut walls);

        for &(fragment, key) in PASSES {
            let id = drawer.add_postprocess_pass(fragment, key)?;
            drawer.passes_mut().set_enabled(id, false);
        }

        let camera = Camera::new(maze.start(), 0.0);
        Ok(Self {
            maze,
            camera,
            program,
            floor_texture,
            wall_texture,
            floor,
            walls,
        })
    }

    pub fn update(&mut self, controls: Controls, dt: f32) {
        self.camera.update(controls, dt, &self.maze);
    }

    /// Renders one frame: the scene (once per eye in stereo modes), then the
    /// post-process chain onto the window.
    pub fn render<G: Graphics>(&self, drawer: &mut Drawer<G>) {
        drawer.begin_scene();
        drawer.use_program(self.program);

        if drawer.stereo_mode() == StereoMode::Off {
            self.draw_world(drawer, 0.0);
        } else {
            let half = EYE_SEPARATION / 2.0;
            drawer.stereo_left();
            self.draw_world(drawer, -half);
            drawer.stereo_right();
            self.draw_world(drawer, half);
            drawer.stereo_reset();
        }

        drawer.do_postprocess();
        drawer.end_scene();
    }

    fn draw_world<G: Graphics>(&self, drawer: &mut Drawer<G>, eye_offset: f32) {
        drawer.set_modelview(self.camera.view(eye_offset));

        drawer.use_texture(Some(self.floor_texture));
        drawer.draw_mesh(&self.floor);
        drawer.use_texture(Some(self.wall_texture));
        drawer.draw_mesh(&self.walls);
    }
}

/// Walk-through viewer for a fixed maze.
pub struct MazeViewer {
    maze: Maze,
    scene: Option<Scene>,
}

impl MazeViewer {
    pub fn new(maze: Maze) -> Self {
        Self { maze, scene: None }
    }
}

impl App for MazeViewer {
    fn init(&mut self, drawer: &mut Drawer<WgpuGraphics<'_>>) -> Result<()> {
        self.scene = Some(Scene::load(drawer, self.maze.clone())?);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.handle_input() == AppControl::Exit {
            return AppControl::Exit;
        }
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };

        scene.update(Controls::from_input(ctx.input), ctx.time.dt);
        scene.render(ctx.drawer);
        AppControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_engine::assets::Assets;
    use labyrinth_engine::config::DrawerConfig;
    use labyrinth_engine::gfx::recording::RecordingGraphics;
    use labyrinth_engine::gfx::{ColorMask, DrawTarget, Viewport};

    const SCREEN: [u32; 2] = [64, 32];

    fn drawer_with_textures(texture_root: &str) -> (tempfile::TempDir, Drawer<RecordingGraphics>) {
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets {
            shader_root: dir.path().join("shaders"),
            texture_root: texture_root.into(),
        };
        std::fs::create_dir_all(&assets.shader_root).unwrap();

        // Declaration format understood by the recording backend.
        let shaders = [
            ("pp.vert.wgsl", "in in_position\nin in_texcoord"),
            ("pp.frag.wgsl", ""),
            ("blur.frag.wgsl", "uniform gaussValues\nuniform screen_size"),
            ("invert.frag.wgsl", ""),
            ("edge.frag.wgsl", "uniform screen_size"),
            (
                "scene.vert.wgsl",
                "uniform MVPMatrix\nuniform MVMatrix\nin in_position\nin in_normal\nin in_texcoord",
            ),
            ("scene.frag.wgsl", ""),
        ];
        for (name, text) in shaders {
            std::fs::write(assets.shader_root.join(name), text).unwrap();
        }

        let config = DrawerConfig {
            assets,
            ..DrawerConfig::default()
        };
        let gfx = RecordingGraphics::new(SCREEN[0], SCREEN[1]);
        let drawer = Drawer::new(gfx, SCREEN, config).unwrap();
        (dir, drawer)
    }

    fn drawer() -> (tempfile::TempDir, Drawer<RecordingGraphics>) {
        drawer_with_textures(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/textures"))
    }

    fn small_maze() -> Maze {
        Maze::parse(&["#####", "#S..#", "#####"]).unwrap()
    }

    // ── load ──────────────────────────────────────────────────────────────

    #[test]
    fn passes_start_disabled() {
        let (_dir, mut d) = drawer();
        Scene::load(&mut d, small_maze()).unwrap();

        assert_eq!(d.passes().len(), 3);
        assert!(d.passes().enabled_programs().is_empty());
    }

    #[test]
    fn missing_texture_fails_load() {
        let (_dir, mut d) = drawer_with_textures("/nonexistent/textures");
        assert!(Scene::load(&mut d, small_maze()).is_err());
    }

    // ── render ────────────────────────────────────────────────────────────

    #[test]
    fn mono_frame_draws_scene_then_window() {
        let (_dir, mut d) = drawer();
        let scene = Scene::load(&mut d, small_maze()).unwrap();
        d.gfx_mut().take_calls();

        scene.render(&mut d);

        let draws: Vec<_> = d.gfx().draws().cloned().collect();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].texture, Some(scene.floor_texture));
        assert_eq!(draws[1].texture, Some(scene.wall_texture));
        assert_ne!(draws[1].target, DrawTarget::Window);
        assert_eq!(draws[2].target, DrawTarget::Window);
        assert_eq!(draws[2].program, Some(d.default_pass_program()));
    }

    #[test]
    fn anaglyph_frame_masks_each_eye() {
        let (_dir, mut d) = drawer();
        let scene = Scene::load(&mut d, small_maze()).unwrap();
        d.set_stereo_mode(StereoMode::Anaglyph);
        d.gfx_mut().take_calls();

        scene.render(&mut d);

        let masks: Vec<_> = d.gfx().draws().map(|r| r.color_mask).collect();
        assert_eq!(
            masks,
            vec![
                ColorMask::RED,
                ColorMask::RED,
                ColorMask::GREEN_BLUE,
                ColorMask::GREEN_BLUE,
                ColorMask::ALL,
            ]
        );
    }

    #[test]
    fn side_by_side_frame_splits_viewport() {
        let (_dir, mut d) = drawer();
        let scene = Scene::load(&mut d, small_maze()).unwrap();
        d.set_stereo_mode(StereoMode::SideBySide);
        d.gfx_mut().take_calls();

        scene.render(&mut d);

        let viewports: Vec<_> = d.gfx().draws().map(|r| r.viewport).collect();
        assert_eq!(viewports[0], Viewport::new(0, 0, 32, 32));
        assert_eq!(viewports[2], Viewport::new(32, 0, 32, 32));
        assert_eq!(viewports[4], Viewport::full(SCREEN));
    }

    #[test]
    fn enabled_passes_chain_into_window() {
        let (_dir, mut d) = drawer();
        let scene = Scene::load(&mut d, small_maze()).unwrap();
        d.handle_key(Key::I);
        d.handle_key(Key::E);
        d.gfx_mut().take_calls();

        scene.render(&mut d);

        let targets: Vec<_> = d.gfx().draws().map(|r| r.target).collect();
        assert_eq!(targets.len(), 4);
        assert_ne!(targets[2], DrawTarget::Window);
        assert_eq!(targets[3], DrawTarget::Window);
    }

    #[test]
    fn update_moves_camera() {
        let (_dir, mut d) = drawer();
        let mut scene = Scene::load(&mut d, small_maze()).unwrap();
        let before = scene.camera.position;

        scene.update(Controls { forward: 0.0, turn: 1.0 }, 0.1);
        scene.update(Controls { forward: -1.0, turn: 0.0 }, 0.1);

        assert_ne!(scene.camera.position, before);
    }
}
