use glam::{Mat4, Vec2, Vec3};

use labyrinth_engine::input::{InputState, Key};

use crate::maze::Maze;

const EYE_HEIGHT: f32 = 0.5;
/// Cells per second.
const MOVE_SPEED: f32 = 2.0;
/// Radians per second.
const TURN_SPEED: f32 = 2.0;
/// Closest the eye may get to a wall.
const RADIUS: f32 = 0.2;

/// Movement requested for one frame, each axis in `[-1, 1]`.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Controls {
    pub forward: f32,
    /// Positive turns left.
    pub turn: f32,
}

impl Controls {
    pub fn from_input(input: &InputState) -> Self {
        let axis = |pos: [Key; 2], neg: [Key; 2]| {
            let down = |keys: [Key; 2]| keys.iter().any(|k| input.key_down(*k));
            f32::from(u8::from(down(pos))) - f32::from(u8::from(down(neg)))
        };
        Self {
            forward: axis([Key::ArrowUp, Key::W], [Key::ArrowDown, Key::S]),
            turn: axis([Key::ArrowLeft, Key::A], [Key::ArrowRight, Key::D]),
        }
    }
}

/// Walking viewer: a point on the ground plane plus a heading.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// `(x, z)` on the ground plane.
    pub position: Vec2,
    /// Heading in radians; zero looks down -Z.
    pub yaw: f32,
}

impl Camera {
    pub fn new(position: Vec2, yaw: f32) -> Self {
        Self { position, yaw }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y)
    }

    /// Turns, then walks. Each axis of the step is applied separately so the
    /// viewer slides along walls instead of stopping.
    pub fn update(&mut self, controls: Controls, dt: f32, maze: &Maze) {
        self.yaw += controls.turn * TURN_SPEED * dt;

        let step = self.forward() * controls.forward * MOVE_SPEED * dt;
        let moved_x = Vec2::new(self.position.x + step.x, self.position.y);
        if !collides(maze, moved_x) {
            self.position = moved_x;
        }
        let moved_z = Vec2::new(self.position.x, self.position.y + step.z);
        if !collides(maze, moved_z) {
            self.position = moved_z;
        }
    }

    /// View matrix for an eye shifted `eye_offset` units to the right.
    pub fn view(&self, eye_offset: f32) -> Mat4 {
        let eye = Vec3::new(self.position.x, EYE_HEIGHT, self.position.y) + self.right() * eye_offset;
        Mat4::look_to_rh(eye, self.forward(), Vec3::Y)
    }
}

fn collides(maze: &Maze, p: Vec2) -> bool {
    [(-RADIUS, -RADIUS), (RADIUS, -RADIUS), (-RADIUS, RADIUS), (RADIUS, RADIUS)]
        .into_iter()
        .any(|(dx, dz)| maze.is_wall((p.x + dx).floor() as i32, (p.y + dz).floor() as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_engine::input::{InputEvent, InputFrame, KeyState};

    fn corridor() -> Maze {
        Maze::parse(&["#####", "#S..#", "#####"]).unwrap()
    }

    // ── controls ──────────────────────────────────────────────────────────

    #[test]
    fn held_keys_become_axes() {
        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        for key in [Key::ArrowUp, Key::D] {
            input.apply_event(
                &mut frame,
                InputEvent::Key { key, state: KeyState::Pressed, repeat: false },
            );
        }

        let controls = Controls::from_input(&input);
        assert_eq!(controls, Controls { forward: 1.0, turn: -1.0 });
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        for key in [Key::ArrowUp, Key::ArrowDown] {
            input.apply_event(
                &mut frame,
                InputEvent::Key { key, state: KeyState::Pressed, repeat: false },
            );
        }
        assert_eq!(Controls::from_input(&input).forward, 0.0);
    }

    // ── movement ──────────────────────────────────────────────────────────

    #[test]
    fn zero_yaw_looks_down_negative_z() {
        let camera = Camera::new(Vec2::ZERO, 0.0);
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn walking_along_the_corridor() {
        let maze = corridor();
        // Facing +X.
        let mut camera = Camera::new(maze.start(), -std::f32::consts::FRAC_PI_2);

        camera.update(Controls { forward: 1.0, turn: 0.0 }, 0.25, &maze);

        assert!((camera.position.x - 2.0).abs() < 1e-4);
        assert!((camera.position.y - 1.5).abs() < 1e-4);
    }

    #[test]
    fn walls_block_movement() {
        let maze = corridor();
        let mut camera = Camera::new(maze.start(), 0.0);

        camera.update(Controls { forward: 1.0, turn: 0.0 }, 1.0, &maze);

        assert_eq!(camera.position, maze.start());
    }

    #[test]
    fn turning_left_increases_yaw() {
        let maze = corridor();
        let mut camera = Camera::new(maze.start(), 0.0);
        camera.update(Controls { forward: 0.0, turn: 1.0 }, 0.5, &maze);
        assert!((camera.yaw - 1.0).abs() < 1e-6);
    }

    // ── view ──────────────────────────────────────────────────────────────

    #[test]
    fn eye_offset_shifts_along_right_axis() {
        let camera = Camera::new(Vec2::new(2.0, 3.0), 0.0);

        let eye = |offset: f32| camera.view(offset).inverse().transform_point3(Vec3::ZERO);

        assert!(eye(0.0).abs_diff_eq(Vec3::new(2.0, EYE_HEIGHT, 3.0), 1e-5));
        assert!(eye(0.1).abs_diff_eq(Vec3::new(2.1, EYE_HEIGHT, 3.0), 1e-5));
        assert!(eye(-0.1).abs_diff_eq(Vec3::new(1.9, EYE_HEIGHT, 3.0), 1e-5));
    }
}
