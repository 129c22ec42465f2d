//! Maze layout and the geometry built from it.
//!
//! Cell `(x, z)` covers `[x, x + 1] x [z, z + 1]` on the ground plane; walls
//! are one unit high.

use anyhow::{Result, bail};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use labyrinth_engine::mesh::{Mesh, VertexFormat};

/// `#` is a wall, `.` an open cell, `S` the open cell the viewer starts in.
pub const LAYOUT: &[&str] = &[
    "###########",
    "#S....#...#",
    "#.###.#.#.#",
    "#.#...#.#.#",
    "#.#.###.#.#",
    "#...#...#.#",
    "###.#.###.#",
    "#...#.....#",
    "#.#######.#",
    "#.........#",
    "###########",
];

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    texcoord: [f32; 2],
}

#[derive(Debug, Clone)]
pub struct Maze {
    width: usize,
    depth: usize,
    walls: Vec<bool>,
    start: (usize, usize),
}

impl Maze {
    pub fn parse(rows: &[&str]) -> Result<Self> {
        let Some(first) = rows.first() else {
            bail!("maze layout is empty");
        };
        let width = first.len();
        let mut walls = Vec::with_capacity(width * rows.len());
        let mut start = None;

        for (z, row) in rows.iter().enumerate() {
            if row.len() != width {
                bail!("maze row {z} has {} cells, expected {width}", row.len());
            }
            for (x, c) in row.chars().enumerate() {
                match c {
                    '#' => walls.push(true),
                    '.' => walls.push(false),
                    'S' => {
                        walls.push(false);
                        start = Some((x, z));
                    }
                    other => bail!("unknown maze cell {other:?} at ({x}, {z})"),
                }
            }
        }

        let Some(start) = start else {
            bail!("maze layout has no start cell");
        };

        Ok(Self {
            width,
            depth: rows.len(),
            walls,
            start,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Cells outside the layout count as walls.
    pub fn is_wall(&self, x: i32, z: i32) -> bool {
        if x < 0 || z < 0 || x as usize >= self.width || z as usize >= self.depth {
            return true;
        }
        self.walls[z as usize * self.width + x as usize]
    }

    /// Center of the start cell on the ground plane, as `(x, z)`.
    pub fn start(&self) -> Vec2 {
        Vec2::new(self.start.0 as f32 + 0.5, self.start.1 as f32 + 0.5)
    }

    fn open_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.depth as i32)
            .flat_map(move |z| (0..self.width as i32).map(move |x| (x, z)))
            .filter(|&(x, z)| !self.is_wall(x, z))
    }

    /// One upward-facing quad per open cell.
    pub fn floor_mesh(&self) -> Mesh {
        let mut builder = QuadBuilder::default();
        for (x, z) in self.open_cells() {
            let (x, z) = (x as f32, z as f32);
            builder.quad(
                [
                    Vec3::new(x, 0.0, z + 1.0),
                    Vec3::new(x + 1.0, 0.0, z + 1.0),
                    Vec3::new(x + 1.0, 0.0, z),
                    Vec3::new(x, 0.0, z),
                ],
                Vec3::Y,
            );
        }
        builder.build()
    }

    /// Wall faces between open cells and their wall neighbors, facing the
    /// open cell. Faces nobody can see are never generated.
    pub fn wall_mesh(&self) -> Mesh {
        let mut builder = QuadBuilder::default();
        for (x, z) in self.open_cells() {
            let (fx, fz) = (x as f32, z as f32);
            let sides = [
                ((x - 1, z), Vec3::new(fx, 0.0, fz + 1.0), Vec3::new(fx, 0.0, fz), Vec3::X),
                ((x + 1, z), Vec3::new(fx + 1.0, 0.0, fz), Vec3::new(fx + 1.0, 0.0, fz + 1.0), Vec3::NEG_X),
                ((x, z - 1), Vec3::new(fx, 0.0, fz), Vec3::new(fx + 1.0, 0.0, fz), Vec3::Z),
                ((x, z + 1), Vec3::new(fx + 1.0, 0.0, fz + 1.0), Vec3::new(fx, 0.0, fz + 1.0), Vec3::NEG_Z),
            ];
            for ((nx, nz), a, b, normal) in sides {
                if self.is_wall(nx, nz) {
                    builder.quad([a, b, b + Vec3::Y, a + Vec3::Y], normal);
                }
            }
        }
        builder.build()
    }
}

#[derive(Default)]
struct QuadBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl QuadBuilder {
    /// Corners in order: bottom-left, bottom-right, top-right, top-left.
    fn quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        const UV: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let base = self.vertices.len() as u32;
        for (corner, texcoord) in corners.into_iter().zip(UV) {
            self.vertices.push(Vertex {
                position: corner.to_array(),
                normal: normal.to_array(),
                texcoord,
            });
        }
        self.indices
            .extend([0, 1, 2, 0, 2, 3].map(|i| base + i));
    }

    fn build(self) -> Mesh {
        let floats: Vec<f32> = bytemuck::cast_slice(&self.vertices).to_vec();
        Mesh::new(
            VertexFormat::POSITION | VertexFormat::NORMAL | VertexFormat::TEXCOORD,
            floats,
            self.indices,
        )
    }
}
