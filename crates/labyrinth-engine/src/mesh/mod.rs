//! Meshes and how they reach the GPU.
//!
//! Geometry is produced by callers; this module only describes the vertex
//! layout, promotes host data to GPU buffers and issues the indexed draws.

mod buffers;
mod draw;
mod format;

pub use buffers::{BufferStrategy, release_buffers, upload_buffers};
pub use draw::draw_mesh;
pub use format::{AttributeLayout, VertexAttribute, VertexFormat, VertexLayout};

use crate::gfx::BufferId;

/// GPU-resident copy of a mesh's vertex and index data.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MeshBuffers {
    pub vertex: BufferId,
    pub index: BufferId,
}

/// Indexed triangle mesh with interleaved `f32` vertices.
#[derive(Debug, Clone)]
pub struct Mesh {
    format: VertexFormat,
    layout: VertexLayout,
    vertices: Vec<f32>,
    indices: Vec<u32>,
    buffers: Option<MeshBuffers>,
}

impl Mesh {
    /// Builds a mesh from interleaved vertices laid out per `format`.
    pub fn new(format: VertexFormat, vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        let layout = VertexLayout::new(format);
        debug_assert!(
            layout.stride() == 0 || vertices.len() % layout.stride() as usize == 0,
            "vertex data is not a whole number of vertices"
        );
        Self {
            format,
            layout,
            vertices,
            indices,
            buffers: None,
        }
    }

    /// Two triangles covering clip space, with texcoords in `[0, 1]`.
    pub fn screen_square() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            -1.0, -1.0, 0.0,   0.0, 0.0,
             1.0, -1.0, 0.0,   1.0, 0.0,
            -1.0,  1.0, 0.0,   0.0, 1.0,
             1.0,  1.0, 0.0,   1.0, 1.0,
        ];
        let indices = vec![0, 1, 2, 1, 3, 2];
        Self::new(
            VertexFormat::POSITION | VertexFormat::TEXCOORD,
            vertices,
            indices,
        )
    }

    pub fn format(&self) -> VertexFormat {
        self.format
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> u32 {
        match self.layout.stride() {
            0 => 0,
            stride => self.vertices.len() as u32 / stride,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// GPU buffers, when the mesh has been promoted.
    pub fn buffers(&self) -> Option<MeshBuffers> {
        self.buffers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_square_counts() {
        let m = Mesh::screen_square();
        assert_eq!(m.vertex_count(), 4);
        assert_eq!(m.index_count(), 6);
        assert_eq!(m.layout().stride(), 5);
        assert!(m.buffers().is_none());
    }

    #[test]
    fn vertex_count_uses_stride() {
        let m = Mesh::new(
            VertexFormat::POSITION | VertexFormat::NORMAL,
            vec![0.0; 6 * 3],
            vec![0, 1, 2],
        );
        assert_eq!(m.vertex_count(), 3);
    }
}
