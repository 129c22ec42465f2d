use crate::gfx::{BufferTarget, Capabilities, Graphics};

use super::{Mesh, MeshBuffers};

/// How mesh data reaches the GPU, fixed for the lifetime of a context.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferStrategy {
    /// Meshes are promoted to GPU-resident vertex/index buffers.
    Resident,
    /// Meshes are drawn straight from host memory.
    Host,
}

impl BufferStrategy {
    /// Picks `Resident` when the backend supports it and it is allowed.
    pub fn select(capabilities: Capabilities, allow_resident: bool) -> Self {
        if allow_resident && capabilities.vertex_buffers {
            BufferStrategy::Resident
        } else {
            BufferStrategy::Host
        }
    }
}

/// Copies the mesh's host data into GPU buffers.
///
/// Creating the buffers leaves them bound, so `buffers_bound` is set.
/// Meshes that already own buffers are left untouched.
pub fn upload_buffers<G: Graphics>(gfx: &mut G, mesh: &mut Mesh, buffers_bound: &mut bool) {
    if mesh.buffers.is_some() {
        return;
    }

    let vertex = gfx.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(&mesh.vertices));
    let index = gfx.create_buffer(BufferTarget::Index, bytemuck::cast_slice(&mesh.indices));

    mesh.buffers = Some(MeshBuffers { vertex, index });
    *buffers_bound = true;
}

/// Deletes the mesh's GPU buffers; later draws use host memory.
pub fn release_buffers<G: Graphics>(gfx: &mut G, mesh: &mut Mesh) {
    if let Some(MeshBuffers { vertex, index }) = mesh.buffers.take() {
        gfx.delete_buffer(vertex);
        gfx.delete_buffer(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::recording::{Call, RecordingGraphics};

    #[test]
    fn strategy_requires_capability_and_permission() {
        let yes = Capabilities { vertex_buffers: true };
        let no = Capabilities { vertex_buffers: false };
        assert_eq!(BufferStrategy::select(yes, true), BufferStrategy::Resident);
        assert_eq!(BufferStrategy::select(yes, false), BufferStrategy::Host);
        assert_eq!(BufferStrategy::select(no, true), BufferStrategy::Host);
    }

    #[test]
    fn upload_creates_sized_buffers_and_marks_bound() {
        let mut g = RecordingGraphics::new(8, 8);
        let mut mesh = Mesh::screen_square();
        let mut bound = false;

        upload_buffers(&mut g, &mut mesh, &mut bound);

        assert!(bound);
        let b = mesh.buffers().unwrap();
        assert_eq!(
            g.calls(),
            &[
                Call::CreateBuffer { buffer: b.vertex, target: BufferTarget::Vertex, len: 20 * 4 },
                Call::CreateBuffer { buffer: b.index, target: BufferTarget::Index, len: 6 * 4 },
            ]
        );
    }

    #[test]
    fn upload_twice_is_a_no_op() {
        let mut g = RecordingGraphics::new(8, 8);
        let mut mesh = Mesh::screen_square();
        let mut bound = false;
        upload_buffers(&mut g, &mut mesh, &mut bound);
        let first = mesh.buffers();
        upload_buffers(&mut g, &mut mesh, &mut bound);
        assert_eq!(mesh.buffers(), first);
        assert_eq!(g.calls().len(), 2);
    }

    #[test]
    fn release_deletes_both_buffers() {
        let mut g = RecordingGraphics::new(8, 8);
        let mut mesh = Mesh::screen_square();
        let mut bound = false;
        upload_buffers(&mut g, &mut mesh, &mut bound);
        let b = mesh.buffers().unwrap();
        g.take_calls();

        release_buffers(&mut g, &mut mesh);

        assert!(mesh.buffers().is_none());
        assert_eq!(g.calls(), &[Call::DeleteBuffer(b.vertex), Call::DeleteBuffer(b.index)]);
        release_buffers(&mut g, &mut mesh);
        assert_eq!(g.calls().len(), 2);
    }
}
