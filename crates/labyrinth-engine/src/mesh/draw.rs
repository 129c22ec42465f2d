use crate::gfx::{AttribPointer, BufferTarget, Graphics, IndexSource, ProgramId, VertexSource};

use super::Mesh;

/// Draws `mesh` with `program` as one indexed triangle list.
///
/// Meshes with GPU buffers are drawn from those buffers; the others from host
/// memory, after unbinding any buffers left bound by an earlier draw.
/// `buffers_bound` tracks that binding across calls so switching between the
/// two paths only touches buffer bindings when needed.
///
/// Attributes the program does not declare are skipped.
pub fn draw_mesh<G: Graphics>(
    gfx: &mut G,
    program: Option<ProgramId>,
    buffers_bound: &mut bool,
    mesh: &Mesh,
) {
    let Some(program) = program else {
        log::warn!("draw_mesh called without an active program; skipped");
        return;
    };

    let (vertices, indices) = match mesh.buffers() {
        Some(buffers) => {
            gfx.bind_buffer(BufferTarget::Vertex, Some(buffers.vertex));
            gfx.bind_buffer(BufferTarget::Index, Some(buffers.index));
            *buffers_bound = true;
            (VertexSource::Bound, IndexSource::Bound)
        }
        None => {
            if *buffers_bound {
                gfx.bind_buffer(BufferTarget::Vertex, None);
                gfx.bind_buffer(BufferTarget::Index, None);
                *buffers_bound = false;
            }
            (
                VertexSource::Host(mesh.vertices()),
                IndexSource::Host(mesh.indices()),
            )
        }
    };

    let layout = mesh.layout();
    for attr in layout.attributes() {
        let Some(location) = gfx.attrib_location(program, attr.attribute.input_name()) else {
            continue;
        };
        let pointer = AttribPointer {
            components: attr.components,
            stride: layout.stride_bytes(),
            offset: attr.offset_bytes(),
        };
        gfx.vertex_attrib_pointer(location, pointer, vertices);
        gfx.enable_vertex_attrib(location);
    }

    gfx.draw_elements(mesh.index_count(), indices);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::recording::{Call, RecordingGraphics};
    use crate::gfx::ShaderStage;
    use crate::mesh::{upload_buffers, VertexFormat};

    fn program(g: &mut RecordingGraphics, decl: &str) -> ProgramId {
        let vs = g.compile_shader(ShaderStage::Vertex, decl).handle;
        let fs = g.compile_shader(ShaderStage::Fragment, "").handle;
        let p = g.link_program(vs, fs).handle;
        g.use_program(p);
        g.take_calls();
        p
    }

    fn full_mesh() -> Mesh {
        Mesh::new(
            VertexFormat::POSITION | VertexFormat::NORMAL | VertexFormat::TEXCOORD,
            vec![0.0; 8 * 3],
            vec![0, 1, 2],
        )
    }

    // ── attributes ────────────────────────────────────────────────────────

    #[test]
    fn pointers_use_layout_offsets_in_bytes() {
        let mut g = RecordingGraphics::new(8, 8);
        let p = program(&mut g, "in in_position\nin in_normal\nin in_texcoord");
        let mut bound = false;

        draw_mesh(&mut g, Some(p), &mut bound, &full_mesh());

        let pointers: Vec<_> = g
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::AttribPointer { name, pointer, host } => Some((name.clone(), *pointer, *host)),
                _ => None,
            })
            .collect();
        assert_eq!(
            pointers,
            vec![
                ("in_position".into(), AttribPointer { components: 3, stride: 32, offset: 0 }, true),
                ("in_normal".into(), AttribPointer { components: 3, stride: 32, offset: 12 }, true),
                ("in_texcoord".into(), AttribPointer { components: 2, stride: 32, offset: 24 }, true),
            ]
        );
    }

    #[test]
    fn undeclared_attributes_are_skipped() {
        let mut g = RecordingGraphics::new(8, 8);
        let p = program(&mut g, "in in_position");
        let mut bound = false;

        draw_mesh(&mut g, Some(p), &mut bound, &full_mesh());

        let enabled: Vec<_> = g
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::EnableAttrib(n) => Some(n.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(enabled, vec!["in_position"]);
        assert_eq!(g.draws().count(), 1);
    }

    // ── data source ───────────────────────────────────────────────────────

    #[test]
    fn resident_mesh_binds_buffers_and_draws_bound_indices() {
        let mut g = RecordingGraphics::new(8, 8);
        let p = program(&mut g, "in in_position");
        let mut mesh = full_mesh();
        let mut bound = false;
        upload_buffers(&mut g, &mut mesh, &mut bound);
        g.take_calls();

        draw_mesh(&mut g, Some(p), &mut bound, &mesh);

        let b = mesh.buffers().unwrap();
        assert_eq!(g.calls()[0], Call::BindBuffer { target: BufferTarget::Vertex, buffer: Some(b.vertex) });
        assert_eq!(g.calls()[1], Call::BindBuffer { target: BufferTarget::Index, buffer: Some(b.index) });
        let draw = g.draws().next().unwrap();
        assert!(!draw.host_indices);
        assert_eq!(draw.count, 3);
        assert!(bound);
    }

    #[test]
    fn host_mesh_unbinds_stale_buffers_once() {
        let mut g = RecordingGraphics::new(8, 8);
        let p = program(&mut g, "in in_position");
        let mesh = full_mesh();
        let mut bound = true;

        draw_mesh(&mut g, Some(p), &mut bound, &mesh);
        draw_mesh(&mut g, Some(p), &mut bound, &mesh);

        let unbinds = g
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::BindBuffer { buffer: None, .. }))
            .count();
        assert_eq!(unbinds, 2);
        assert!(!bound);
        assert!(g.draws().all(|d| d.host_indices));
    }

    #[test]
    fn host_mesh_without_bound_buffers_skips_unbind() {
        let mut g = RecordingGraphics::new(8, 8);
        let p = program(&mut g, "in in_position");
        let mut bound = false;

        draw_mesh(&mut g, Some(p), &mut bound, &full_mesh());

        assert!(!g.calls().iter().any(|c| matches!(c, Call::BindBuffer { .. })));
    }

    #[test]
    fn no_program_no_draw() {
        let mut g = RecordingGraphics::new(8, 8);
        let mut bound = false;
        draw_mesh(&mut g, None, &mut bound, &full_mesh());
        assert!(g.calls().is_empty());
    }
}
