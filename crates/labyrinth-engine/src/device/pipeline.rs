use crate::gfx::{AttribPointer, ColorMask, ProgramId};

use super::resources::{DEPTH_FORMAT, LinkedProgram};

/// One vertex buffer slot; every attribute gets its own slot so the buffer
/// slice offset carries the attribute offset.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub(crate) struct VertexSlot {
    pub location: u32,
    pub format: wgpu::VertexFormat,
    pub stride: u64,
}

impl VertexSlot {
    /// Returns `None` for component counts wgpu has no float format for.
    pub fn from_pointer(location: u32, pointer: AttribPointer) -> Option<Self> {
        let format = match pointer.components {
            1 => wgpu::VertexFormat::Float32,
            2 => wgpu::VertexFormat::Float32x2,
            3 => wgpu::VertexFormat::Float32x3,
            4 => wgpu::VertexFormat::Float32x4,
            _ => return None,
        };
        // Zero stride means tightly packed.
        let stride = if pointer.stride == 0 {
            format.size()
        } else {
            u64::from(pointer.stride)
        };
        Some(Self {
            location,
            format,
            stride,
        })
    }
}

/// Everything a render pipeline depends on.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub(crate) struct PipelineKey {
    pub program: ProgramId,
    pub vertex: Vec<VertexSlot>,
    pub format: wgpu::TextureFormat,
    pub depth: bool,
    pub depth_write: bool,
    pub color_mask: ColorMask,
}

pub(crate) fn color_writes(mask: ColorMask) -> wgpu::ColorWrites {
    let mut writes = wgpu::ColorWrites::empty();
    if mask.r {
        writes |= wgpu::ColorWrites::RED;
    }
    if mask.g {
        writes |= wgpu::ColorWrites::GREEN;
    }
    if mask.b {
        writes |= wgpu::ColorWrites::BLUE;
    }
    if mask.a {
        writes |= wgpu::ColorWrites::ALPHA;
    }
    writes
}

/// Builds the pipeline for `key`: triangle lists, no culling, alpha
/// blending and a `Less` depth test when the target has depth.
pub(crate) fn build_pipeline(
    device: &wgpu::Device,
    key: &PipelineKey,
    program: &LinkedProgram,
) -> wgpu::RenderPipeline {
    let attributes: Vec<[wgpu::VertexAttribute; 1]> = key
        .vertex
        .iter()
        .map(|slot| {
            [wgpu::VertexAttribute {
                format: slot.format,
                offset: 0,
                shader_location: slot.location,
            }]
        })
        .collect();
    let buffers: Vec<wgpu::VertexBufferLayout> = key
        .vertex
        .iter()
        .zip(&attributes)
        .map(|(slot, attributes)| wgpu::VertexBufferLayout {
            array_stride: slot.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        })
        .collect();

    let label = format!("labyrinth pipeline {}", key.program);
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(&program.layout),
        vertex: wgpu::VertexState {
            module: &program.vertex,
            entry_point: Some(&program.vertex_entry),
            compilation_options: Default::default(),
            buffers: &buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &program.fragment,
            entry_point: Some(&program.fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: color_writes(key.color_mask),
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: key.depth.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: key.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_masks_map_to_channels() {
        assert_eq!(color_writes(ColorMask::ALL), wgpu::ColorWrites::ALL);
        assert_eq!(color_writes(ColorMask::RED), wgpu::ColorWrites::RED);
        assert_eq!(
            color_writes(ColorMask::GREEN_BLUE),
            wgpu::ColorWrites::GREEN | wgpu::ColorWrites::BLUE
        );
    }

    #[test]
    fn vertex_slot_from_interleaved_pointer() {
        let slot = VertexSlot::from_pointer(
            2,
            AttribPointer {
                components: 2,
                stride: 32,
                offset: 24,
            },
        )
        .unwrap();
        assert_eq!(slot.format, wgpu::VertexFormat::Float32x2);
        assert_eq!(slot.stride, 32);
        assert_eq!(slot.location, 2);
    }

    #[test]
    fn zero_stride_means_packed() {
        let pointer = AttribPointer {
            components: 3,
            stride: 0,
            offset: 0,
        };
        assert_eq!(VertexSlot::from_pointer(0, pointer).unwrap().stride, 12);
        let bad = AttribPointer {
            components: 5,
            ..pointer
        };
        assert!(VertexSlot::from_pointer(0, bad).is_none());
    }
}
