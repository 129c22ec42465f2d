//! Backend resource tables and texture creation helpers.

use crate::gfx::{RenderbufferId, ShaderStage, TextureDesc, TextureId, TextureKind};

use super::reflect::{
    SAMPLER_BINDING, StageInterface, TEXTURE_BINDING, UniformSlot, VertexInput,
};

/// Color format of render-target images (filterable float).
pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Format of images loaded from disk.
pub(crate) const SAMPLED_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub(crate) struct ShaderEntry {
    pub stage: ShaderStage,
    /// `None` when compilation failed.
    pub compiled: Option<CompiledStage>,
}

pub(crate) struct CompiledStage {
    pub module: wgpu::ShaderModule,
    pub interface: StageInterface,
}

/// Successfully linked program.
///
/// Uniform values are kept per slot and persist across draws until
/// overwritten; each draw snapshots them into the frame's uniform arena.
pub(crate) struct LinkedProgram {
    pub vertex: wgpu::ShaderModule,
    pub vertex_entry: String,
    pub fragment: wgpu::ShaderModule,
    pub fragment_entry: String,
    pub uniforms: Vec<UniformSlot>,
    pub values: Vec<Vec<u8>>,
    pub inputs: Vec<VertexInput>,
    pub samples_texture: bool,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub layout: wgpu::PipelineLayout,
    /// Group 0 bind group and the uniform arena generation it was built for.
    pub uniform_group: Option<(u64, wgpu::BindGroup)>,
}

pub(crate) struct TextureEntry {
    pub kind: TextureKind,
    pub size: [u32; 2],
    pub format: wgpu::TextureFormat,
    pub view: wgpu::TextureView,
    // Kept so the image outlives every view and bind group built from it.
    _texture: wgpu::Texture,
}

pub(crate) struct DepthEntry {
    pub size: [u32; 2],
    pub view: wgpu::TextureView,
    _texture: wgpu::Texture,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FramebufferEntry {
    pub color: Option<TextureId>,
    pub depth: Option<RenderbufferId>,
}

/// Creates a color image. Sampled images are uploaded from float RGB; render
/// targets start zeroed.
pub(crate) fn create_color_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    desc: TextureDesc,
    rgb: Option<&[f32]>,
) -> TextureEntry {
    let (format, usage, label) = match desc.kind {
        TextureKind::Sampled => (
            SAMPLED_FORMAT,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            "labyrinth sampled image",
        ),
        TextureKind::RenderTarget => (
            TARGET_FORMAT,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT,
            "labyrinth render target",
        ),
    };
    let width = desc.width.max(1);
    let height = desc.height.max(1);
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });

    if let (TextureKind::Sampled, Some(rgb)) = (desc.kind, rgb) {
        let texels = rgb_to_rgba8(rgb, (width * height) as usize);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    TextureEntry {
        kind: desc.kind,
        size: [width, height],
        format,
        view,
        _texture: texture,
    }
}

pub(crate) fn create_depth_texture(device: &wgpu::Device, size: [u32; 2]) -> DepthEntry {
    let size = [size[0].max(1), size[1].max(1)];
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("labyrinth depth"),
        size: wgpu::Extent3d {
            width: size[0],
            height: size[1],
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    DepthEntry {
        size,
        view,
        _texture: texture,
    }
}

/// Converts float RGB texels to RGBA8, clamping to `[0, 1]`.
///
/// Missing texels are filled with opaque black.
pub(crate) fn rgb_to_rgba8(rgb: &[f32], texels: usize) -> Vec<u8> {
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut out = Vec::with_capacity(texels * 4);
    for px in rgb.chunks_exact(3).take(texels) {
        out.extend_from_slice(&[to_u8(px[0]), to_u8(px[1]), to_u8(px[2]), 255]);
    }
    while out.len() < texels * 4 {
        out.extend_from_slice(&[0, 0, 0, 255]);
    }
    out
}

/// Group 0 layout: one dynamic-offset uniform buffer per slot.
pub(crate) fn create_uniform_layout(
    device: &wgpu::Device,
    slots: &[UniformSlot],
) -> wgpu::BindGroupLayout {
    let entries: Vec<_> = slots
        .iter()
        .map(|slot| wgpu::BindGroupLayoutEntry {
            binding: slot.binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: None,
            },
            count: None,
        })
        .collect();

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("labyrinth uniforms"),
        entries: &entries,
    })
}

/// Group 1 layout: the sampled image and its sampler.
pub(crate) fn create_texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("labyrinth texture"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: TEXTURE_BINDING,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: SAMPLER_BINDING,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Linear filtering; sampled images repeat, render targets clamp.
pub(crate) fn create_sampler(device: &wgpu::Device, kind: TextureKind) -> wgpu::Sampler {
    let address_mode = match kind {
        TextureKind::Sampled => wgpu::AddressMode::Repeat,
        TextureKind::RenderTarget => wgpu::AddressMode::ClampToEdge,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("labyrinth sampler"),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

pub(crate) fn create_texture_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("labyrinth texture group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: TEXTURE_BINDING,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: SAMPLER_BINDING,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
