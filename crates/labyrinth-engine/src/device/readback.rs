use std::sync::mpsc;

use crate::gfx::CapturedFrame;

/// Channel order of a readable swapchain format.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum ByteOrder {
    Rgba,
    Bgra,
}

impl ByteOrder {
    pub fn of(format: wgpu::TextureFormat) -> Option<Self> {
        match format {
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => {
                Some(Self::Rgba)
            }
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => {
                Some(Self::Bgra)
            }
            _ => None,
        }
    }
}

pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    (width * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

/// Copy of the swapchain image waiting for its buffer mapping.
pub(crate) struct Readback {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    order: ByteOrder,
    mapped: Option<mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>>,
}

impl Readback {
    /// Records a copy of `texture` into a new readback buffer.
    pub fn encode(
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
        order: ByteOrder,
    ) -> Self {
        let width = texture.width();
        let height = texture.height();
        let bytes_per_row = padded_bytes_per_row(width);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("labyrinth screenshot readback"),
            size: u64::from(bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        Self {
            buffer,
            width,
            height,
            order,
            mapped: None,
        }
    }

    /// Starts mapping; call after the copy has been submitted.
    pub fn map(&mut self) {
        let (tx, rx) = mpsc::channel();
        self.buffer
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        self.mapped = Some(rx);
    }

    /// Non-blocking check. `Some` once the mapping has finished or failed.
    pub fn try_finish(&self) -> Option<Result<CapturedFrame, wgpu::BufferAsyncError>> {
        let rx = self.mapped.as_ref()?;
        match rx.try_recv() {
            Ok(Ok(())) => {
                let rgb = {
                    let data = self.buffer.slice(..).get_mapped_range();
                    unpack_rows(&data, self.width, self.height, self.order)
                };
                self.buffer.unmap();
                Some(Ok(CapturedFrame {
                    width: self.width,
                    height: self.height,
                    rgb,
                }))
            }
            Ok(Err(e)) => Some(Err(e)),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(wgpu::BufferAsyncError)),
        }
    }
}

/// Converts padded 8-bit rows to float RGB, dropping alpha.
pub(crate) fn unpack_rows(data: &[u8], width: u32, height: u32, order: ByteOrder) -> Vec<f32> {
    let row_bytes = padded_bytes_per_row(width) as usize;
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for row in data.chunks(row_bytes).take(height as usize) {
        for px in row[..(width * 4) as usize].chunks_exact(4) {
            let (r, g, b) = match order {
                ByteOrder::Rgba => (px[0], px[1], px[2]),
                ByteOrder::Bgra => (px[2], px[1], px[0]),
            };
            rgb.extend([r, g, b].map(|c| f32::from(c) / 255.0));
        }
    }
    rgb
}
