//! Per-frame upload arenas.
//!
//! Uniform snapshots and host-memory vertex/index data are appended to a CPU
//! byte arena while the frame is recorded, then written to one GPU buffer per
//! arena at present. Draws refer to their data by byte offset.

/// Append-only byte buffer with aligned allocations.
#[derive(Debug)]
pub(crate) struct ByteArena {
    data: Vec<u8>,
    align: usize,
}

impl ByteArena {
    pub fn new(align: usize) -> Self {
        Self {
            data: Vec::new(),
            align: align.max(4),
        }
    }

    /// Appends `bytes` at the next aligned offset and returns that offset.
    pub fn push(&mut self, bytes: &[u8]) -> u64 {
        let offset = self.data.len().next_multiple_of(self.align);
        self.data.resize(offset, 0);
        self.data.extend_from_slice(bytes);
        offset as u64
    }

    /// Size rounded up to the copy alignment.
    pub fn padded_len(&self) -> u64 {
        (self.data.len() as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// GPU side of a [`ByteArena`]; the buffer only grows.
pub(crate) struct GpuArena {
    label: &'static str,
    usage: wgpu::BufferUsages,
    pub bytes: ByteArena,
    buffer: Option<wgpu::Buffer>,
    /// Bumped whenever the buffer is reallocated; bind groups built against an
    /// older generation are stale.
    generation: u64,
}

impl GpuArena {
    pub fn new(label: &'static str, usage: wgpu::BufferUsages, align: usize) -> Self {
        Self {
            label,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            bytes: ByteArena::new(align),
            buffer: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    /// Writes the recorded bytes to the GPU buffer, growing it if needed.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.bytes.is_empty() {
            return;
        }
        let needed = self.bytes.padded_len();
        let capacity = self.buffer.as_ref().map_or(0, |b| b.size());
        if needed > capacity {
            let size = needed.max(capacity * 2).next_power_of_two();
            log::debug!("{}: growing to {size} bytes", self.label);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size,
                usage: self.usage,
                mapped_at_creation: false,
            }));
            self.generation += 1;
        }

        if let Some(buffer) = &self.buffer {
            let mut data = std::mem::take(&mut self.bytes.data);
            data.resize(needed as usize, 0);
            queue.write_buffer(buffer, 0, &data);
            self.bytes.data = data;
        }
    }
}
