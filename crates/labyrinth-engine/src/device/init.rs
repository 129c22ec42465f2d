/// Device and surface parameters for [`super::WgpuGraphics`].
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB swapchain format when one is offered.
    ///
    /// Off by default: post-processing writes final values without gamma
    /// encoding, so a linear swapchain shows them unchanged.
    pub prefer_srgb: bool,

    pub present_mode: wgpu::PresentMode,

    /// Falls back to the first supported mode when unset or unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,

    /// The backend itself needs no optional features.
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Frames the CPU may queue ahead of the display.
    pub desired_maximum_frame_latency: u32,

    /// Report GPU-resident vertex buffers as available.
    ///
    /// Turning this off forces the host-memory vertex path.
    pub vertex_buffers: bool,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
            vertex_buffers: true,
        }
    }
}
