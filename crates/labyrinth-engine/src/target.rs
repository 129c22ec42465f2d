//! Offscreen render targets.

use crate::gfx::{
    DrawTarget, FramebufferId, Graphics, RenderbufferId, TextureDesc, TextureId, TextureKind,
};

/// Framebuffer with a float color image and a depth buffer, both screen-sized.
///
/// Targets are created once at startup and live as long as the context; there
/// is no resize path.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderTarget {
    pub framebuffer: FramebufferId,
    pub image: TextureId,
    pub depth: RenderbufferId,
}

impl RenderTarget {
    /// Allocates a target of `size` pixels.
    ///
    /// Color storage is allocated without initial contents. The framebuffer is
    /// left bound as the draw target.
    pub fn create<G: Graphics>(gfx: &mut G, size: [u32; 2]) -> Self {
        let [width, height] = size;

        let framebuffer = gfx.create_framebuffer();
        gfx.bind_framebuffer(DrawTarget::Framebuffer(framebuffer));

        let image = gfx.create_texture(
            TextureDesc {
                width,
                height,
                kind: TextureKind::RenderTarget,
            },
            None,
        );
        gfx.attach_color(framebuffer, image);

        let depth = gfx.create_depth_buffer(width, height);
        gfx.attach_depth(framebuffer, depth);

        Self {
            framebuffer,
            image,
            depth,
        }
    }

    #[inline]
    pub fn draw_target(&self) -> DrawTarget {
        DrawTarget::Framebuffer(self.framebuffer)
    }
}
