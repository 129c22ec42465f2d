//! Stereo 3D rendering modes.
//!
//! The mode only adjusts per-eye state (color mask or viewport). How many
//! times the scene is drawn per frame is decided by the caller:
//!
//! ```text
//! if mode != Off { mode.left(); draw; mode.right(); draw; mode.reset(); }
//! ```

use std::fmt;

use crate::gfx::{ClearMask, ColorMask, Graphics, Viewport};

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum StereoMode {
    #[default]
    Off,
    /// Red/cyan: left eye writes red, right eye writes green and blue.
    Anaglyph,
    /// Left eye on the left half of the screen, right eye on the right half.
    SideBySide,
}

impl StereoMode {
    /// Next mode in the cycle `Off -> Anaglyph -> SideBySide -> Off`.
    pub fn next(self) -> Self {
        match self {
            StereoMode::Off => StereoMode::Anaglyph,
            StereoMode::Anaglyph => StereoMode::SideBySide,
            StereoMode::SideBySide => StereoMode::Off,
        }
    }

    /// Restores the state changed by [`left`](Self::left) and [`right`](Self::right).
    pub fn reset<G: Graphics>(self, gfx: &mut G, screen: [u32; 2]) {
        match self {
            StereoMode::Off => {}
            StereoMode::Anaglyph => gfx.color_mask(ColorMask::ALL),
            StereoMode::SideBySide => gfx.viewport(Viewport::full(screen)),
        }
    }

    /// Prepares state for drawing the left eye.
    pub fn left<G: Graphics>(self, gfx: &mut G, screen: [u32; 2]) {
        match self {
            StereoMode::Off => {}
            StereoMode::Anaglyph => {
                gfx.color_mask(ColorMask::RED);
                gfx.clear(ClearMask::DEPTH);
            }
            StereoMode::SideBySide => {
                let [w, h] = screen;
                gfx.viewport(Viewport::new(0, 0, w / 2, h));
            }
        }
    }

    /// Prepares state for drawing the right eye.
    pub fn right<G: Graphics>(self, gfx: &mut G, screen: [u32; 2]) {
        match self {
            StereoMode::Off => {}
            StereoMode::Anaglyph => {
                gfx.color_mask(ColorMask::GREEN_BLUE);
                gfx.clear(ClearMask::DEPTH);
            }
            StereoMode::SideBySide => {
                let [w, h] = screen;
                gfx.viewport(Viewport::new(w / 2, 0, w / 2, h));
            }
        }
    }
}

impl fmt::Display for StereoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StereoMode::Off => f.write_str("off"),
            StereoMode::Anaglyph => f.write_str("anaglyph"),
            StereoMode::SideBySide => f.write_str("side-by-side"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::recording::{Call, RecordingGraphics};

    const SCREEN: [u32; 2] = [1280, 800];

    #[test]
    fn cycle_returns_to_off() {
        let m = StereoMode::default();
        assert_eq!(m, StereoMode::Off);
        assert_eq!(m.next(), StereoMode::Anaglyph);
        assert_eq!(m.next().next(), StereoMode::SideBySide);
        assert_eq!(m.next().next().next(), StereoMode::Off);
    }

    // ── hooks ─────────────────────────────────────────────────────────────

    #[test]
    fn off_hooks_do_nothing() {
        let mut g = RecordingGraphics::new(8, 8);
        StereoMode::Off.left(&mut g, SCREEN);
        StereoMode::Off.right(&mut g, SCREEN);
        StereoMode::Off.reset(&mut g, SCREEN);
        assert!(g.calls().is_empty());
    }

    #[test]
    fn anaglyph_masks_channels_and_clears_depth() {
        let mut g = RecordingGraphics::new(8, 8);

        StereoMode::Anaglyph.left(&mut g, SCREEN);
        assert_eq!(
            g.take_calls(),
            vec![Call::ColorMask(ColorMask::RED), Call::Clear(ClearMask::DEPTH)]
        );

        StereoMode::Anaglyph.right(&mut g, SCREEN);
        assert_eq!(
            g.take_calls(),
            vec![Call::ColorMask(ColorMask::GREEN_BLUE), Call::Clear(ClearMask::DEPTH)]
        );

        StereoMode::Anaglyph.reset(&mut g, SCREEN);
        assert_eq!(g.take_calls(), vec![Call::ColorMask(ColorMask::ALL)]);
    }

    #[test]
    fn side_by_side_splits_viewport() {
        let mut g = RecordingGraphics::new(8, 8);

        StereoMode::SideBySide.left(&mut g, SCREEN);
        StereoMode::SideBySide.right(&mut g, SCREEN);
        StereoMode::SideBySide.reset(&mut g, SCREEN);

        assert_eq!(
            g.calls(),
            &[
                Call::Viewport(Viewport::new(0, 0, 640, 800)),
                Call::Viewport(Viewport::new(640, 0, 640, 800)),
                Call::Viewport(Viewport::new(0, 0, 1280, 800)),
            ]
        );
    }
}
