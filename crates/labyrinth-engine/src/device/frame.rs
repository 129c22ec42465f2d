//! Frame recording: the command stream is grouped into render passes.
//!
//! A pass covers consecutive commands aimed at one target. Clearing a target
//! whose current pass has no draws yet folds into that pass's load ops;
//! otherwise it opens a new pass.

use crate::gfx::{ClearMask, DrawTarget};

#[derive(Debug)]
pub(crate) struct PassRecord<D> {
    pub target: DrawTarget,
    pub clear: ClearMask,
    pub draws: Vec<D>,
}

#[derive(Debug)]
pub(crate) struct FramePlan<D> {
    passes: Vec<PassRecord<D>>,
}

impl<D> Default for FramePlan<D> {
    fn default() -> Self {
        Self { passes: Vec::new() }
    }
}

impl<D> FramePlan<D> {
    pub fn clear(&mut self, target: DrawTarget, mask: ClearMask) {
        match self.passes.last_mut() {
            Some(pass) if pass.target == target && pass.draws.is_empty() => {
                pass.clear.color |= mask.color;
                pass.clear.depth |= mask.depth;
            }
            _ => self.passes.push(PassRecord {
                target,
                clear: mask,
                draws: Vec::new(),
            }),
        }
    }

    pub fn draw(&mut self, target: DrawTarget, draw: D) {
        match self.passes.last_mut() {
            Some(pass) if pass.target == target => pass.draws.push(draw),
            _ => self.passes.push(PassRecord {
                target,
                clear: ClearMask {
                    color: false,
                    depth: false,
                },
                draws: vec![draw],
            }),
        }
    }

    pub fn passes(&self) -> &[PassRecord<D>] {
        &self.passes
    }

    pub fn take(&mut self) -> Vec<PassRecord<D>> {
        std::mem::take(&mut self.passes)
    }
}
