use std::fmt;

use crate::gfx::{ProgramId, ShaderId};
use crate::input::Key;

/// Identifier of a registered pass, unique within its [`PassList`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PassId(u32);

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass#{}", self.0)
    }
}

/// Full-screen effect applied after the scene is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessPass {
    pub id: PassId,
    pub program: ProgramId,
    /// Fragment shader the program was linked from.
    pub shader: ShaderId,
    /// Key that flips `enabled`.
    pub key: Key,
    pub enabled: bool,
}

/// Registered passes in registration order.
///
/// Passes are only ever appended; their order never changes.
#[derive(Debug, Default, Clone)]
pub struct PassList {
    passes: Vec<PostProcessPass>,
    next_id: u32,
}

impl PassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an enabled pass.
    pub fn push(&mut self, program: ProgramId, shader: ShaderId, key: Key) -> PassId {
        let id = PassId(self.next_id);
        self.next_id += 1;
        self.passes.push(PostProcessPass {
            id,
            program,
            shader,
            key,
            enabled: true,
        });
        id
    }

    /// Flips every pass bound to `key`; returns how many were flipped.
    pub fn toggle_key(&mut self, key: Key) -> usize {
        let mut flipped = 0;
        for pass in self.passes.iter_mut().filter(|p| p.key == key) {
            pass.enabled = !pass.enabled;
            log::info!(
                "post-process {} {}",
                pass.id,
                if pass.enabled { "enabled" } else { "disabled" }
            );
            flipped += 1;
        }
        flipped
    }

    pub fn set_enabled(&mut self, id: PassId, enabled: bool) -> bool {
        match self.passes.iter_mut().find(|p| p.id == id) {
            Some(pass) => {
                pass.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: PassId) -> Option<&PostProcessPass> {
        self.passes.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostProcessPass> {
        self.passes.iter()
    }

    /// Programs of the enabled passes, in registration order.
    pub fn enabled_programs(&self) -> Vec<ProgramId> {
        self.passes
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.program)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}
