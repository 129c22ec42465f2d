//! Asset path resolution.
//!
//! Assets are looked up by bare file name inside a per-category root
//! directory; callers never build paths themselves.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Kind of asset, selecting the root directory a name resolves against.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AssetCategory {
    Shader,
    Texture,
}

/// Root directories for every asset category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assets {
    pub shader_root: PathBuf,
    pub texture_root: PathBuf,
}

impl Default for Assets {
    fn default() -> Self {
        Self::from_root("assets")
    }
}

impl Assets {
    /// Uses `<root>/shaders` and `<root>/textures`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            shader_root: root.join("shaders"),
            texture_root: root.join("textures"),
        }
    }

    pub fn root(&self, category: AssetCategory) -> &Path {
        match category {
            AssetCategory::Shader => &self.shader_root,
            AssetCategory::Texture => &self.texture_root,
        }
    }

    /// Full path of `name` in `category`.
    pub fn resolve(&self, category: AssetCategory, name: &str) -> PathBuf {
        self.root(category).join(name)
    }

    /// Reads `name` in `category` as UTF-8 text.
    pub fn read_text(&self, category: AssetCategory, name: &str) -> Result<String> {
        let path = self.resolve(category, name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}
