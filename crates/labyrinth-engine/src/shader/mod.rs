//! Shader compilation and program linking.
//!
//! Failures are reported through the log and never abort: the backend handle
//! is returned regardless and a broken program simply draws nothing.

mod error;

pub use error::ShaderDiagnostic;

use anyhow::Result;

use crate::assets::{AssetCategory, Assets};
use crate::gfx::{Graphics, ProgramId, ShaderId, ShaderStage};

/// Compiles one stage from source. `label` names the shader in diagnostics.
pub fn compile_shader<G: Graphics>(
    gfx: &mut G,
    stage: ShaderStage,
    source: &str,
    label: &str,
) -> ShaderId {
    let compiled = gfx.compile_shader(stage, source);
    if let Some(log) = compiled.log {
        ShaderDiagnostic::Compile {
            stage,
            label: label.to_owned(),
            log,
        }
        .report();
    } else {
        log::debug!("compiled {stage} shader {label} as {}", compiled.handle);
    }
    compiled.handle
}

/// Links a vertex and a fragment shader into a program.
pub fn link_program<G: Graphics>(
    gfx: &mut G,
    vertex: ShaderId,
    fragment: ShaderId,
    label: &str,
) -> ProgramId {
    let linked = gfx.link_program(vertex, fragment);
    if let Some(log) = linked.log {
        ShaderDiagnostic::Link {
            label: label.to_owned(),
            log,
        }
        .report();
    }
    linked.handle
}

/// Reads `name` from the shader root and compiles it.
///
/// Only a missing or unreadable file is an error; compile failures are logged.
pub fn load_shader<G: Graphics>(
    gfx: &mut G,
    assets: &Assets,
    stage: ShaderStage,
    name: &str,
) -> Result<ShaderId> {
    let source = assets.read_text(AssetCategory::Shader, name)?;
    Ok(compile_shader(gfx, stage, &source, name))
}

/// Loads both stages from the shader root and links them.
pub fn load_program<G: Graphics>(
    gfx: &mut G,
    assets: &Assets,
    vertex: &str,
    fragment: &str,
) -> Result<ProgramId> {
    let vs = load_shader(gfx, assets, ShaderStage::Vertex, vertex)?;
    let fs = load_shader(gfx, assets, ShaderStage::Fragment, fragment)?;
    Ok(link_program(gfx, vs, fs, &format!("{vertex} + {fragment}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::recording::{Call, RecordingGraphics};

    fn shader_dir(files: &[(&str, &str)]) -> (tempfile::TempDir, Assets) {
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets::from_root(dir.path());
        std::fs::create_dir_all(&assets.shader_root).unwrap();
        for (name, text) in files {
            std::fs::write(assets.shader_root.join(name), text).unwrap();
        }
        (dir, assets)
    }

    // ── non-fatal failures ────────────────────────────────────────────────

    #[test]
    fn failed_compile_returns_handle() {
        let mut g = RecordingGraphics::new(4, 4);
        let id = compile_shader(&mut g, ShaderStage::Fragment, "error oops", "bad.wgsl");
        assert_eq!(
            g.calls(),
            &[Call::CompileShader { shader: id, stage: ShaderStage::Fragment, ok: false }]
        );
    }

    #[test]
    fn failed_link_returns_usable_handle() {
        let mut g = RecordingGraphics::new(4, 4);
        let vs = compile_shader(&mut g, ShaderStage::Vertex, "error oops", "v");
        let fs = compile_shader(&mut g, ShaderStage::Fragment, "", "f");
        let p = link_program(&mut g, vs, fs, "v + f");

        g.use_program(p);
        assert_eq!(g.current_program(), Some(p));
        assert!(g.uniform_location(p, "MVPMatrix").is_none());
    }

    #[test]
    fn diagnostic_text_names_stage_and_label() {
        let d = ShaderDiagnostic::Compile {
            stage: ShaderStage::Vertex,
            label: "maze.vert.wgsl".into(),
            log: "0:3: error".into(),
        };
        assert_eq!(d.to_string(), "failed to compile vertex shader maze.vert.wgsl:\n0:3: error");
        assert_eq!(d.log(), "0:3: error");

        let d = ShaderDiagnostic::Link { label: "p".into(), log: "x".into() };
        assert_eq!(d.to_string(), "failed to link program p:\nx");
    }

    // ── file loading ──────────────────────────────────────────────────────

    #[test]
    fn load_program_links_both_files() {
        let (_dir, assets) = shader_dir(&[
            ("scene.vert.wgsl", "uniform MVPMatrix\nin in_position"),
            ("scene.frag.wgsl", "uniform screen_size"),
        ]);
        let mut g = RecordingGraphics::new(4, 4);

        let p = load_program(&mut g, &assets, "scene.vert.wgsl", "scene.frag.wgsl").unwrap();

        assert!(g.uniform_location(p, "MVPMatrix").is_some());
        assert!(g.uniform_location(p, "screen_size").is_some());
    }

    #[test]
    fn missing_file_is_an_error() {
        let (_dir, assets) = shader_dir(&[("scene.vert.wgsl", "")]);
        let mut g = RecordingGraphics::new(4, 4);

        let err = load_program(&mut g, &assets, "scene.vert.wgsl", "nope.frag.wgsl").unwrap_err();
        assert!(format!("{err:#}").contains("nope.frag.wgsl"));
    }

    #[test]
    fn broken_source_is_not_an_error() {
        let (_dir, assets) = shader_dir(&[("broken.frag.wgsl", "error unexpected token")]);
        let mut g = RecordingGraphics::new(4, 4);

        assert!(load_shader(&mut g, &assets, ShaderStage::Fragment, "broken.frag.wgsl").is_ok());
    }
}
