//! Well-known uniforms populated automatically.
//!
//! Each time a program becomes active, or the modelview matrix changes, every
//! name in [`names`] that the active program declares is recomputed and
//! uploaded. Names the program does not declare are skipped silently.

mod gauss;

pub use gauss::{GAUSS_SIGMA, GAUSS_TAPS, gauss_kernel};

use glam::Mat4;

use crate::gfx::{Graphics, ProgramId, UniformValue};

pub mod names {
    pub const MODELVIEW: &str = "MVMatrix";
    pub const MODELVIEW_PROJECTION: &str = "MVPMatrix";
    pub const GAUSS_VALUES: &str = "gaussValues";
    pub const SCREEN_SIZE: &str = "screen_size";

    pub const ALL: [&str; 4] = [MODELVIEW, MODELVIEW_PROJECTION, GAUSS_VALUES, SCREEN_SIZE];
}

/// Values the binder derives uniforms from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UniformInputs {
    pub modelview: Mat4,
    pub projection: Mat4,
    /// Screen size in pixels.
    pub screen_size: [u32; 2],
}

/// Uploads every well-known uniform `program` declares.
///
/// `program` must be the program in use. The MVP product is recomputed on
/// every call.
pub fn bind_uniforms<G: Graphics>(gfx: &mut G, program: ProgramId, inputs: &UniformInputs) {
    if let Some(loc) = gfx.uniform_location(program, names::MODELVIEW) {
        let mv = inputs.modelview.to_cols_array();
        gfx.set_uniform(loc, UniformValue::Mat4(&mv));
    }

    if let Some(loc) = gfx.uniform_location(program, names::MODELVIEW_PROJECTION) {
        let mvp = (inputs.projection * inputs.modelview).to_cols_array();
        gfx.set_uniform(loc, UniformValue::Mat4(&mvp));
    }

    if let Some(loc) = gfx.uniform_location(program, names::GAUSS_VALUES) {
        let kernel = gauss_kernel(GAUSS_SIGMA);
        gfx.set_uniform(loc, UniformValue::Vec2Array(&kernel));
    }

    if let Some(loc) = gfx.uniform_location(program, names::SCREEN_SIZE) {
        let [w, h] = inputs.screen_size;
        gfx.set_uniform(loc, UniformValue::IVec2([w as i32, h as i32]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::recording::{RecordedUniform, RecordingGraphics};
    use crate::gfx::ShaderStage;
    use glam::Vec3;

    fn active(g: &mut RecordingGraphics, decl: &str) -> ProgramId {
        let vs = g.compile_shader(ShaderStage::Vertex, decl).handle;
        let fs = g.compile_shader(ShaderStage::Fragment, "").handle;
        let p = g.link_program(vs, fs).handle;
        g.use_program(p);
        p
    }

    fn inputs() -> UniformInputs {
        UniformInputs {
            modelview: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            projection: Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0)),
            screen_size: [1280, 800],
        }
    }

    // ── presence ──────────────────────────────────────────────────────────

    #[test]
    fn undeclared_names_get_no_upload() {
        let mut g = RecordingGraphics::new(4, 4);
        let p = active(&mut g, "uniform MVPMatrix");

        bind_uniforms(&mut g, p, &inputs());

        assert_eq!(g.uniform_uploads(names::MODELVIEW_PROJECTION).count(), 1);
        for name in [names::MODELVIEW, names::GAUSS_VALUES, names::SCREEN_SIZE] {
            assert_eq!(g.uniform_uploads(name).count(), 0, "{name}");
        }
    }

    #[test]
    fn program_without_uniforms_uploads_nothing() {
        let mut g = RecordingGraphics::new(4, 4);
        let p = active(&mut g, "in in_position");
        g.take_calls();

        bind_uniforms(&mut g, p, &inputs());

        assert!(g.calls().is_empty());
    }

    // ── values ────────────────────────────────────────────────────────────

    #[test]
    fn mvp_is_projection_times_modelview() {
        let mut g = RecordingGraphics::new(4, 4);
        let p = active(&mut g, "uniform MVMatrix\nuniform MVPMatrix");
        let i = inputs();

        bind_uniforms(&mut g, p, &i);

        let mv = g.uniform_uploads(names::MODELVIEW).next().cloned();
        let mvp = g.uniform_uploads(names::MODELVIEW_PROJECTION).next().cloned();
        assert_eq!(mv, Some(RecordedUniform::Mat4(i.modelview.to_cols_array())));
        assert_eq!(
            mvp,
            Some(RecordedUniform::Mat4((i.projection * i.modelview).to_cols_array()))
        );
    }

    #[test]
    fn mvp_follows_modelview_changes() {
        let mut g = RecordingGraphics::new(4, 4);
        let p = active(&mut g, "uniform MVPMatrix");
        let mut i = inputs();

        bind_uniforms(&mut g, p, &i);
        i.modelview = Mat4::IDENTITY;
        bind_uniforms(&mut g, p, &i);

        let uploads: Vec<_> = g.uniform_uploads(names::MODELVIEW_PROJECTION).cloned().collect();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[1], RecordedUniform::Mat4(i.projection.to_cols_array()));
    }

    #[test]
    fn gauss_and_screen_size_values() {
        let mut g = RecordingGraphics::new(4, 4);
        let p = active(&mut g, "uniform gaussValues\nuniform screen_size");

        bind_uniforms(&mut g, p, &inputs());

        assert_eq!(
            g.uniform_uploads(names::GAUSS_VALUES).next(),
            Some(&RecordedUniform::Vec2Array(gauss_kernel(GAUSS_SIGMA).to_vec()))
        );
        assert_eq!(
            g.uniform_uploads(names::SCREEN_SIZE).next(),
            Some(&RecordedUniform::IVec2([1280, 800]))
        );
    }
}
