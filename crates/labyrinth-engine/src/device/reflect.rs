//! WGSL front end: validation and interface reflection.
//!
//! Shaders address resources by name like classic GL programs. The interface
//! convention is:
//!
//! - every `var<uniform>` lives in `@group(0)`, one binding per uniform
//! - a sampled image uses `@group(1) @binding(0)` (texture) and
//!   `@group(1) @binding(1)` (sampler)
//! - vertex inputs are `@location(n)` entry point arguments (or struct members)
//!   named like the mesh attributes (`in_position`, ...)

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Module, ShaderStage as NagaStage, TypeInner};

use crate::gfx::ShaderStage;

pub(crate) const UNIFORM_GROUP: u32 = 0;
pub(crate) const TEXTURE_GROUP: u32 = 1;
pub(crate) const TEXTURE_BINDING: u32 = 0;
pub(crate) const SAMPLER_BINDING: u32 = 1;

/// Uniform buffer binding in group 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformSlot {
    pub name: String,
    pub binding: u32,
    /// Size of the WGSL type in bytes.
    pub size: u32,
    /// Element stride for array uniforms.
    pub array_stride: Option<u32>,
    /// Element count for fixed-size array uniforms.
    pub array_len: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VertexInput {
    pub name: String,
    pub location: u32,
}

/// Everything the backend needs to know about one compiled stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StageInterface {
    pub entry_point: String,
    pub uniforms: Vec<UniformSlot>,
    pub samples_texture: bool,
    /// Named `@location` inputs of the entry point.
    pub inputs: Vec<VertexInput>,
    /// `@location` outputs of the entry point.
    pub outputs: Vec<u32>,
}

/// Parses and validates `source`, then reflects its interface.
///
/// The error string is the diagnostic shown in the compile log.
pub(crate) fn reflect(stage: ShaderStage, source: &str) -> Result<(Module, StageInterface), String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let interface = interface(&module, stage)?;
    Ok((module, interface))
}

fn interface(module: &Module, stage: ShaderStage) -> Result<StageInterface, String> {
    let wanted = match stage {
        ShaderStage::Vertex => NagaStage::Vertex,
        ShaderStage::Fragment => NagaStage::Fragment,
    };
    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == wanted)
        .ok_or_else(|| format!("no @{stage} entry point"))?;

    let mut layouter = naga::proc::Layouter::default();
    layouter
        .update(module.to_ctx())
        .map_err(|e| format!("type layout failed: {e}"))?;

    let mut out = StageInterface {
        entry_point: entry.name.clone(),
        ..StageInterface::default()
    };

    let mut texture = false;
    let mut sampler = false;
    for (_, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };
        let ty = &module.types[var.ty];

        match var.space {
            AddressSpace::Uniform => {
                let name = var
                    .name
                    .clone()
                    .ok_or_else(|| "uniform without a name".to_string())?;
                if binding.group != UNIFORM_GROUP {
                    return Err(format!(
                        "uniform {name} must be in @group({UNIFORM_GROUP}), found @group({})",
                        binding.group
                    ));
                }
                let (array_stride, array_len) = match ty.inner {
                    TypeInner::Array { size, stride, .. } => (
                        Some(stride),
                        match size {
                            naga::ArraySize::Constant(n) => Some(n.get()),
                            _ => None,
                        },
                    ),
                    _ => (None, None),
                };
                out.uniforms.push(UniformSlot {
                    name,
                    binding: binding.binding,
                    size: layouter[var.ty].size,
                    array_stride,
                    array_len,
                });
            }
            AddressSpace::Handle => {
                let expected = match ty.inner {
                    TypeInner::Image { .. } => {
                        texture = true;
                        TEXTURE_BINDING
                    }
                    TypeInner::Sampler { .. } => {
                        sampler = true;
                        SAMPLER_BINDING
                    }
                    _ => continue,
                };
                if binding.group != TEXTURE_GROUP || binding.binding != expected {
                    return Err(format!(
                        "{} must be bound at @group({TEXTURE_GROUP}) @binding({expected})",
                        var.name.as_deref().unwrap_or("texture resource")
                    ));
                }
            }
            _ => {}
        }
    }
    if texture != sampler {
        return Err("a texture must be declared together with its sampler".to_string());
    }
    out.samples_texture = texture;
    out.uniforms.sort_by_key(|u| u.binding);

    for arg in &entry.function.arguments {
        match &arg.binding {
            Some(Binding::Location { location, .. }) => {
                if let Some(name) = &arg.name {
                    out.inputs.push(VertexInput {
                        name: name.clone(),
                        location: *location,
                    });
                }
            }
            Some(Binding::BuiltIn(_)) => {}
            None => {
                if let TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                    for member in members {
                        if let (Some(Binding::Location { location, .. }), Some(name)) =
                            (&member.binding, &member.name)
                        {
                            out.inputs.push(VertexInput {
                                name: name.clone(),
                                location: *location,
                            });
                        }
                    }
                }
            }
        }
    }
    out.inputs.sort_by_key(|i| i.location);

    if let Some(result) = &entry.function.result {
        match &result.binding {
            Some(Binding::Location { location, .. }) => out.outputs.push(*location),
            Some(Binding::BuiltIn(_)) => {}
            None => {
                if let TypeInner::Struct { members, .. } = &module.types[result.ty].inner {
                    for member in members {
                        if let Some(Binding::Location { location, .. }) = &member.binding {
                            out.outputs.push(*location);
                        }
                    }
                }
            }
        }
    }

    Ok(out)
}

/// Checks that two stages can form a program.
///
/// Returns the merged uniform list (sorted by binding) or the link log.
pub(crate) fn link(vertex: &StageInterface, fragment: &StageInterface) -> Result<Vec<UniformSlot>, String> {
    let mut problems = Vec::new();

    if !fragment.outputs.contains(&0) {
        problems.push("fragment stage does not write @location(0)".to_string());
    }
    for input in &fragment.inputs {
        if !vertex.outputs.contains(&input.location) {
            problems.push(format!(
                "fragment input {} at @location({}) is not written by the vertex stage",
                input.name, input.location
            ));
        }
    }

    let mut uniforms = vertex.uniforms.clone();
    for u in &fragment.uniforms {
        match uniforms.iter().find(|v| v.binding == u.binding) {
            Some(existing) if existing == u => {}
            Some(existing) => problems.push(format!(
                "@binding({}) is {} in the vertex stage but {} in the fragment stage",
                u.binding, existing.name, u.name
            )),
            None => uniforms.push(u.clone()),
        }
    }
    uniforms.sort_by_key(|u| u.binding);

    for pair in uniforms.windows(2) {
        if pair[0].name == pair[1].name {
            problems.push(format!("uniform {} is bound twice", pair[0].name));
        }
    }

    if problems.is_empty() {
        Ok(uniforms)
    } else {
        Err(problems.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE_VS: &str = r#"
        @group(0) @binding(0) var<uniform> MVPMatrix: mat4x4<f32>;

        struct VsOut {
            @builtin(position) position: vec4<f32>,
            @location(0) uv: vec2<f32>,
        };

        @vertex
        fn vs_main(@location(0) in_position: vec3<f32>, @location(2) in_texcoord: vec2<f32>) -> VsOut {
            var out: VsOut;
            out.position = MVPMatrix * vec4<f32>(in_position, 1.0);
            out.uv = in_texcoord;
            return out;
        }
    "#;

    const BLUR_FS: &str = r#"
        @group(0) @binding(1) var<uniform> gaussValues: array<vec4<f32>, 11>;
        @group(0) @binding(2) var<uniform> screen_size: vec2<i32>;
        @group(1) @binding(0) var image: texture_2d<f32>;
        @group(1) @binding(1) var image_sampler: sampler;

        @fragment
        fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
            let texel = 1.0 / vec2<f32>(screen_size);
            var sum = vec3<f32>(0.0);
            for (var i = 0; i < 11; i++) {
                let g = gaussValues[i];
                sum += textureSampleLevel(image, image_sampler, uv + vec2<f32>(g.x * texel.x, 0.0), 0.0).rgb * g.y;
            }
            return vec4<f32>(sum, 1.0);
        }
    "#;

    // ── reflection ────────────────────────────────────────────────────────

    #[test]
    fn vertex_stage_reflects_uniforms_and_inputs() {
        let (_, vs) = reflect(ShaderStage::Vertex, SCENE_VS).unwrap();
        assert_eq!(vs.entry_point, "vs_main");
        assert_eq!(
            vs.uniforms,
            vec![UniformSlot {
                name: "MVPMatrix".into(),
                binding: 0,
                size: 64,
                array_stride: None,
                array_len: None,
            }]
        );
        assert_eq!(
            vs.inputs,
            vec![
                VertexInput { name: "in_position".into(), location: 0 },
                VertexInput { name: "in_texcoord".into(), location: 2 },
            ]
        );
        assert_eq!(vs.outputs, vec![0]);
        assert!(!vs.samples_texture);
    }

    #[test]
    fn fragment_stage_reflects_arrays_and_texture() {
        let (_, fs) = reflect(ShaderStage::Fragment, BLUR_FS).unwrap();
        let gauss = &fs.uniforms[0];
        assert_eq!(gauss.name, "gaussValues");
        assert_eq!(gauss.array_stride, Some(16));
        assert_eq!(gauss.array_len, Some(11));
        assert_eq!(gauss.size, 176);
        assert_eq!(fs.uniforms[1].name, "screen_size");
        assert_eq!(fs.uniforms[1].size, 8);
        assert!(fs.samples_texture);
    }

    // ── diagnostics ───────────────────────────────────────────────────────

    #[test]
    fn syntax_error_is_reported() {
        let err = reflect(ShaderStage::Fragment, "fn broken( {").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn missing_entry_point_is_reported() {
        let err = reflect(ShaderStage::Fragment, SCENE_VS).unwrap_err();
        assert_eq!(err, "no @fragment entry point");
    }

    #[test]
    fn uniform_outside_group_zero_is_rejected() {
        let src = r#"
            @group(2) @binding(0) var<uniform> MVMatrix: mat4x4<f32>;
            @vertex fn main() -> @builtin(position) vec4<f32> { return MVMatrix[0]; }
        "#;
        let err = reflect(ShaderStage::Vertex, src).unwrap_err();
        assert!(err.contains("MVMatrix"));
    }

    // ── linking ───────────────────────────────────────────────────────────

    #[test]
    fn link_merges_uniforms_by_binding() {
        let (_, vs) = reflect(ShaderStage::Vertex, SCENE_VS).unwrap();
        let (_, fs) = reflect(ShaderStage::Fragment, BLUR_FS).unwrap();
        let merged = link(&vs, &fs).unwrap();
        let names: Vec<_> = merged.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["MVPMatrix", "gaussValues", "screen_size"]);
    }

    #[test]
    fn link_rejects_unwritten_fragment_inputs() {
        let (_, vs) = reflect(ShaderStage::Vertex, SCENE_VS).unwrap();
        let fs_src = r#"
            @fragment
            fn fs_main(@location(3) normal: vec3<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(normal, 1.0);
            }
        "#;
        let (_, fs) = reflect(ShaderStage::Fragment, fs_src).unwrap();
        let log = link(&vs, &fs).unwrap_err();
        assert!(log.contains("@location(3)"));
    }

    #[test]
    fn link_rejects_conflicting_bindings() {
        let (_, vs) = reflect(ShaderStage::Vertex, SCENE_VS).unwrap();
        let fs_src = r#"
            @group(0) @binding(0) var<uniform> screen_size: vec2<i32>;
            @fragment
            fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(uv, f32(screen_size.x), 1.0);
            }
        "#;
        let (_, fs) = reflect(ShaderStage::Fragment, fs_src).unwrap();
        assert!(link(&vs, &fs).is_err());
    }
}
