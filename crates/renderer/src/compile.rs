use effects::CONTENT_UNIFORM_NAME;
use naga::valid::{Capabilities, ValidationFlags, Validator};

pub(crate) const VERTEX_ENTRY: &str = "vs_main";
pub(crate) const FRAGMENT_ENTRY: &str = "fs_main";
/// Bind group holding the `content` texture and its sampler.
pub(crate) const CONTENT_GROUP: u32 = 0;
/// Bind group holding the effect's own uniforms.
pub(crate) const UNIFORM_GROUP: u32 = 1;

const SAMPLER_NAME: &str = "content_sampler";

/// Scalar type of a reflected uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Float,
    Sint,
    Uint,
}

/// One `var<uniform>` declared by a program at `@group(1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: String,
    pub binding: u32,
    pub kind: ScalarKind,
    /// 1 for scalars, 2..=4 for vectors.
    pub components: u8,
}

/// Wrapped, validated program source ready for module creation.
#[derive(Debug)]
pub(crate) struct ValidatedProgram {
    pub wrapped: String,
    pub slots: Vec<UniformSlot>,
}

/// Wraps effect source with the content prelude and validates it with naga.
///
/// Returns the wrapped source together with the uniform slots the program
/// declares. Parse and validation failures come back as the compiler's
/// rendered diagnostic.
pub(crate) fn validate_program(source: &str) -> Result<ValidatedProgram, String> {
    let wrapped = wrap_effect_source(source);
    let module =
        naga::front::wgsl::parse_str(&wrapped).map_err(|err| err.emit_to_string(&wrapped))?;
    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|err| err.emit_to_string(&wrapped))?;
    let slots = reflect_uniforms(&module)?;
    Ok(ValidatedProgram { wrapped, slots })
}

/// Checks effect source without a device and lists the uniforms it declares.
pub fn check_effect_source(source: &str) -> Result<Vec<UniformSlot>, String> {
    validate_program(source).map(|program| program.slots)
}

/// Produces a self-contained WGSL module from effect source.
///
/// Steps performed:
///
/// 1. Hoist `enable`/`requires` directives, which must precede every
///    declaration, and drop any redeclaration of the content bindings so the
///    prelude's definitions win.
/// 2. Prepend [`PRELUDE`]: the full-screen vertex stage, the `content`
///    texture + sampler at `@group(0)`, and `content_eval`.
/// 3. Append [`FOOTER`], the fragment entry point calling `effect_main`.
pub(crate) fn wrap_effect_source(source: &str) -> String {
    let mut directives = String::new();
    let mut body = String::new();
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("enable ") || trimmed.starts_with("requires ") {
            directives.push_str(trimmed);
            directives.push('\n');
            continue;
        }
        if declares_content_binding(trimmed) {
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }
    format!("{directives}{PRELUDE}\n{body}\n{FOOTER}")
}

fn declares_content_binding(line: &str) -> bool {
    let Some(rest) = line.split("var ").nth(1) else {
        return false;
    };
    let name = rest.split(':').next().unwrap_or_default().trim();
    line.starts_with('@') && (name == CONTENT_UNIFORM_NAME || name == SAMPLER_NAME)
}

/// Collects the program's uniforms and rejects resources the renderer does
/// not bind.
fn reflect_uniforms(module: &naga::Module) -> Result<Vec<UniformSlot>, String> {
    let mut slots = Vec::new();
    for (_, global) in module.global_variables.iter() {
        let Some(binding) = &global.binding else {
            continue;
        };
        let name = global.name.clone().unwrap_or_default();
        if binding.group == CONTENT_GROUP {
            if name == CONTENT_UNIFORM_NAME || name == SAMPLER_NAME {
                continue;
            }
            return Err(format!(
                "'{name}' uses @group({CONTENT_GROUP}), which is reserved for the content texture"
            ));
        }
        if binding.group != UNIFORM_GROUP {
            return Err(format!(
                "'{name}' uses @group({}); effect uniforms belong in @group({UNIFORM_GROUP})",
                binding.group
            ));
        }
        if global.space != naga::AddressSpace::Uniform {
            return Err(format!("'{name}' must be declared as var<uniform>"));
        }
        let (kind, components) = match &module.types[global.ty].inner {
            naga::TypeInner::Scalar(scalar) => (scalar_kind(&name, *scalar)?, 1),
            naga::TypeInner::Vector { size, scalar } => {
                (scalar_kind(&name, *scalar)?, *size as u8)
            }
            other => {
                return Err(format!(
                    "uniform '{name}' has unsupported type {other:?}; use a scalar or vector"
                ))
            }
        };
        slots.push(UniformSlot {
            name,
            binding: binding.binding,
            kind,
            components,
        });
    }
    slots.sort_by_key(|slot| slot.binding);
    Ok(slots)
}

fn scalar_kind(name: &str, scalar: naga::Scalar) -> Result<ScalarKind, String> {
    if scalar.width != 4 {
        return Err(format!("uniform '{name}' must use 32-bit components"));
    }
    match scalar.kind {
        naga::ScalarKind::Float => Ok(ScalarKind::Float),
        naga::ScalarKind::Sint => Ok(ScalarKind::Sint),
        naga::ScalarKind::Uint => Ok(ScalarKind::Uint),
        other => Err(format!("uniform '{name}' has unsupported scalar kind {other:?}")),
    }
}

/// WGSL prologue injected ahead of every effect.
///
/// Coordinates handed to `effect_main` and `content_eval` are in pixels with
/// the origin at the top-left, matching the framebuffer.
const PRELUDE: &str = r"struct VertexOutput {
    @builtin(position) position: vec4<f32>,
};

@group(0) @binding(0) var content: texture_2d<f32>;
@group(0) @binding(1) var content_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -3.0),
        vec2<f32>(3.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    var out: VertexOutput;
    out.position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    return out;
}

fn content_eval(coord: vec2<f32>) -> vec4<f32> {
    let size = vec2<f32>(textureDimensions(content));
    return textureSampleLevel(content, content_sampler, coord / size, 0.0);
}
";

/// WGSL epilogue delegating the fragment stage to `effect_main`.
const FOOTER: &str = r"@fragment
fn fs_main(@builtin(position) position: vec4<f32>) -> @location(0) vec4<f32> {
    return effect_main(position.xy);
}
";
