//! Effects that model optical artefacts.

use crate::effect::Effect;
use crate::parameter::{ParameterSpec, ParameterValue};
use crate::program::{ProgramEffect, UniformSource};

pub const VIGNETTE_ID: &str = "vignette";
pub const CHROMATIC_ID: &str = "chromatic_aberration";

// Darkens towards the edges: full brightness inside `radius`, fading out over
// `intensity` beyond it (both in uv units from the center).
const VIGNETTE_WGSL: &str = r#"
@group(1) @binding(0) var<uniform> resolution: vec2<f32>;
@group(1) @binding(1) var<uniform> radius: f32;
@group(1) @binding(2) var<uniform> intensity: f32;

fn effect_main(frag_coord: vec2<f32>) -> vec4<f32> {
    let color = content_eval(frag_coord);
    let uv = frag_coord / resolution;
    let dist = distance(uv, vec2<f32>(0.5, 0.5));
    let softness = max(intensity, 0.001);
    let shade = 1.0 - smoothstep(radius - softness, radius, dist);
    return vec4<f32>(color.rgb * shade, color.a);
}
"#;

const CHROMATIC_WGSL: &str = r#"
@group(1) @binding(0) var<uniform> resolution: vec2<f32>;
@group(1) @binding(1) var<uniform> offset: f32;

fn effect_main(frag_coord: vec2<f32>) -> vec4<f32> {
    let delta = frag_coord - resolution * 0.5;
    var dir = vec2<f32>(0.0, 0.0);
    if (length(delta) > 0.0) {
        dir = normalize(delta);
    }
    let base = content_eval(frag_coord);
    let red = content_eval(frag_coord + dir * offset).r;
    let blue = content_eval(frag_coord - dir * offset).b;
    return vec4<f32>(red, base.g, blue, base.a);
}
"#;

pub fn vignette(radius: f32, intensity: f32) -> Effect {
    ProgramEffect::builder(VIGNETTE_ID, "Vignette", VIGNETTE_WGSL)
        .parameter(ParameterSpec::percentage("radius", "Radius", 0.5))
        .parameter(ParameterSpec::percentage("intensity", "Intensity", 0.5))
        .uniform("resolution", UniformSource::Resolution)
        .uniform("radius", UniformSource::Parameter("radius".into()))
        .uniform("intensity", UniformSource::Parameter("intensity".into()))
        .build_trusted()
        .with_value("radius", ParameterValue::Float(radius))
        .with_value("intensity", ParameterValue::Float(intensity))
        .into()
}

pub fn chromatic_aberration(offset: f32) -> Effect {
    ProgramEffect::builder(CHROMATIC_ID, "Chromatic Aberration", CHROMATIC_WGSL)
        .parameter(ParameterSpec::pixel("offset", "Offset", 0.0..=20.0, 5.0))
        .uniform("resolution", UniformSource::Resolution)
        .uniform("offset", UniformSource::Parameter("offset".into()))
        .build_trusted()
        .with_value("offset", ParameterValue::Float(offset))
        .into()
}
