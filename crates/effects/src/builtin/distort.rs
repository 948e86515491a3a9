//! Effects that move pixels around.

use crate::effect::Effect;
use crate::parameter::{ParameterSpec, ParameterValue};
use crate::program::{AnimatedEffect, ProgramEffect, UniformSource};

pub const PIXELATE_ID: &str = "pixelation";
pub const WAVE_ID: &str = "wave_distortion";

const PIXELATE_WGSL: &str = r#"
@group(1) @binding(0) var<uniform> resolution: vec2<f32>;
@group(1) @binding(1) var<uniform> pixelSize: f32;

fn effect_main(frag_coord: vec2<f32>) -> vec4<f32> {
    let size = max(pixelSize, 1.0);
    let cell = floor(frag_coord / size) * size + vec2<f32>(size * 0.5);
    return content_eval(clamp(cell, vec2<f32>(0.0), resolution));
}
"#;

const WAVE_WGSL: &str = r#"
@group(1) @binding(0) var<uniform> resolution: vec2<f32>;
@group(1) @binding(1) var<uniform> amplitude: f32;
@group(1) @binding(2) var<uniform> frequency: f32;
@group(1) @binding(3) var<uniform> time: f32;

fn effect_main(frag_coord: vec2<f32>) -> vec4<f32> {
    let uv = frag_coord / resolution;
    let shift = vec2<f32>(
        sin(uv.y * frequency + time) * amplitude,
        cos(uv.x * frequency + time) * amplitude,
    );
    return content_eval(clamp(frag_coord + shift, vec2<f32>(0.0), resolution));
}
"#;

pub fn pixelate(pixel_size: f32) -> Effect {
    ProgramEffect::builder(PIXELATE_ID, "Pixelate", PIXELATE_WGSL)
        .parameter(ParameterSpec::pixel("pixelSize", "Pixel Size", 1.0..=100.0, 10.0))
        .uniform("resolution", UniformSource::Resolution)
        .uniform(
            "pixelSize",
            UniformSource::ParameterAtLeast {
                id: "pixelSize".into(),
                min: 1.0,
            },
        )
        .build_trusted()
        .with_value("pixelSize", ParameterValue::Float(pixel_size))
        .into()
}

/// Sine/cosine displacement driven by time. Disabling `animate` freezes the
/// wave at its current phase.
pub fn wave(amplitude: f32, frequency: f32, animate: bool) -> Effect {
    let program = ProgramEffect::builder(WAVE_ID, "Wave", WAVE_WGSL)
        .parameter(ParameterSpec::pixel("amplitude", "Amplitude", 0.0..=50.0, 10.0))
        .parameter(ParameterSpec::float("frequency", "Frequency", 1.0..=20.0, 5.0))
        .parameter(ParameterSpec::toggle("animate", "Animate", true))
        .uniform("resolution", UniformSource::Resolution)
        .uniform("amplitude", UniformSource::Parameter("amplitude".into()))
        .uniform("frequency", UniformSource::Parameter("frequency".into()))
        .uniform("time", UniformSource::Time)
        .build_trusted()
        .with_value("amplitude", ParameterValue::Float(amplitude))
        .with_value("frequency", ParameterValue::Float(frequency))
        .with_value("animate", ParameterValue::Bool(animate));

    AnimatedEffect::new(program)
        .gated_by_trusted("animate")
        .into()
}
