//! Per-pixel color adjustments.

use crate::effect::Effect;
use crate::parameter::{ParameterSpec, ParameterValue};
use crate::program::{ProgramEffect, UniformSource};

pub const GRAYSCALE_ID: &str = "grayscale";
pub const SEPIA_ID: &str = "sepia";
pub const INVERT_ID: &str = "color_inversion";
pub const GRADIENT_ID: &str = "gradient_overlay";

pub const DEFAULT_GRADIENT_START: u32 = 0xFFF3_A397;
pub const DEFAULT_GRADIENT_END: u32 = 0xFFF8_EE94;

const GRAYSCALE_WGSL: &str = r#"
@group(1) @binding(0) var<uniform> intensity: f32;

fn effect_main(frag_coord: vec2<f32>) -> vec4<f32> {
    let color = content_eval(frag_coord);
    let luma = dot(color.rgb, vec3<f32>(0.299, 0.587, 0.114));
    return vec4<f32>(mix(color.rgb, vec3<f32>(luma), vec3<f32>(intensity)), color.a);
}
"#;

const SEPIA_WGSL: &str = r#"
@group(1) @binding(0) var<uniform> intensity: f32;

fn effect_main(frag_coord: vec2<f32>) -> vec4<f32> {
    let color = content_eval(frag_coord);
    let toned = vec3<f32>(
        dot(color.rgb, vec3<f32>(0.393, 0.769, 0.189)),
        dot(color.rgb, vec3<f32>(0.349, 0.686, 0.168)),
        dot(color.rgb, vec3<f32>(0.272, 0.534, 0.131)),
    );
    let sepia = min(toned, vec3<f32>(1.0));
    return vec4<f32>(mix(color.rgb, sepia, vec3<f32>(intensity)), color.a);
}
"#;

const INVERT_WGSL: &str = r#"
fn effect_main(frag_coord: vec2<f32>) -> vec4<f32> {
    let color = content_eval(frag_coord);
    return vec4<f32>(vec3<f32>(1.0) - color.rgb, color.a);
}
"#;

// Diagonal blend from bottom-left (color1) towards the top-right (color2),
// multiplied into the content.
const GRADIENT_WGSL: &str = r#"
@group(1) @binding(0) var<uniform> resolution: vec2<f32>;
@group(1) @binding(1) var<uniform> color1: vec4<f32>;
@group(1) @binding(2) var<uniform> color2: vec4<f32>;
@group(1) @binding(3) var<uniform> intensity: f32;

fn effect_main(frag_coord: vec2<f32>) -> vec4<f32> {
    let original = content_eval(frag_coord);
    let uv = frag_coord / resolution;
    let t = clamp(distance(uv, vec2<f32>(0.0, 1.0)) / 1.41421356, 0.0, 1.0);
    let gradient = mix(color1, color2, vec4<f32>(t));
    let tinted = original.rgb * gradient.rgb;
    return vec4<f32>(mix(original.rgb, tinted, vec3<f32>(intensity)), original.a);
}
"#;

pub fn grayscale(intensity: f32) -> Effect {
    intensity_program(GRAYSCALE_ID, "Grayscale", GRAYSCALE_WGSL, intensity)
}

pub fn sepia(intensity: f32) -> Effect {
    intensity_program(SEPIA_ID, "Sepia", SEPIA_WGSL, intensity)
}

pub fn color_inversion() -> Effect {
    ProgramEffect::builder(INVERT_ID, "Invert", INVERT_WGSL)
        .build_trusted()
        .into()
}

pub fn gradient_overlay(color1: u32, color2: u32, intensity: f32) -> Effect {
    ProgramEffect::builder(GRADIENT_ID, "Gradient", GRADIENT_WGSL)
        .parameter(ParameterSpec::color("color1", "Start Color", DEFAULT_GRADIENT_START))
        .parameter(ParameterSpec::color("color2", "End Color", DEFAULT_GRADIENT_END))
        .parameter(ParameterSpec::percentage("intensity", "Intensity", 0.5))
        .uniform("resolution", UniformSource::Resolution)
        .uniform("color1", UniformSource::Parameter("color1".into()))
        .uniform("color2", UniformSource::Parameter("color2".into()))
        .uniform("intensity", UniformSource::Parameter("intensity".into()))
        .build_trusted()
        .with_value("color1", ParameterValue::Color(color1))
        .with_value("color2", ParameterValue::Color(color2))
        .with_value("intensity", ParameterValue::Float(intensity))
        .into()
}

fn intensity_program(id: &str, name: &str, source: &'static str, intensity: f32) -> Effect {
    ProgramEffect::builder(id, name, source)
        .parameter(ParameterSpec::percentage("intensity", "Intensity", 1.0))
        .uniform("intensity", UniformSource::Parameter("intensity".into()))
        .build_trusted()
        .with_value("intensity", ParameterValue::Float(intensity))
        .into()
}
