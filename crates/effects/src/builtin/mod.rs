//! The stock effect catalogue.
//!
//! Program effects here are written in WGSL against the content prelude:
//! each declares its uniforms at `@group(1)` and defines
//! `fn effect_main(frag_coord: vec2<f32>) -> vec4<f32>`, sampling the input
//! with `content_eval(coord)`.

mod distort;
mod lens;
mod tone;

pub use distort::{pixelate, wave, PIXELATE_ID, WAVE_ID};
pub use lens::{chromatic_aberration, vignette, CHROMATIC_ID, VIGNETTE_ID};
pub use tone::{
    color_inversion, gradient_overlay, grayscale, sepia, DEFAULT_GRADIENT_END,
    DEFAULT_GRADIENT_START, GRADIENT_ID, GRAYSCALE_ID, INVERT_ID, SEPIA_ID,
};

use crate::effect::Effect;
use crate::native::NativeEffect;

pub use crate::native::BLUR_ID;

pub fn blur(radius: f32) -> Effect {
    NativeEffect::blur(radius).into()
}

/// Built-in effect ids, in catalogue order.
pub const IDS: [&str; 9] = [
    GRAYSCALE_ID,
    SEPIA_ID,
    GRADIENT_ID,
    VIGNETTE_ID,
    PIXELATE_ID,
    CHROMATIC_ID,
    INVERT_ID,
    WAVE_ID,
    BLUR_ID,
];

/// Every built-in effect with its default parameters, in catalogue order.
pub fn all() -> Vec<Effect> {
    IDS.iter().filter_map(|id| by_id(id)).collect()
}

/// Looks up a built-in effect by id.
pub fn by_id(id: &str) -> Option<Effect> {
    let effect = match id {
        GRAYSCALE_ID => grayscale(1.0),
        SEPIA_ID => sepia(1.0),
        GRADIENT_ID => gradient_overlay(DEFAULT_GRADIENT_START, DEFAULT_GRADIENT_END, 0.5),
        VIGNETTE_ID => vignette(0.5, 0.5),
        PIXELATE_ID => pixelate(10.0),
        CHROMATIC_ID => chromatic_aberration(5.0),
        INVERT_ID => color_inversion(),
        WAVE_ID => wave(10.0, 5.0, true),
        BLUR_ID => blur(10.0),
        _ => return None,
    };
    Some(effect)
}
