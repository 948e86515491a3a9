use serde::{Deserialize, Serialize};

use crate::parameter::{ParameterSpec, ParameterValue};

pub const BLUR_ID: &str = "blur";
pub const BLUR_RADIUS: &str = "radius";
/// Radii below this are raised to it before the blur primitive runs.
pub const MIN_BLUR_RADIUS: f32 = 0.1;

/// Effects realised by a backend primitive instead of program source.
///
/// The set is closed: a backend either provides the primitive or reports the
/// effect as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum NativeEffect {
    /// Gaussian blur with `radius` in pixels.
    Blur { radius: f32 },
}

impl NativeEffect {
    pub fn blur(radius: f32) -> Self {
        let radius = match blur_radius_spec().validate(ParameterValue::Float(radius)) {
            Some(ParameterValue::Float(valid)) => valid,
            _ => blur_radius_spec().default_value(),
        };
        NativeEffect::Blur { radius }
    }

    pub fn id(&self) -> &'static str {
        match self {
            NativeEffect::Blur { .. } => BLUR_ID,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NativeEffect::Blur { .. } => "Blur",
        }
    }

    pub fn parameters(&self) -> Vec<ParameterSpec> {
        match self {
            NativeEffect::Blur { .. } => vec![blur_radius_spec()],
        }
    }

    pub fn value(&self, id: &str) -> Option<ParameterValue> {
        match self {
            NativeEffect::Blur { radius } if id == BLUR_RADIUS => {
                Some(ParameterValue::Float(*radius))
            }
            NativeEffect::Blur { .. } => None,
        }
    }

    pub fn with_value(&self, id: &str, value: ParameterValue) -> Self {
        match self {
            NativeEffect::Blur { .. } if id == BLUR_RADIUS => {
                match blur_radius_spec().validate(value) {
                    Some(ParameterValue::Float(radius)) => NativeEffect::Blur { radius },
                    _ => *self,
                }
            }
            NativeEffect::Blur { .. } => *self,
        }
    }
}

fn blur_radius_spec() -> ParameterSpec {
    ParameterSpec::pixel(BLUR_RADIUS, "Radius", 0.0..=50.0, 10.0)
}
