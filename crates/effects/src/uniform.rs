use serde::{Deserialize, Serialize};

use crate::color::argb_to_rgba;

/// A named value bound into a compiled program before drawing.
///
/// The name must match a uniform declared by the program source; mismatches
/// are reported by the backend when the uniforms are bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Uniform {
    /// One to four float components.
    Float { name: String, values: Vec<f32> },
    /// One to four integer components.
    Int { name: String, values: Vec<i32> },
    /// Normalised `[r, g, b, a]`.
    Color { name: String, rgba: [f32; 4] },
}

impl Uniform {
    pub fn float(name: impl Into<String>, values: impl Into<Vec<f32>>) -> Self {
        Uniform::Float {
            name: name.into(),
            values: values.into(),
        }
    }

    pub fn int(name: impl Into<String>, values: impl Into<Vec<i32>>) -> Self {
        Uniform::Int {
            name: name.into(),
            values: values.into(),
        }
    }

    /// Color uniform from a packed ARGB word.
    pub fn color(name: impl Into<String>, argb: u32) -> Self {
        Uniform::Color {
            name: name.into(),
            rgba: argb_to_rgba(argb),
        }
    }

    pub fn color_rgba(name: impl Into<String>, rgba: [f32; 4]) -> Self {
        Uniform::Color {
            name: name.into(),
            rgba,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Uniform::Float { name, .. } | Uniform::Int { name, .. } | Uniform::Color { name, .. } => {
                name
            }
        }
    }

    pub fn components(&self) -> usize {
        match self {
            Uniform::Float { values, .. } => values.len(),
            Uniform::Int { values, .. } => values.len(),
            Uniform::Color { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_uniform_unpacks_argb() {
        let uniform = Uniform::color("tint", 0xFF00_FF00);
        assert_eq!(uniform.name(), "tint");
        assert_eq!(
            uniform,
            Uniform::Color {
                name: "tint".into(),
                rgba: [0.0, 1.0, 0.0, 1.0]
            }
        );
    }

    #[test]
    fn reports_component_counts() {
        assert_eq!(Uniform::float("resolution", [640.0, 480.0]).components(), 2);
        assert_eq!(Uniform::int("steps", [3]).components(), 1);
        assert_eq!(Uniform::color("c", 0).components(), 4);
    }
}
