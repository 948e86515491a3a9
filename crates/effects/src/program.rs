//! Effects defined by backend program source.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::parameter::{ParameterSpec, ParameterValue};
use crate::uniform::Uniform;
use crate::EffectError;

/// Where a uniform's value comes from when the effect is bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformSource {
    /// `vec2(width, height)` of the draw.
    Resolution,
    /// Animation time in seconds; `0` for non-animated programs.
    Time,
    /// Current value of a parameter. Floats bind as floats, toggles as an
    /// int `0`/`1`, colors as a color uniform.
    Parameter(String),
    /// A float parameter raised to at least `min`.
    ParameterAtLeast { id: String, min: f32 },
    Float(Vec<f32>),
    Int(Vec<i32>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformBinding {
    pub name: String,
    pub source: UniformSource,
}

/// A program effect: source text, declared parameters with their current
/// values, and the plan that turns those values into uniforms.
///
/// Values are immutable; every setter returns a new effect. The source, specs
/// and plan are shared between copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProgramRepr", into = "ProgramRepr")]
pub struct ProgramEffect {
    id: String,
    display_name: String,
    source: Arc<str>,
    parameters: Arc<[ParameterSpec]>,
    values: Vec<ParameterValue>,
    uniforms: Arc<[UniformBinding]>,
}

impl ProgramEffect {
    pub fn builder(
        id: impl Into<String>,
        display_name: impl Into<String>,
        source: impl Into<Arc<str>>,
    ) -> ProgramBuilder {
        ProgramBuilder {
            id: id.into(),
            display_name: display_name.into(),
            source: source.into(),
            parameters: Vec::new(),
            uniforms: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn uniform_plan(&self) -> &[UniformBinding] {
        &self.uniforms
    }

    pub fn value(&self, id: &str) -> Option<ParameterValue> {
        self.position(id).map(|index| self.values[index])
    }

    /// Returns a copy with parameter `id` set to `value`. Unknown ids and
    /// values the spec rejects leave the effect unchanged.
    pub fn with_value(&self, id: &str, value: ParameterValue) -> Self {
        let Some(index) = self.position(id) else {
            tracing::trace!(effect = %self.id, parameter = id, "ignoring unknown parameter");
            return self.clone();
        };
        match self.parameters[index].validate(value) {
            Some(valid) => {
                let mut next = self.clone();
                next.values[index] = valid;
                next
            }
            None => {
                tracing::trace!(effect = %self.id, parameter = id, ?value, "rejected parameter value");
                self.clone()
            }
        }
    }

    /// Uniforms for a `width` x `height` draw.
    pub fn build_uniforms(&self, width: f32, height: f32) -> Vec<Uniform> {
        self.build_uniforms_at(width, height, 0.0)
    }

    pub(crate) fn build_uniforms_at(&self, width: f32, height: f32, time: f32) -> Vec<Uniform> {
        self.uniforms
            .iter()
            .filter_map(|binding| {
                let name = binding.name.as_str();
                let uniform = match &binding.source {
                    UniformSource::Resolution => Uniform::float(name, [width, height]),
                    UniformSource::Time => Uniform::float(name, [time]),
                    UniformSource::Parameter(id) => match self.value(id)? {
                        ParameterValue::Float(value) => Uniform::float(name, [value]),
                        ParameterValue::Bool(flag) => Uniform::int(name, [i32::from(flag)]),
                        ParameterValue::Color(color) => Uniform::color(name, color),
                    },
                    UniformSource::ParameterAtLeast { id, min } => {
                        Uniform::float(name, [self.value(id)?.to_float().max(*min)])
                    }
                    UniformSource::Float(values) => Uniform::float(name, values.clone()),
                    UniformSource::Int(values) => Uniform::int(name, values.clone()),
                };
                Some(uniform)
            })
            .collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.parameters.iter().position(|spec| spec.id() == id)
    }
}

pub struct ProgramBuilder {
    id: String,
    display_name: String,
    source: Arc<str>,
    parameters: Vec<ParameterSpec>,
    uniforms: Vec<UniformBinding>,
}

impl ProgramBuilder {
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn uniform(mut self, name: impl Into<String>, source: UniformSource) -> Self {
        self.uniforms.push(UniformBinding {
            name: name.into(),
            source,
        });
        self
    }

    pub fn build(self) -> Result<ProgramEffect, EffectError> {
        let mut seen = HashSet::new();
        for spec in &self.parameters {
            if !seen.insert(spec.id()) {
                return Err(EffectError::DuplicateParameter(spec.id().to_string()));
            }
        }

        let mut names = HashSet::new();
        for binding in &self.uniforms {
            if !names.insert(binding.name.as_str()) {
                return Err(EffectError::DuplicateUniform(binding.name.clone()));
            }
            let referenced = match &binding.source {
                UniformSource::Parameter(id) | UniformSource::ParameterAtLeast { id, .. } => {
                    Some(id)
                }
                _ => None,
            };
            if let Some(id) = referenced {
                if !seen.contains(id.as_str()) {
                    return Err(EffectError::UnknownParameter {
                        uniform: binding.name.clone(),
                        parameter: id.clone(),
                    });
                }
            }
        }

        Ok(self.build_trusted())
    }

    /// Skips validation for definitions checked by this crate's tests.
    pub(crate) fn build_trusted(self) -> ProgramEffect {
        let values = self
            .parameters
            .iter()
            .map(ParameterSpec::default_typed)
            .collect();
        ProgramEffect {
            id: self.id,
            display_name: self.display_name,
            source: self.source,
            parameters: self.parameters.into(),
            values,
            uniforms: self.uniforms.into(),
        }
    }
}

/// A program effect driven by an external clock.
///
/// `time` is bound through [`UniformSource::Time`] entries of the program's
/// plan. The optional toggle parameter gates [`AnimatedEffect::is_animating`];
/// without one the effect always animates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnimatedRepr", into = "AnimatedRepr")]
pub struct AnimatedEffect {
    program: ProgramEffect,
    time: f32,
    animate_toggle: Option<String>,
}

impl AnimatedEffect {
    pub fn new(program: ProgramEffect) -> Self {
        Self {
            program,
            time: 0.0,
            animate_toggle: None,
        }
    }

    /// Gates animation on the toggle parameter `id`, which must be declared
    /// by the program as a toggle.
    pub fn with_animate_toggle(mut self, id: impl Into<String>) -> Result<Self, EffectError> {
        let id = id.into();
        let declared = self
            .program
            .parameters()
            .iter()
            .any(|spec| spec.id() == id && spec.is_toggle());
        if !declared {
            return Err(EffectError::NotAToggle(id));
        }
        self.animate_toggle = Some(id);
        Ok(self)
    }

    pub(crate) fn gated_by_trusted(mut self, id: &str) -> Self {
        self.animate_toggle = Some(id.to_string());
        self
    }

    pub fn program(&self) -> &ProgramEffect {
        &self.program
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn with_time(&self, time: f32) -> Self {
        Self {
            time,
            ..self.clone()
        }
    }

    pub fn is_animating(&self) -> bool {
        match &self.animate_toggle {
            Some(id) => self
                .program
                .value(id)
                .and_then(ParameterValue::as_bool)
                .unwrap_or(true),
            None => true,
        }
    }

    pub fn with_value(&self, id: &str, value: ParameterValue) -> Self {
        Self {
            program: self.program.with_value(id, value),
            ..self.clone()
        }
    }

    pub fn build_uniforms(&self, width: f32, height: f32) -> Vec<Uniform> {
        self.program.build_uniforms_at(width, height, self.time)
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct ProgramRepr {
    id: String,
    display_name: String,
    source: String,
    #[serde(default)]
    parameters: Vec<ParameterSpec>,
    #[serde(default)]
    values: BTreeMap<String, ParameterValue>,
    #[serde(default)]
    uniforms: Vec<UniformBinding>,
}

impl TryFrom<ProgramRepr> for ProgramEffect {
    type Error = EffectError;

    fn try_from(repr: ProgramRepr) -> Result<Self, Self::Error> {
        let builder = repr
            .parameters
            .into_iter()
            .fold(
                ProgramEffect::builder(repr.id, repr.display_name, repr.source),
                ProgramBuilder::parameter,
            );
        let builder = repr
            .uniforms
            .into_iter()
            .fold(builder, |builder, binding| {
                builder.uniform(binding.name, binding.source)
            });
        let program = builder.build()?;
        Ok(repr
            .values
            .into_iter()
            .fold(program, |program, (id, value)| program.with_value(&id, value)))
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct AnimatedRepr {
    program: ProgramEffect,
    #[serde(default)]
    time: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    animate_toggle: Option<String>,
}

impl TryFrom<AnimatedRepr> for AnimatedEffect {
    type Error = EffectError;

    fn try_from(repr: AnimatedRepr) -> Result<Self, Self::Error> {
        let animated = AnimatedEffect::new(repr.program).with_time(repr.time);
        match repr.animate_toggle {
            Some(id) => animated.with_animate_toggle(id),
            None => Ok(animated),
        }
    }
}

impl From<AnimatedEffect> for AnimatedRepr {
    fn from(animated: AnimatedEffect) -> Self {
        Self {
            program: animated.program,
            time: animated.time,
            animate_toggle: animated.animate_toggle,
        }
    }
}

impl From<ProgramEffect> for ProgramRepr {
    fn from(program: ProgramEffect) -> Self {
        let values = program
            .parameters
            .iter()
            .zip(&program.values)
            .map(|(spec, value)| (spec.id().to_string(), *value))
            .collect();
        Self {
            id: program.id,
            display_name: program.display_name,
            source: program.source.to_string(),
            parameters: program.parameters.to_vec(),
            values,
            uniforms: program.uniforms.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tint() -> ProgramEffect {
        ProgramEffect::builder("tint", "Tint", "fn effect_main() {}")
            .parameter(ParameterSpec::percentage("amount", "Amount", 0.5))
            .parameter(ParameterSpec::color("color", "Color", 0xFFFF_0000))
            .parameter(ParameterSpec::toggle("enabled", "Enabled", true))
            .parameter(ParameterSpec::pixel("size", "Size", 0.0..=20.0, 0.0))
            .uniform("resolution", UniformSource::Resolution)
            .uniform("amount", UniformSource::Parameter("amount".into()))
            .uniform("color", UniformSource::Parameter("color".into()))
            .uniform("enabled", UniformSource::Parameter("enabled".into()))
            .uniform(
                "size",
                UniformSource::ParameterAtLeast {
                    id: "size".into(),
                    min: 1.0,
                },
            )
            .build()
            .expect("valid program")
    }

    #[test]
    fn builds_uniforms_from_current_values() {
        let effect = tint().with_value("amount", ParameterValue::Float(0.25));
        assert_eq!(
            effect.build_uniforms(320.0, 200.0),
            vec![
                Uniform::float("resolution", [320.0, 200.0]),
                Uniform::float("amount", [0.25]),
                Uniform::color("color", 0xFFFF_0000),
                Uniform::int("enabled", [1]),
                Uniform::float("size", [1.0]),
            ]
        );
    }

    #[test]
    fn uniforms_are_a_pure_function_of_size() {
        let effect = tint();
        assert_eq!(
            effect.build_uniforms(10.0, 20.0),
            effect.build_uniforms(10.0, 20.0)
        );
        assert_ne!(
            effect.build_uniforms(10.0, 20.0),
            effect.build_uniforms(20.0, 10.0)
        );
    }

    #[test]
    fn with_value_changes_exactly_one_parameter() {
        let effect = tint();
        let next = effect.with_value("size", ParameterValue::Float(7.0));
        assert_eq!(next.value("size"), Some(ParameterValue::Float(7.0)));
        for id in ["amount", "color", "enabled"] {
            assert_eq!(next.value(id), effect.value(id));
        }
        assert_eq!(effect.value("size"), Some(ParameterValue::Float(0.0)));
    }

    #[test]
    fn unknown_or_rejected_values_are_no_ops() {
        let effect = tint();
        assert_eq!(effect.with_value("missing", ParameterValue::Float(1.0)), effect);
        assert_eq!(effect.with_value("color", ParameterValue::Float(1.0)), effect);
    }

    #[test]
    fn builder_rejects_duplicates_and_dangling_uniforms() {
        let duplicate = ProgramEffect::builder("x", "X", "")
            .parameter(ParameterSpec::percentage("a", "A", 0.0))
            .parameter(ParameterSpec::percentage("a", "A", 1.0))
            .build();
        assert_eq!(duplicate, Err(EffectError::DuplicateParameter("a".into())));

        let dangling = ProgramEffect::builder("x", "X", "")
            .uniform("b", UniformSource::Parameter("b".into()))
            .build();
        assert!(matches!(dangling, Err(EffectError::UnknownParameter { .. })));

        let clash = ProgramEffect::builder("x", "X", "")
            .uniform("time", UniformSource::Time)
            .uniform("time", UniformSource::Resolution)
            .build();
        assert_eq!(clash, Err(EffectError::DuplicateUniform("time".into())));
    }

    #[test]
    fn animated_binds_time_and_honours_toggle() {
        let program = ProgramEffect::builder("wave", "Wave", "")
            .parameter(ParameterSpec::toggle("animate", "Animate", true))
            .uniform("time", UniformSource::Time)
            .build()
            .expect("valid program");
        let animated = AnimatedEffect::new(program)
            .with_animate_toggle("animate")
            .expect("toggle exists");

        assert!(animated.is_animating());
        let later = animated.with_time(2.5);
        assert_eq!(later.time(), 2.5);
        assert_eq!(animated.time(), 0.0);
        assert_eq!(
            later.build_uniforms(1.0, 1.0),
            vec![Uniform::float("time", [2.5])]
        );

        let paused = later.with_value("animate", ParameterValue::Bool(false));
        assert!(!paused.is_animating());
        assert_eq!(paused.time(), 2.5);
    }

    #[test]
    fn animate_toggle_must_be_a_declared_toggle() {
        let program = ProgramEffect::builder("wave", "Wave", "")
            .parameter(ParameterSpec::percentage("speed", "Speed", 1.0))
            .build()
            .expect("valid program");
        let err = AnimatedEffect::new(program).with_animate_toggle("speed");
        assert_eq!(err, Err(EffectError::NotAToggle("speed".into())));
    }

    #[test]
    fn deserialized_animate_toggle_must_be_a_declared_toggle() {
        let program = ProgramEffect::builder("wave", "Wave", "")
            .parameter(ParameterSpec::percentage("speed", "Speed", 1.0))
            .parameter(ParameterSpec::toggle("animate", "Animate", true))
            .uniform("time", UniformSource::Time)
            .build()
            .expect("valid program");
        let mut json = serde_json::to_value(
            AnimatedEffect::new(program)
                .with_animate_toggle("animate")
                .expect("toggle exists")
                .with_time(1.5),
        )
        .expect("serialize");

        let back: AnimatedEffect = serde_json::from_value(json.clone()).expect("deserialize");
        assert_eq!(back.time(), 1.5);
        assert!(back.is_animating());

        json["animate_toggle"] = serde_json::json!("speed");
        let err = serde_json::from_value::<AnimatedEffect>(json.clone()).unwrap_err();
        assert!(err.to_string().contains("speed"), "{err}");

        json["animate_toggle"] = serde_json::json!("missing");
        assert!(serde_json::from_value::<AnimatedEffect>(json).is_err());
    }
}
