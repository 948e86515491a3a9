use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::composite::{combine, CompositeEffect};
use crate::native::NativeEffect;
use crate::parameter::{ParameterSpec, ParameterValue};
use crate::program::{AnimatedEffect, ProgramEffect};

/// Declarative description of a visual effect.
///
/// Effects are plain immutable values: cheap to clone, comparable, and safe
/// to rebuild every frame. Turning one into something drawable is the job of
/// a shader factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Realised by a backend primitive.
    Native(NativeEffect),
    /// Realised by compiling program source.
    Program(ProgramEffect),
    /// Program source plus a time input.
    Animated(AnimatedEffect),
    /// Ordered chain; never nested.
    Composite(CompositeEffect),
}

impl Effect {
    pub fn id(&self) -> Cow<'_, str> {
        match self {
            Effect::Native(native) => Cow::Borrowed(native.id()),
            Effect::Program(program) => Cow::Borrowed(program.id()),
            Effect::Animated(animated) => Cow::Borrowed(animated.program().id()),
            Effect::Composite(composite) => Cow::Owned(composite.id()),
        }
    }

    pub fn display_name(&self) -> Cow<'_, str> {
        match self {
            Effect::Native(native) => Cow::Borrowed(native.display_name()),
            Effect::Program(program) => Cow::Borrowed(program.display_name()),
            Effect::Animated(animated) => Cow::Borrowed(animated.program().display_name()),
            Effect::Composite(composite) => Cow::Owned(composite.display_name()),
        }
    }

    pub fn parameters(&self) -> Vec<ParameterSpec> {
        match self {
            Effect::Native(native) => native.parameters(),
            Effect::Program(program) => program.parameters().to_vec(),
            Effect::Animated(animated) => animated.program().parameters().to_vec(),
            Effect::Composite(composite) => composite.parameters(),
        }
    }

    /// Sets a parameter through the legacy float path.
    pub fn with_parameter(&self, id: &str, value: f32) -> Effect {
        self.with_typed_parameter(id, ParameterValue::Float(value))
    }

    /// Returns an effect with exactly parameter `id` changed. Unknown ids and
    /// values rejected by the parameter spec return an equal effect.
    pub fn with_typed_parameter(&self, id: &str, value: ParameterValue) -> Effect {
        match self {
            Effect::Native(native) => Effect::Native(native.with_value(id, value)),
            Effect::Program(program) => Effect::Program(program.with_value(id, value)),
            Effect::Animated(animated) => Effect::Animated(animated.with_value(id, value)),
            Effect::Composite(composite) => {
                Effect::Composite(composite.with_typed_parameter(id, value))
            }
        }
    }

    /// Current value of `id` projected to a float; `0.0` for unknown ids.
    pub fn parameter_value(&self, id: &str) -> f32 {
        self.typed_parameter_value(id)
            .map(ParameterValue::to_float)
            .unwrap_or(0.0)
    }

    pub fn typed_parameter_value(&self, id: &str) -> Option<ParameterValue> {
        match self {
            Effect::Native(native) => native.value(id),
            Effect::Program(program) => program.value(id),
            Effect::Animated(animated) => animated.program().value(id),
            Effect::Composite(composite) => composite.typed_parameter_value(id),
        }
    }

    pub fn has_shader_source(&self) -> bool {
        self.shader_source().is_some()
    }

    pub fn shader_source(&self) -> Option<&str> {
        match self {
            Effect::Program(program) => Some(program.source()),
            Effect::Animated(animated) => Some(animated.program().source()),
            Effect::Native(_) | Effect::Composite(_) => None,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Effect::Native(_))
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, Effect::Animated(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Effect::Composite(_))
    }

    /// Sets the clock of every animated stage to `time` seconds. Effects
    /// without a time input are returned unchanged.
    pub fn with_time(&self, time: f32) -> Effect {
        match self {
            Effect::Animated(animated) => Effect::Animated(animated.with_time(time)),
            Effect::Composite(composite) => {
                Effect::Composite(composite.map_effects(|effect| effect.with_time(time)))
            }
            Effect::Native(_) | Effect::Program(_) => self.clone(),
        }
    }

    /// Chains `next` after this effect.
    pub fn then(self, next: Effect) -> Effect {
        Effect::Composite(combine(self, next))
    }
}

impl From<NativeEffect> for Effect {
    fn from(effect: NativeEffect) -> Self {
        Effect::Native(effect)
    }
}

impl From<ProgramEffect> for Effect {
    fn from(effect: ProgramEffect) -> Self {
        Effect::Program(effect)
    }
}

impl From<AnimatedEffect> for Effect {
    fn from(effect: AnimatedEffect) -> Self {
        Effect::Animated(effect)
    }
}

impl From<CompositeEffect> for Effect {
    fn from(effect: CompositeEffect) -> Self {
        Effect::Composite(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    #[test]
    fn capability_flags_match_variant() {
        let blur = builtin::blur(5.0);
        assert!(blur.is_native());
        assert!(!blur.has_shader_source());

        let wave = builtin::wave(10.0, 5.0, true);
        assert!(wave.is_animated());
        assert!(wave.has_shader_source());

        let chain = blur.then(wave);
        assert!(chain.is_composite());
        assert_eq!(chain.shader_source(), None);
    }

    #[test]
    fn legacy_float_path_round_trips() {
        let vignette = builtin::vignette(0.5, 0.5).with_parameter("radius", 0.8);
        assert_eq!(vignette.parameter_value("radius"), 0.8);
        assert_eq!(vignette.parameter_value("intensity"), 0.5);
        assert_eq!(vignette.parameter_value("nope"), 0.0);
    }

    #[test]
    fn toggles_and_colors_project_to_floats() {
        let wave = builtin::wave(10.0, 5.0, true);
        assert_eq!(wave.parameter_value("animate"), 1.0);
        let paused = wave.with_parameter("animate", 0.0);
        assert_eq!(paused.parameter_value("animate"), 0.0);

        let gradient = builtin::gradient_overlay(0xFF11_2233, 0xFF44_5566, 0.5);
        assert_eq!(gradient.parameter_value("color1"), 0.0);
        assert_eq!(
            gradient.typed_parameter_value("color1"),
            Some(ParameterValue::Color(0xFF11_2233))
        );
        assert_eq!(gradient.with_parameter("color1", 1.0), gradient);
    }

    #[test]
    fn time_reaches_animated_stages_only() {
        let chain = builtin::vignette(0.5, 0.5)
            .then(builtin::wave(10.0, 5.0, true))
            .with_time(2.5);
        let Effect::Composite(composite) = &chain else {
            panic!("expected composite");
        };
        assert_eq!(composite.get(0), Some(&builtin::vignette(0.5, 0.5)));
        match composite.get(1) {
            Some(Effect::Animated(wave)) => assert_eq!(wave.time(), 2.5),
            other => panic!("unexpected stage {other:?}"),
        }
        assert_eq!(builtin::blur(3.0).with_time(1.0), builtin::blur(3.0));
    }

    #[test]
    fn serializes_by_value() {
        let chain = builtin::vignette(0.3, 0.7)
            .then(builtin::blur(2.0))
            .then(builtin::wave(4.0, 2.0, false));
        let json = serde_json::to_string(&chain).expect("serialize");
        let back: Effect = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, chain);
    }
}
