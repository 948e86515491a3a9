//! Ordered chains of effects.
//!
//! A composite exposes the parameters of its children under prefixed ids
//! (`"{index}_{id}"`) so a UI can drive every stage through one flat list:
//!
//! ```text
//!   [vignette, wave]       ──▶  0_radius, 0_intensity,
//!                               1_amplitude, 1_frequency, 1_animate
//! ```
//!
//! Composites never nest; adding a composite splices its children in.

use serde::{Deserialize, Serialize};

use crate::effect::Effect;
use crate::parameter::{ParameterSpec, ParameterValue};
use crate::EffectError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CompositeRepr", into = "CompositeRepr")]
pub struct CompositeEffect {
    effects: Vec<Effect>,
}

impl CompositeEffect {
    /// Builds a chain, flattening nested composites. An empty chain is
    /// rejected.
    pub fn new(effects: impl IntoIterator<Item = Effect>) -> Result<Self, EffectError> {
        let mut flat = Vec::new();
        for effect in effects {
            push_flat(&mut flat, effect);
        }
        if flat.is_empty() {
            return Err(EffectError::EmptyComposite);
        }
        Ok(Self { effects: flat })
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Effect> {
        self.effects.get(index)
    }

    /// Appends `effect` at the end of the chain.
    pub fn push(&mut self, effect: Effect) {
        push_flat(&mut self.effects, effect);
    }

    pub fn id(&self) -> String {
        let ids: Vec<_> = self.effects.iter().map(Effect::id).collect();
        format!("composite_{}", ids.join("_"))
    }

    pub fn display_name(&self) -> String {
        let names: Vec<_> = self.effects.iter().map(Effect::display_name).collect();
        names.join(" + ")
    }

    /// Child parameters under prefixed ids, recomputed on every call.
    pub fn parameters(&self) -> Vec<ParameterSpec> {
        self.effects
            .iter()
            .enumerate()
            .flat_map(|(index, effect)| {
                effect
                    .parameters()
                    .into_iter()
                    .map(move |spec| spec.with_id(prefix_parameter_id(index, spec.id())))
            })
            .collect()
    }

    pub fn typed_parameter_value(&self, id: &str) -> Option<ParameterValue> {
        let (index, child_id) = split_parameter_id(id)?;
        self.effects.get(index)?.typed_parameter_value(child_id)
    }

    /// Routes a prefixed id to its child. Ids without a valid prefix or with
    /// an out-of-range index leave the composite unchanged.
    pub fn with_typed_parameter(&self, id: &str, value: ParameterValue) -> Self {
        let Some((index, child_id)) = split_parameter_id(id) else {
            return self.clone();
        };
        let Some(child) = self.effects.get(index) else {
            return self.clone();
        };
        let mut next = self.clone();
        next.effects[index] = child.with_typed_parameter(child_id, value);
        next
    }

    /// Applies `f` to every child, keeping the order.
    pub fn map_effects(&self, f: impl FnMut(&Effect) -> Effect) -> Self {
        let mut effects = Vec::with_capacity(self.effects.len());
        for effect in self.effects.iter().map(f) {
            push_flat(&mut effects, effect);
        }
        Self { effects }
    }
}

/// Chains `first` then `second`, splicing in the children of either side if
/// it is already a composite.
pub fn combine(first: Effect, second: Effect) -> CompositeEffect {
    let mut effects = Vec::new();
    push_flat(&mut effects, first);
    push_flat(&mut effects, second);
    CompositeEffect { effects }
}

pub fn prefix_parameter_id(index: usize, id: &str) -> String {
    format!("{index}_{id}")
}

/// Splits `"{index}_{id}"` at the first underscore. The child id may itself
/// contain underscores.
pub fn split_parameter_id(id: &str) -> Option<(usize, &str)> {
    let (index, rest) = id.split_once('_')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((index.parse().ok()?, rest))
}

fn push_flat(effects: &mut Vec<Effect>, effect: Effect) {
    match effect {
        Effect::Composite(composite) => effects.extend(composite.effects),
        other => effects.push(other),
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct CompositeRepr {
    effects: Vec<Effect>,
}

impl TryFrom<CompositeRepr> for CompositeEffect {
    type Error = EffectError;

    fn try_from(repr: CompositeRepr) -> Result<Self, Self::Error> {
        CompositeEffect::new(repr.effects)
    }
}

impl From<CompositeEffect> for CompositeRepr {
    fn from(composite: CompositeEffect) -> Self {
        Self {
            effects: composite.effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    #[test]
    fn combining_flattens() {
        let a = builtin::grayscale(1.0);
        let b = builtin::vignette(0.5, 0.5);
        let c = builtin::blur(4.0);

        let left = combine(Effect::Composite(combine(a.clone(), b.clone())), c.clone());
        let right = combine(a.clone(), Effect::Composite(combine(b.clone(), c.clone())));
        assert_eq!(left.effects(), &[a.clone(), b.clone(), c.clone()]);
        assert_eq!(left, right);
        assert!(left.effects().iter().all(|effect| !effect.is_composite()));
    }

    #[test]
    fn empty_chain_is_rejected() {
        assert_eq!(
            CompositeEffect::new(Vec::new()),
            Err(EffectError::EmptyComposite)
        );
    }

    #[test]
    fn id_and_name_join_children() {
        let chain = combine(builtin::grayscale(1.0), builtin::blur(3.0));
        assert_eq!(chain.id(), "composite_grayscale_blur");
        assert_eq!(chain.display_name(), "Grayscale + Blur");
    }

    #[test]
    fn parameters_are_prefixed_by_position() {
        let chain = combine(builtin::vignette(0.5, 0.5), builtin::blur(3.0));
        let ids: Vec<_> = chain
            .parameters()
            .iter()
            .map(|spec| spec.id().to_string())
            .collect();
        assert_eq!(ids, ["0_radius", "0_intensity", "1_radius"]);
    }

    #[test]
    fn split_inverts_prefix() {
        for (index, id) in [(0, "radius"), (12, "pixel_size"), (3, "a_b_c")] {
            let prefixed = prefix_parameter_id(index, id);
            assert_eq!(split_parameter_id(&prefixed), Some((index, id)));
        }
        assert_eq!(split_parameter_id("radius"), None);
        assert_eq!(split_parameter_id("_radius"), None);
        assert_eq!(split_parameter_id("x_radius"), None);
        assert_eq!(split_parameter_id("-1_radius"), None);
    }

    #[test]
    fn parameters_route_to_the_addressed_child() {
        let chain = combine(builtin::blur(3.0), builtin::blur(3.0));
        let next = chain.with_typed_parameter("1_radius", ParameterValue::Float(9.0));
        assert_eq!(
            next.typed_parameter_value("1_radius"),
            Some(ParameterValue::Float(9.0))
        );
        assert_eq!(
            next.typed_parameter_value("0_radius"),
            Some(ParameterValue::Float(3.0))
        );

        assert_eq!(
            chain.with_typed_parameter("7_radius", ParameterValue::Float(9.0)),
            chain
        );
        assert_eq!(
            chain.with_typed_parameter("radius", ParameterValue::Float(9.0)),
            chain
        );
        assert_eq!(chain.typed_parameter_value("7_radius"), None);
    }
}
