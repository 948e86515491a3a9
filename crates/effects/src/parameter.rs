use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Declares one tunable input of an effect.
///
/// The kind fixes both the accepted value shape and the range. Constructors
/// clamp the declared default into the range, so `default ∈ range` holds for
/// every spec that exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    id: String,
    label: String,
    kind: ParameterKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterKind {
    /// Bounded float shown with `decimal_places` digits.
    Float {
        min: f32,
        max: f32,
        default: f32,
        decimal_places: u8,
    },
    /// Fraction in `0.0..=1.0`, shown as a percentage.
    Percentage { default: f32 },
    /// Length in pixels.
    Pixel { min: f32, max: f32, default: f32 },
    Toggle { default: bool },
    /// Packed ARGB color.
    Color { default: u32 },
}

/// A typed parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterValue {
    Float(f32),
    Bool(bool),
    Color(u32),
}

impl ParameterValue {
    /// Legacy float projection: booleans map to `0`/`1`, colors to `0`.
    pub fn to_float(self) -> f32 {
        match self {
            ParameterValue::Float(value) => value,
            ParameterValue::Bool(true) => 1.0,
            ParameterValue::Bool(false) => 0.0,
            ParameterValue::Color(_) => 0.0,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            ParameterValue::Bool(flag) => Some(flag),
            _ => None,
        }
    }

    pub fn as_color(self) -> Option<u32> {
        match self {
            ParameterValue::Color(color) => Some(color),
            _ => None,
        }
    }
}

impl ParameterSpec {
    pub fn float(
        id: impl Into<String>,
        label: impl Into<String>,
        range: RangeInclusive<f32>,
        default: f32,
    ) -> Self {
        let (min, max) = ordered(range);
        Self::new(
            id,
            label,
            ParameterKind::Float {
                min,
                max,
                default: default.clamp(min, max),
                decimal_places: 1,
            },
        )
    }

    pub fn percentage(id: impl Into<String>, label: impl Into<String>, default: f32) -> Self {
        Self::new(
            id,
            label,
            ParameterKind::Percentage {
                default: default.clamp(0.0, 1.0),
            },
        )
    }

    pub fn pixel(
        id: impl Into<String>,
        label: impl Into<String>,
        range: RangeInclusive<f32>,
        default: f32,
    ) -> Self {
        let (min, max) = ordered(range);
        Self::new(
            id,
            label,
            ParameterKind::Pixel {
                min,
                max,
                default: default.clamp(min, max),
            },
        )
    }

    pub fn toggle(id: impl Into<String>, label: impl Into<String>, default: bool) -> Self {
        Self::new(id, label, ParameterKind::Toggle { default })
    }

    pub fn color(id: impl Into<String>, label: impl Into<String>, default: u32) -> Self {
        Self::new(id, label, ParameterKind::Color { default })
    }

    fn new(id: impl Into<String>, label: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
        }
    }

    /// Overrides the display precision of a float parameter. Other kinds are
    /// returned unchanged.
    pub fn with_decimal_places(mut self, places: u8) -> Self {
        if let ParameterKind::Float { decimal_places, .. } = &mut self.kind {
            *decimal_places = places;
        }
        self
    }

    /// Same spec under a different id.
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: self.label.clone(),
            kind: self.kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    pub fn range(&self) -> RangeInclusive<f32> {
        match self.kind {
            ParameterKind::Float { min, max, .. } | ParameterKind::Pixel { min, max, .. } => {
                min..=max
            }
            ParameterKind::Percentage { .. }
            | ParameterKind::Toggle { .. }
            | ParameterKind::Color { .. } => 0.0..=1.0,
        }
    }

    /// Legacy float default. Colors report `0`.
    pub fn default_value(&self) -> f32 {
        self.default_typed().to_float()
    }

    pub fn default_typed(&self) -> ParameterValue {
        match self.kind {
            ParameterKind::Float { default, .. }
            | ParameterKind::Percentage { default }
            | ParameterKind::Pixel { default, .. } => ParameterValue::Float(default),
            ParameterKind::Toggle { default } => ParameterValue::Bool(default),
            ParameterKind::Color { default } => ParameterValue::Color(default),
        }
    }

    /// Checks `value` against this spec.
    ///
    /// Floats are clamped into range, toggles accept booleans as well as the
    /// legacy float encoding (`> 0.5` is on), colors only accept colors.
    /// Anything else, including NaN, is rejected with `None`.
    pub fn validate(&self, value: ParameterValue) -> Option<ParameterValue> {
        match (self.kind, value) {
            (_, ParameterValue::Float(raw)) if raw.is_nan() => None,
            (
                ParameterKind::Float { .. }
                | ParameterKind::Percentage { .. }
                | ParameterKind::Pixel { .. },
                ParameterValue::Float(raw),
            ) => {
                let range = self.range();
                Some(ParameterValue::Float(raw.clamp(*range.start(), *range.end())))
            }
            (ParameterKind::Toggle { .. }, ParameterValue::Bool(flag)) => {
                Some(ParameterValue::Bool(flag))
            }
            (ParameterKind::Toggle { .. }, ParameterValue::Float(raw)) => {
                Some(ParameterValue::Bool(raw > 0.5))
            }
            (ParameterKind::Color { .. }, ParameterValue::Color(color)) => {
                Some(ParameterValue::Color(color))
            }
            _ => None,
        }
    }

    pub fn is_toggle(&self) -> bool {
        matches!(self.kind, ParameterKind::Toggle { .. })
    }
}

fn ordered(range: RangeInclusive<f32>) -> (f32, f32) {
    let (start, end) = range.into_inner();
    if start <= end {
        (start, end)
    } else {
        (end, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clamped_into_range() {
        let spec = ParameterSpec::pixel("size", "Size", 1.0..=100.0, 500.0);
        assert_eq!(spec.default_value(), 100.0);
        let spec = ParameterSpec::float("f", "F", 20.0..=1.0, -3.0);
        assert_eq!(spec.range(), 1.0..=20.0);
        assert_eq!(spec.default_value(), 1.0);
    }

    #[test]
    fn floats_are_clamped_on_validation() {
        let spec = ParameterSpec::percentage("intensity", "Intensity", 1.0);
        assert_eq!(
            spec.validate(ParameterValue::Float(2.5)),
            Some(ParameterValue::Float(1.0))
        );
        assert_eq!(
            spec.validate(ParameterValue::Float(-1.0)),
            Some(ParameterValue::Float(0.0))
        );
        assert_eq!(spec.validate(ParameterValue::Float(f32::NAN)), None);
        assert_eq!(spec.validate(ParameterValue::Bool(true)), None);
    }

    #[test]
    fn toggles_bridge_legacy_floats() {
        let spec = ParameterSpec::toggle("animate", "Animate", true);
        assert_eq!(spec.default_value(), 1.0);
        assert_eq!(
            spec.validate(ParameterValue::Float(0.2)),
            Some(ParameterValue::Bool(false))
        );
        assert_eq!(
            spec.validate(ParameterValue::Float(0.8)),
            Some(ParameterValue::Bool(true))
        );
        assert_eq!(spec.validate(ParameterValue::Color(0xFF00_0000)), None);
    }

    #[test]
    fn colors_only_accept_colors() {
        let spec = ParameterSpec::color("tint", "Tint", 0xFFF3_A397);
        assert_eq!(spec.default_value(), 0.0);
        assert_eq!(spec.default_typed(), ParameterValue::Color(0xFFF3_A397));
        assert_eq!(spec.validate(ParameterValue::Float(0.3)), None);
        assert_eq!(
            spec.validate(ParameterValue::Color(0x1234_5678)),
            Some(ParameterValue::Color(0x1234_5678))
        );
    }

    #[test]
    fn with_id_keeps_kind_and_label() {
        let spec = ParameterSpec::float("frequency", "Frequency", 1.0..=20.0, 5.0)
            .with_decimal_places(2);
        let renamed = spec.with_id("0_frequency");
        assert_eq!(renamed.id(), "0_frequency");
        assert_eq!(renamed.label(), "Frequency");
        assert_eq!(renamed.kind(), spec.kind());
    }
}
