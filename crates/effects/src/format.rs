//! Human-readable rendering of parameter values for listings and UIs.

use crate::color::format_hex;
use crate::parameter::{ParameterKind, ParameterSpec, ParameterValue};

/// Formats `value` the way `spec` expects it to be displayed.
///
/// ```text
/// Float       "5.0"  (spec decimal places)
/// Percentage  "50%"
/// Pixel       "10px"
/// Toggle      "On" / "Off"
/// Color       "#F3A397"
/// ```
pub fn format_value(spec: &ParameterSpec, value: ParameterValue) -> String {
    match (spec.kind(), value) {
        (_, ParameterValue::Color(color)) => format_hex(color),
        (ParameterKind::Toggle { .. }, value) | (_, value @ ParameterValue::Bool(_)) => {
            let label = if value.to_float() > 0.5 { "On" } else { "Off" };
            label.to_string()
        }
        (ParameterKind::Float { decimal_places, .. }, ParameterValue::Float(raw)) => {
            format_float(raw, *decimal_places)
        }
        (ParameterKind::Percentage { .. }, ParameterValue::Float(raw)) => {
            format!("{}%", (raw * 100.0).round() as i32)
        }
        (ParameterKind::Pixel { .. }, ParameterValue::Float(raw)) => {
            format!("{}px", raw.round() as i32)
        }
        (ParameterKind::Color { .. }, ParameterValue::Float(raw)) => format_float(raw, 1),
    }
}

/// Formats the spec's default.
pub fn format_default(spec: &ParameterSpec) -> String {
    format_value(spec, spec.default_typed())
}

pub fn format_float(value: f32, decimal_places: u8) -> String {
    format!("{value:.prec$}", prec = usize::from(decimal_places))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_kind() {
        let float = ParameterSpec::float("frequency", "Frequency", 1.0..=20.0, 5.0);
        assert_eq!(format_default(&float), "5.0");
        assert_eq!(
            format_value(&float.clone().with_decimal_places(2), ParameterValue::Float(3.14159)),
            "3.14"
        );

        let percent = ParameterSpec::percentage("intensity", "Intensity", 0.5);
        assert_eq!(format_default(&percent), "50%");
        assert_eq!(format_value(&percent, ParameterValue::Float(0.29)), "29%");

        let pixel = ParameterSpec::pixel("radius", "Radius", 0.0..=50.0, 10.7);
        assert_eq!(format_default(&pixel), "11px");
        assert_eq!(format_value(&pixel, ParameterValue::Float(4.2)), "4px");

        let toggle = ParameterSpec::toggle("animate", "Animate", true);
        assert_eq!(format_default(&toggle), "On");
        assert_eq!(format_value(&toggle, ParameterValue::Float(0.1)), "Off");

        let color = ParameterSpec::color("color1", "Color 1", 0xFFF3_A397);
        assert_eq!(format_default(&color), "#F3A397");
    }
}
