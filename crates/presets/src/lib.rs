use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use effects::{builtin, color, Effect, ParameterValue};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("preset '{preset}' references unknown effect '{effect}'")]
    UnknownEffect { preset: String, effect: String },
    #[error("preset '{preset}' sets unknown parameter '{parameter}' on effect '{effect}'")]
    UnknownParameter {
        preset: String,
        effect: String,
        parameter: String,
    },
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSetting {
    Auto,
    Gpu,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceSetting {
    Gamma,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    Low,
    High,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresetConfig {
    pub version: u32,
    #[serde(default)]
    pub factory: FactorySettings,
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,
}

/// Overrides for the effect factory; unset fields keep the factory defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FactorySettings {
    pub max_cache_size: Option<usize>,
    pub backend: Option<BackendSetting>,
    pub color_space: Option<ColorSpaceSetting>,
    pub power: Option<PowerSetting>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Preset {
    #[serde(default)]
    pub steps: Vec<PresetStep>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresetStep {
    pub effect: String,
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        skip_serializing
    )]
    pub time: Option<Duration>,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

/// A parameter as written in TOML: numbers are floats, booleans are
/// toggles and `"#RRGGBB"`/`"#AARRGGBB"` strings are colors.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn to_parameter_value(&self) -> Result<ParameterValue, String> {
        match self {
            ParamValue::Bool(flag) => Ok(ParameterValue::Bool(*flag)),
            ParamValue::Number(value) => Ok(ParameterValue::Float(*value as f32)),
            ParamValue::Text(raw) => color::parse_hex(raw)
                .map(ParameterValue::Color)
                .ok_or_else(|| format!("'{raw}' is not a color; expected #RRGGBB or #AARRGGBB")),
        }
    }
}

impl FromStr for ParamValue {
    type Err = std::convert::Infallible;

    /// Reads a command-line value: `true`/`on`/`false`/`off` are toggles,
    /// anything numeric is a float, everything else is kept as text.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "true" | "on" => ParamValue::Bool(true),
            "false" | "off" => ParamValue::Bool(false),
            _ => match trimmed.parse::<f64>() {
                Ok(value) => ParamValue::Number(value),
                Err(_) => ParamValue::Text(trimmed.to_string()),
            },
        })
    }
}

/// Step times are seconds (`2`, `1.5`) or humantime strings (`"1500ms"`).
fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a number of seconds or a duration string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            de::Visitor::visit_f64(self, v as f64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if !v.is_finite() || v < 0.0 {
                return Err(E::custom("duration must be a non-negative number of seconds"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            version: 1,
            factory: FactorySettings::default(),
            presets: BTreeMap::new(),
        }
    }
}

impl PresetConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: PresetConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        for (name, preset) in &self.presets {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("preset name may not be empty".into()));
            }
            if preset.steps.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "preset '{name}' must contain at least one step"
                )));
            }
            for step in &preset.steps {
                step.resolve(name)?;
            }
        }

        Ok(())
    }

    /// Builds the effect chain for preset `name`. A single-step preset
    /// resolves to that effect; longer presets become a composite.
    pub fn resolve(&self, name: &str) -> Result<Effect, ConfigError> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
        preset.resolve(name)
    }
}

impl Preset {
    pub fn resolve(&self, name: &str) -> Result<Effect, ConfigError> {
        let mut steps = self.steps.iter();
        let first = steps
            .next()
            .ok_or_else(|| {
                ConfigError::Invalid(format!("preset '{name}' must contain at least one step"))
            })?
            .resolve(name)?;
        steps.try_fold(first, |chain, step| Ok(chain.then(step.resolve(name)?)))
    }
}

impl PresetStep {
    fn resolve(&self, preset: &str) -> Result<Effect, ConfigError> {
        let mut effect = builtin::by_id(&self.effect).ok_or_else(|| ConfigError::UnknownEffect {
            preset: preset.to_string(),
            effect: self.effect.clone(),
        })?;
        let specs = effect.parameters();

        for (id, raw) in &self.params {
            let Some(spec) = specs.iter().find(|spec| spec.id() == id) else {
                return Err(ConfigError::UnknownParameter {
                    preset: preset.to_string(),
                    effect: self.effect.clone(),
                    parameter: id.clone(),
                });
            };
            let value = raw.to_parameter_value().map_err(|message| {
                ConfigError::Invalid(format!(
                    "preset '{preset}' parameter '{id}' on '{}': {message}",
                    self.effect
                ))
            })?;
            if spec.validate(value).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "preset '{preset}' parameter '{id}' on '{}' does not accept {raw:?}",
                    self.effect
                )));
            }
            effect = effect.with_typed_parameter(id, value);
        }

        if let Some(time) = self.time {
            if !effect.is_animated() {
                tracing::debug!(preset, effect = %self.effect, "ignoring time on a static effect");
            }
            effect = effect.with_time(time.as_secs_f32());
        }

        Ok(effect)
    }
}
