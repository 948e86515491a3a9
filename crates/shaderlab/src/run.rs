use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use effects::{builtin, Effect};
use presets::{BackendSetting, ColorSpaceSetting, FactorySettings, ParamValue, PowerSetting, PresetConfig};
use renderer::{
    create_image_processor, BackendPreference, ColorSpaceMode, FactoryConfig, GpuPowerPreference,
    ImageProcessor,
};
use tracing_subscriber::EnvFilter;

use crate::cli::{ApplyArgs, FactoryArgs};
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the explicit config file, or the default one if it exists.
pub fn load_config(explicit: Option<&Path>) -> Result<PresetConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = AppPaths::discover()?.config_file();
            if !default.exists() {
                tracing::debug!(path = %default.display(), "no preset config found; using defaults");
                return Ok(PresetConfig::default());
            }
            default
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = PresetConfig::from_toml_str(&raw)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        presets = config.presets.len(),
        "loaded preset config"
    );
    Ok(config)
}

/// Defaults, then the config file's `[factory]` table, then command-line flags.
pub fn factory_config(settings: &FactorySettings, args: &FactoryArgs) -> FactoryConfig {
    let mut config = FactoryConfig::default();
    if let Some(size) = settings.max_cache_size {
        config.max_cache_size = size;
    }
    if let Some(backend) = settings.backend {
        config.backend = match backend {
            BackendSetting::Auto => BackendPreference::Auto,
            BackendSetting::Gpu => BackendPreference::Gpu,
            BackendSetting::None => BackendPreference::None,
        };
    }
    if let Some(color_space) = settings.color_space {
        config.color_space = match color_space {
            ColorSpaceSetting::Gamma => ColorSpaceMode::Gamma,
            ColorSpaceSetting::Linear => ColorSpaceMode::Linear,
        };
    }
    if let Some(power) = settings.power {
        config.power = match power {
            PowerSetting::Low => GpuPowerPreference::Low,
            PowerSetting::High => GpuPowerPreference::High,
        };
    }

    if let Some(size) = args.cache_size {
        config.max_cache_size = size;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(color_space) = args.color_space {
        config.color_space = color_space;
    }
    config
}

/// Builds the effect requested on the command line: the preset (if any)
/// followed by each `--effect`, with `--param` and `--time` applied last.
pub fn build_effect(
    config: &PresetConfig,
    preset: Option<&str>,
    effect_ids: &[String],
    params: &[(String, String)],
    time: Option<f32>,
) -> Result<Effect> {
    let mut stages = Vec::new();
    if let Some(name) = preset {
        stages.push(config.resolve(name)?);
    }
    for id in effect_ids {
        let effect = builtin::by_id(id).ok_or_else(|| {
            anyhow!("unknown effect '{id}'; run `shaderlab list` to see available effects")
        })?;
        stages.push(effect);
    }

    let mut stages = stages.into_iter();
    let first = stages
        .next()
        .ok_or_else(|| anyhow!("nothing to apply; pass --effect and/or --preset"))?;
    let mut effect = stages.fold(first, Effect::then);

    let specs = effect.parameters();
    for (id, raw) in params {
        let spec = specs.iter().find(|spec| spec.id() == id).ok_or_else(|| {
            let known: Vec<_> = specs.iter().map(|spec| spec.id()).collect();
            anyhow!(
                "effect '{}' has no parameter '{id}' (known: {})",
                effect.id(),
                known.join(", ")
            )
        })?;
        let value = raw
            .parse::<ParamValue>()?
            .to_parameter_value()
            .map_err(|message| anyhow!("parameter '{id}': {message}"))?;
        if spec.validate(value).is_none() {
            bail!("parameter '{id}' does not accept '{raw}'");
        }
        effect = effect.with_typed_parameter(id, value);
    }

    if let Some(time) = time {
        if !time.is_finite() || time < 0.0 {
            bail!("--time must be a non-negative number of seconds");
        }
        effect = effect.with_time(time);
    }
    Ok(effect)
}

pub fn apply(config: &PresetConfig, args: ApplyArgs) -> Result<()> {
    let effect = build_effect(
        config,
        args.preset.as_deref(),
        &args.effects,
        &args.params,
        args.time,
    )?;
    let factory_config = factory_config(&config.factory, &args.factory);
    tracing::info!(
        effect = %effect.display_name(),
        input = %args.input.display(),
        backend = ?factory_config.backend,
        "applying effect"
    );

    let input = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let (width, height) = args
        .size
        .map(|(w, h)| (w as f32, h as f32))
        .unwrap_or((0.0, 0.0));

    let mut processor = create_image_processor(&factory_config);
    let output = processor
        .process(&input, &effect, width, height)
        .with_context(|| format!("failed to process {}", args.input.display()))?;
    if output == input {
        tracing::warn!("effect was not applied; wrote the input image unchanged");
    }

    if let Some(parent) = args.output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&args.output, &output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    tracing::info!(output = %args.output.display(), bytes = output.len(), "wrote image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use effects::ParameterValue;

    const CONFIG: &str = r#"
version = 1

[factory]
max_cache_size = 8
backend = "none"
color_space = "linear"

[presets.warm]
steps = [{ effect = "sepia", params = { intensity = 0.4 } }]
"#;

    #[test]
    fn flags_override_config_file() {
        let config = PresetConfig::from_toml_str(CONFIG).unwrap();
        let merged = factory_config(&config.factory, &FactoryArgs::default());
        assert_eq!(merged.max_cache_size, 8);
        assert_eq!(merged.backend, BackendPreference::None);
        assert_eq!(merged.color_space, ColorSpaceMode::Linear);
        assert_eq!(merged.power, GpuPowerPreference::Low);

        let args = FactoryArgs {
            backend: Some(BackendPreference::Gpu),
            color_space: None,
            cache_size: Some(0),
        };
        let merged = factory_config(&config.factory, &args);
        assert_eq!(merged.max_cache_size, 0);
        assert_eq!(merged.backend, BackendPreference::Gpu);
        assert_eq!(merged.color_space, ColorSpaceMode::Linear);
    }

    #[test]
    fn builds_preset_then_effects() {
        let config = PresetConfig::from_toml_str(CONFIG).unwrap();
        let effect = build_effect(
            &config,
            Some("warm"),
            &["wave_distortion".to_string()],
            &[
                ("1_animate".to_string(), "off".to_string()),
                ("1_amplitude".to_string(), "20".to_string()),
            ],
            Some(3.0),
        )
        .unwrap();

        assert_eq!(effect.id(), "composite_sepia_wave_distortion");
        assert_eq!(effect.parameter_value("0_intensity"), 0.4);
        assert_eq!(effect.parameter_value("1_amplitude"), 20.0);
        assert_eq!(
            effect.typed_parameter_value("1_animate"),
            Some(ParameterValue::Bool(false))
        );
    }

    #[test]
    fn single_effect_uses_plain_parameter_ids() {
        let effect = build_effect(
            &PresetConfig::default(),
            None,
            &["gradient_overlay".to_string()],
            &[("color2".to_string(), "#000000".to_string())],
            None,
        )
        .unwrap();
        assert_eq!(
            effect.typed_parameter_value("color2"),
            Some(ParameterValue::Color(0xFF00_0000))
        );
    }

    #[test]
    fn rejects_bad_requests() {
        let config = PresetConfig::default();
        assert!(build_effect(&config, None, &[], &[], None).is_err());
        assert!(build_effect(&config, Some("missing"), &[], &[], None).is_err());
        assert!(build_effect(&config, None, &["bloom".to_string()], &[], None).is_err());

        let blur = ["blur".to_string()];
        let unknown = [("size".to_string(), "3".to_string())];
        assert!(build_effect(&config, None, &blur, &unknown, None).is_err());
        let mistyped = [("radius".to_string(), "#ffffff".to_string())];
        assert!(build_effect(&config, None, &blur, &mistyped, None).is_err());
        assert!(build_effect(&config, None, &blur, &[], Some(-1.0)).is_err());
    }
}
