use anyhow::Result;
use effects::format::format_default;
use effects::{builtin, Effect, ParameterKind};
use presets::PresetConfig;
use renderer::{check_effect_source, create_factory, Backend, FactoryConfig, ShaderFactory};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub kind: &'static str,
    pub parameters: Vec<ParameterEntry>,
}

#[derive(Debug, Serialize)]
pub struct ParameterEntry {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: ParameterKind,
    pub display_default: String,
}

#[derive(Debug, Serialize)]
struct Catalog {
    effects: Vec<CatalogEntry>,
    presets: Vec<String>,
}

pub fn catalogue() -> Vec<CatalogEntry> {
    builtin::all().iter().map(entry).collect()
}

fn entry(effect: &Effect) -> CatalogEntry {
    let kind = match effect {
        Effect::Native(_) => "native",
        Effect::Program(_) => "program",
        Effect::Animated(_) => "animated",
        Effect::Composite(_) => "composite",
    };
    CatalogEntry {
        id: effect.id().into_owned(),
        name: effect.display_name().into_owned(),
        kind,
        parameters: effect
            .parameters()
            .iter()
            .map(|spec| ParameterEntry {
                id: spec.id().to_string(),
                label: spec.label().to_string(),
                kind: *spec.kind(),
                display_default: format_default(spec),
            })
            .collect(),
    }
}

pub fn list(config: &PresetConfig, json: bool) -> Result<()> {
    let effects = catalogue();
    let presets: Vec<String> = config.preset_names().map(str::to_string).collect();

    if json {
        let catalog = Catalog { effects, presets };
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    println!("Effects:");
    for effect in &effects {
        println!("  {:<22} {:<22} {}", effect.id, effect.name, effect.kind);
        for param in &effect.parameters {
            println!(
                "      {:<14} {:<18} default={}",
                param.id, param.label, param.display_default
            );
        }
    }
    if presets.is_empty() {
        println!("No presets configured.");
    } else {
        println!("Presets:");
        for name in presets {
            println!("  {name}");
        }
    }
    Ok(())
}

pub fn probe(config: &FactoryConfig) -> Result<()> {
    let factory = create_factory(config);
    let backend = factory.backend();
    println!("Backend:        {}", backend.name());
    if factory.is_supported() {
        println!("Supported:      yes");
    } else {
        println!("Supported:      no ({})", backend.unsupported_reason());
    }
    if let Some(gpu) = backend.gpu() {
        let profile = gpu.adapter_profile();
        println!("Adapter:        {}", profile.name);
        println!("  api:          {}", profile.backend);
        println!("  device type:  {}", profile.device_type);
        println!("  driver:       {}", profile.driver);
        println!("  max texture:  {}", profile.max_texture_dimension);
        if profile.is_software() {
            println!("  note:         software rasterizer; expect slow rendering");
        }
    }
    println!("Cache size:     {}", config.max_cache_size);
    println!("Color space:    {:?}", config.color_space);

    println!("Built-in programs:");
    for effect in builtin::all() {
        let Some(source) = effect.shader_source() else {
            println!("  {:<22} native", effect.id());
            continue;
        };
        match check_effect_source(source) {
            Ok(slots) => println!("  {:<22} ok ({} uniforms)", effect.id(), slots.len()),
            Err(message) => {
                tracing::warn!(effect = %effect.id(), "built-in program failed validation");
                println!("  {:<22} invalid: {message}", effect.id());
            }
        }
    }
    Ok(())
}
