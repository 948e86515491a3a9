use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use renderer::{BackendPreference, ColorSpaceMode};

#[derive(Parser, Debug)]
#[command(
    name = "shaderlab",
    author,
    version,
    about = "Apply shader effects to images"
)]
pub struct Cli {
    /// Preset/factory configuration file (defaults to the user config dir).
    #[arg(long, global = true, value_name = "FILE", env = "SHADERLAB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List built-in effects, their parameters, and configured presets.
    List(ListArgs),
    /// Report which rendering backend this host supports.
    Probe(FactoryArgs),
    /// Apply effects and/or a preset to an image file.
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the catalogue as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct FactoryArgs {
    /// Rendering backend: `auto`, `gpu`, or `none`.
    #[arg(long, value_name = "BACKEND", value_parser = parse_backend)]
    pub backend: Option<BackendPreference>,

    /// Output color space handling: `gamma` or `linear`.
    #[arg(long, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceMode>,

    /// Maximum number of compiled programs kept in memory (0 disables caching).
    #[arg(long, value_name = "N")]
    pub cache_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Image to read (PNG, JPEG, BMP, or GIF).
    #[arg(long, short, value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write the PNG result.
    #[arg(long, short, value_name = "FILE")]
    pub output: PathBuf,

    /// Built-in effect id; repeat to chain effects in order.
    #[arg(long = "effect", short, value_name = "ID")]
    pub effects: Vec<String>,

    /// Named preset from the configuration file, applied before `--effect`s.
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Parameter override; chained effects use `INDEX_ID` (e.g. `1_radius`).
    #[arg(long = "param", value_name = "ID=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Size the effect is evaluated at (defaults to the image size).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Clock time in seconds for animated effects.
    #[arg(long, value_name = "SECONDS")]
    pub time: Option<f32>,

    #[command(flatten)]
    pub factory: FactoryArgs,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_backend(value: &str) -> Result<BackendPreference, String> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(BackendPreference::Auto),
        "gpu" | "wgpu" => Ok(BackendPreference::Gpu),
        "none" | "off" | "cpu" => Ok(BackendPreference::None),
        other => Err(format!(
            "unknown backend '{other}'; expected auto, gpu, or none"
        )),
    }
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected gamma or linear"
        )),
    }
}

pub fn parse_param(value: &str) -> Result<(String, String), String> {
    let (id, raw) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got '{value}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err("parameter id must not be empty".to_string());
    }
    Ok((id.to_string(), raw.trim().to_string()))
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT, e.g. 1920x1080".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height in size specification".to_string())?;
    if width == 0 || height == 0 {
        return Err("size must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_flags() {
        assert_eq!(parse_backend("NONE").unwrap(), BackendPreference::None);
        assert!(parse_backend("metal").is_err());
        assert_eq!(parse_color_space("srgb").unwrap(), ColorSpaceMode::Linear);
        assert_eq!(parse_size("640x480").unwrap(), (640, 480));
        assert!(parse_size("0x480").is_err());
        assert!(parse_size("640").is_err());
        assert_eq!(
            parse_param("1_radius = 0.4").unwrap(),
            ("1_radius".to_string(), "0.4".to_string())
        );
        assert!(parse_param("radius").is_err());
        assert!(parse_param("=1").is_err());
    }

    #[test]
    fn apply_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "shaderlab",
            "apply",
            "-i",
            "in.png",
            "-o",
            "out.png",
            "-e",
            "vignette",
            "--effect",
            "blur",
            "--param",
            "0_radius=0.8",
            "--backend",
            "none",
        ])
        .expect("parse");
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(args.effects, ["vignette", "blur"]);
        assert_eq!(args.params, [("0_radius".to_string(), "0.8".to_string())]);
        assert_eq!(args.factory.backend, Some(BackendPreference::None));
        assert_eq!(args.size, None);
    }
}
