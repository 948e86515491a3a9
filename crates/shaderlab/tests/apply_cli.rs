use std::fs;
use std::path::Path;
use std::process::Command;

use image::{ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

fn shaderlab(config_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_shaderlab"));
    command
        .env("SHADERLAB_CONFIG_DIR", config_dir)
        .env_remove("SHADERLAB_CONFIG")
        .env("RUST_LOG", "warn");
    command
}

fn write_png(path: &Path) {
    let image = RgbaImage::from_fn(6, 4, |x, y| Rgba([(x * 40) as u8, (y * 60) as u8, 90, 255]));
    image.save_with_format(path, ImageFormat::Png).unwrap();
}

#[test]
fn list_json_contains_every_builtin() {
    let root = TempDir::new().unwrap();
    let output = shaderlab(root.path())
        .args(["list", "--json"])
        .output()
        .expect("failed to run shaderlab list");
    assert!(output.status.success());

    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = catalog["effects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|effect| effect["id"].as_str().unwrap())
        .collect();
    for id in [
        "grayscale",
        "sepia",
        "gradient_overlay",
        "vignette",
        "pixelation",
        "chromatic_aberration",
        "color_inversion",
        "wave_distortion",
        "blur",
    ] {
        assert!(ids.contains(&id), "missing {id}");
    }
    assert_eq!(catalog["presets"], serde_json::json!([]));
}

#[test]
fn list_reports_presets_from_default_config() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("presets.toml"),
        r#"
version = 1

[presets.noir]
steps = [{ effect = "grayscale" }, { effect = "vignette", params = { intensity = 0.9 } }]
"#,
    )
    .unwrap();

    let output = shaderlab(root.path())
        .args(["list", "--json"])
        .output()
        .expect("failed to run shaderlab list");
    assert!(output.status.success());
    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(catalog["presets"], serde_json::json!(["noir"]));
}

#[test]
fn apply_without_backend_copies_the_input() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("in.png");
    let output = root.path().join("out/result.png");
    write_png(&input);

    let status = shaderlab(root.path())
        .args(["apply", "--backend", "none", "--effect", "sepia", "--effect", "blur"])
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .status()
        .expect("failed to run shaderlab apply");

    assert!(status.success());
    assert_eq!(fs::read(&output).unwrap(), fs::read(&input).unwrap());
}

#[test]
fn apply_rejects_unknown_effects_and_parameters() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("in.png");
    write_png(&input);

    let status = shaderlab(root.path())
        .args(["apply", "--backend", "none", "--effect", "bloom"])
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(root.path().join("out.png"))
        .status()
        .unwrap();
    assert!(!status.success());

    let status = shaderlab(root.path())
        .args(["apply", "--backend", "none", "--effect", "blur", "--param", "size=3"])
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(root.path().join("out.png"))
        .status()
        .unwrap();
    assert!(!status.success());
    assert!(!root.path().join("out.png").exists());
}

#[test]
fn invalid_config_is_reported() {
    let root = TempDir::new().unwrap();
    let config = root.path().join("broken.toml");
    fs::write(&config, "version = 3\n").unwrap();

    let output = shaderlab(root.path())
        .arg("--config")
        .arg(&config)
        .arg("list")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported config version"), "{stderr}");
}
