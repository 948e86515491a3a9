//! In-memory backend for exercising the factory and processor without a GPU.

use std::cell::Cell;
use std::sync::Arc;

use effects::{NativeEffect, ShaderError, ShaderResult, Uniform};
use image::RgbaImage;

use crate::backend::{Backend, OfflineBackend};

/// Any source containing this marker fails to compile.
pub(crate) const BROKEN_SOURCE: &str = "fn effect_main( syntax error";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Stage {
    pub label: String,
    pub uniforms: Vec<Uniform>,
}

impl Stage {
    pub fn native(label: &str) -> Self {
        Self {
            label: label.to_string(),
            uniforms: Vec::new(),
        }
    }
}

/// Records every stage it is asked to build. Programs whose source contains
/// `invert` flip the rgb channels when rendered offline; everything else is
/// drawn as the identity.
pub(crate) struct RecordingBackend {
    supported: bool,
    native: bool,
    compiles: Cell<usize>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            supported: true,
            native: true,
            compiles: Cell::new(0),
        }
    }
}

impl RecordingBackend {
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::default()
        }
    }

    pub fn without_native() -> Self {
        Self {
            native: false,
            ..Self::default()
        }
    }

    pub fn compile_count(&self) -> usize {
        self.compiles.get()
    }
}

impl Backend for RecordingBackend {
    type Program = Arc<str>;
    type Target = Vec<Stage>;

    fn name(&self) -> &'static str {
        "recording"
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn compile(&self, source: &str) -> Result<Self::Program, String> {
        self.compiles.set(self.compiles.get() + 1);
        if source.contains("syntax error") {
            return Err("unexpected token 'error'".to_string());
        }
        Ok(Arc::from(source))
    }

    fn bind(
        &self,
        program: &Self::Program,
        uniforms: &[Uniform],
        _width: f32,
        _height: f32,
    ) -> ShaderResult<Self::Target> {
        Ok(vec![Stage {
            label: program.to_string(),
            uniforms: uniforms.to_vec(),
        }])
    }

    fn create_native(
        &self,
        effect: &NativeEffect,
        _width: f32,
        _height: f32,
    ) -> ShaderResult<Self::Target> {
        match effect {
            NativeEffect::Blur { radius } if self.native => {
                Ok(vec![Stage::native(&format!("blur:{radius}"))])
            }
            _ => Err(ShaderError::unsupported_effect(
                "the recording backend has no native implementation",
                effect.id(),
            )),
        }
    }

    fn chain(&self, mut first: Self::Target, second: Self::Target) -> Self::Target {
        first.extend(second);
        first
    }
}

impl OfflineBackend for RecordingBackend {
    fn render_image(&self, target: &Self::Target, image: &RgbaImage) -> ShaderResult<RgbaImage> {
        let mut output = image.clone();
        for stage in target {
            if stage.label.contains("invert") {
                for pixel in output.pixels_mut() {
                    for channel in &mut pixel.0[..3] {
                        *channel = 255 - *channel;
                    }
                }
            }
        }
        Ok(output)
    }
}
