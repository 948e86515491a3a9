use std::sync::Arc;

use effects::{NativeEffect, ShaderError, ShaderResult, Uniform};
use image::RgbaImage;

use crate::backend::{Backend, OfflineBackend};
use crate::factory::EffectFactory;
use crate::gpu::{GpuBackend, GpuProgram, RenderTarget};
use crate::processor::OfflineProcessor;
use crate::types::{BackendPreference, FactoryConfig};

/// The backend chosen for this host.
pub enum PlatformBackend {
    Gpu(GpuBackend),
    /// No usable backend; every request fails the capability gate.
    Unsupported { reason: String },
}

pub type PlatformFactory = EffectFactory<PlatformBackend>;
pub type PlatformProcessor = OfflineProcessor<PlatformBackend>;

impl PlatformBackend {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        PlatformBackend::Unsupported {
            reason: reason.into(),
        }
    }

    pub fn gpu(&self) -> Option<&GpuBackend> {
        match self {
            PlatformBackend::Gpu(gpu) => Some(gpu),
            PlatformBackend::Unsupported { .. } => None,
        }
    }
}

/// Default backend strategy: bring up wgpu unless the config opts out, and
/// fall back to [`PlatformBackend::Unsupported`] when no adapter is found.
pub fn select_backend(config: &FactoryConfig) -> PlatformBackend {
    match config.backend {
        BackendPreference::None => {
            tracing::debug!("GPU backend disabled by configuration");
            PlatformBackend::unsupported("GPU rendering is disabled by configuration")
        }
        preference => match GpuBackend::new(config.color_space, config.power) {
            Ok(gpu) => {
                let profile = gpu.adapter_profile();
                tracing::debug!(
                    adapter = %profile.name,
                    backend = %profile.backend,
                    "using wgpu backend"
                );
                PlatformBackend::Gpu(gpu)
            }
            Err(err) => unavailable(preference, &err),
        },
    }
}

fn unavailable(preference: BackendPreference, err: &anyhow::Error) -> PlatformBackend {
    if preference == BackendPreference::Gpu {
        tracing::error!(error = %format!("{err:#}"), "GPU backend requested but unavailable");
        PlatformBackend::unsupported(format!(
            "GPU backend was requested but no usable adapter was found: {err:#}"
        ))
    } else {
        tracing::debug!(error = %format!("{err:#}"), "no GPU backend available");
        PlatformBackend::unsupported(format!("no usable GPU adapter: {err:#}"))
    }
}

/// Factory for this host using [`select_backend`].
pub fn create_factory(config: &FactoryConfig) -> PlatformFactory {
    EffectFactory::with_selector(config, select_backend)
}

/// Offline processor for this host using [`select_backend`].
pub fn create_image_processor(config: &FactoryConfig) -> PlatformProcessor {
    OfflineProcessor::new(create_factory(config))
}

impl Backend for PlatformBackend {
    type Program = Arc<GpuProgram>;
    type Target = RenderTarget;

    fn name(&self) -> &'static str {
        match self {
            PlatformBackend::Gpu(gpu) => gpu.name(),
            PlatformBackend::Unsupported { .. } => "unsupported",
        }
    }

    fn is_supported(&self) -> bool {
        matches!(self, PlatformBackend::Gpu(_))
    }

    fn unsupported_reason(&self) -> String {
        match self {
            PlatformBackend::Gpu(gpu) => gpu.unsupported_reason(),
            PlatformBackend::Unsupported { reason } => reason.clone(),
        }
    }

    fn compile(&self, source: &str) -> Result<Self::Program, String> {
        match self {
            PlatformBackend::Gpu(gpu) => gpu.compile(source),
            PlatformBackend::Unsupported { reason } => Err(reason.clone()),
        }
    }

    fn bind(
        &self,
        program: &Self::Program,
        uniforms: &[Uniform],
        width: f32,
        height: f32,
    ) -> ShaderResult<Self::Target> {
        match self {
            PlatformBackend::Gpu(gpu) => gpu.bind(program, uniforms, width, height),
            PlatformBackend::Unsupported { reason } => {
                Err(ShaderError::platform_not_supported(reason.clone()))
            }
        }
    }

    fn create_native(
        &self,
        effect: &NativeEffect,
        width: f32,
        height: f32,
    ) -> ShaderResult<Self::Target> {
        match self {
            PlatformBackend::Gpu(gpu) => gpu.create_native(effect, width, height),
            PlatformBackend::Unsupported { reason } => {
                Err(ShaderError::platform_not_supported(reason.clone()))
            }
        }
    }

    fn chain(&self, first: Self::Target, second: Self::Target) -> Self::Target {
        match self {
            PlatformBackend::Gpu(gpu) => gpu.chain(first, second),
            // Targets only come from a GPU backend.
            PlatformBackend::Unsupported { .. } => first,
        }
    }
}

impl OfflineBackend for PlatformBackend {
    fn render_image(&self, target: &RenderTarget, image: &RgbaImage) -> ShaderResult<RgbaImage> {
        match self {
            PlatformBackend::Gpu(gpu) => gpu.render_image(target, image),
            PlatformBackend::Unsupported { reason } => {
                Err(ShaderError::platform_not_supported(reason.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ShaderFactory;
    use effects::builtin;

    #[test]
    fn disabled_backend_fails_every_request_fast() {
        let config = FactoryConfig {
            backend: BackendPreference::None,
            ..FactoryConfig::default()
        };
        let mut factory = create_factory(&config);
        assert!(!factory.is_supported());
        let err = factory
            .create_render_effect(&builtin::grayscale(1.0), 32.0, 32.0)
            .unwrap_err();
        assert_eq!(
            err,
            ShaderError::PlatformNotSupported {
                message: "GPU rendering is disabled by configuration".into()
            }
        );
        assert_eq!(factory.cache_size(), 0);
    }

    #[test]
    fn requested_gpu_reports_missing_adapter_distinctly() {
        let err = anyhow::anyhow!("no adapter");
        let requested = unavailable(BackendPreference::Gpu, &err);
        assert_eq!(
            requested.unsupported_reason(),
            "GPU backend was requested but no usable adapter was found: no adapter"
        );
        let automatic = unavailable(BackendPreference::Auto, &err);
        assert_eq!(automatic.unsupported_reason(), "no usable GPU adapter: no adapter");
    }
}
