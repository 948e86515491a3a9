/// Number of compiled programs a factory keeps by default.
pub const DEFAULT_CACHE_SIZE: usize = 50;

/// Which backend the factory should try to bring up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// Use the GPU when an adapter is available, otherwise report the
    /// platform as unsupported.
    #[default]
    Auto,
    /// Require the GPU. A missing adapter is logged as an error and the
    /// unsupported reason says the GPU was explicitly requested.
    Gpu,
    /// Never touch the GPU; every request fails the capability gate.
    None,
}

/// Output color handling for render targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Treat programs and images as gamma-encoded; use non-sRGB textures.
    #[default]
    Gamma,
    /// Render in linear light through sRGB textures. Color uniforms are
    /// converted from sRGB before binding.
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    #[default]
    Low,
    High,
}

/// Factory settings supplied by the host at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryConfig {
    /// Upper bound on cached compiled programs; `0` disables caching.
    pub max_cache_size: usize,
    pub backend: BackendPreference,
    pub color_space: ColorSpaceMode,
    pub power: GpuPowerPreference,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            max_cache_size: DEFAULT_CACHE_SIZE,
            backend: BackendPreference::default(),
            color_space: ColorSpaceMode::default(),
            power: GpuPowerPreference::default(),
        }
    }
}

/// Summary of the adapter a GPU backend runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: String,
    pub device_type: String,
    pub driver: String,
    pub max_texture_dimension: u32,
}

impl AdapterProfile {
    pub(crate) fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: format!("{:?}", info.backend),
            device_type: format!("{:?}", info.device_type),
            driver: if info.driver_info.is_empty() {
                info.driver.clone()
            } else {
                format!("{} ({})", info.driver, info.driver_info)
            },
            max_texture_dimension: limits.max_texture_dimension_2d,
        }
    }

    pub fn is_software(&self) -> bool {
        self.device_type == "Cpu"
    }
}
