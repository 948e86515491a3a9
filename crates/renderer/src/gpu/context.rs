use anyhow::{Context as AnyhowContext, Result};

use crate::types::{AdapterProfile, ColorSpaceMode, GpuPowerPreference};

/// Device and queue for off-screen rendering.
pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Format of every texture effects render into.
    pub format: wgpu::TextureFormat,
    pub color_space: ColorSpaceMode,
    pub adapter_profile: AdapterProfile,
}

impl GpuContext {
    pub(crate) fn new(color_space: ColorSpaceMode, gpu_power: GpuPowerPreference) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let power_preference = match gpu_power {
            GpuPowerPreference::Low => wgpu::PowerPreference::LowPower,
            GpuPowerPreference::High => wgpu::PowerPreference::HighPerformance,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();
        let adapter_profile = AdapterProfile::from_wgpu(&adapter_info, &limits);
        tracing::debug!(
            name = %adapter_profile.name,
            backend = %adapter_profile.backend,
            device_type = %adapter_profile.device_type,
            is_software = adapter_profile.is_software(),
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("shaderlab device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(limits),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        let format = match color_space {
            ColorSpaceMode::Gamma => wgpu::TextureFormat::Rgba8Unorm,
            ColorSpaceMode::Linear => wgpu::TextureFormat::Rgba8UnormSrgb,
        };

        Ok(Self {
            _instance: instance,
            device,
            queue,
            format,
            color_space,
            adapter_profile,
        })
    }

    pub(crate) fn max_texture_dimension(&self) -> u32 {
        self.adapter_profile.max_texture_dimension
    }
}
