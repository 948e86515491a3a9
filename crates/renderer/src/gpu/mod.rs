//! wgpu backend.
//!
//! ```text
//!   source ──▶ compile::validate_program (naga) ──▶ pipeline::create_program
//!                                                      │ Arc<GpuProgram> (cached)
//!   uniforms ──▶ uniforms::marshal_uniforms ──▶ bind ──┘
//!                                                      ▼
//!                                                RenderTarget::encode
//! ```

mod context;
mod pipeline;
mod readback;
mod target;
mod uniforms;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use effects::{
    run_catching, NativeEffect, ShaderError, ShaderResult, Uniform, MIN_BLUR_RADIUS,
};
use image::RgbaImage;
use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::backend::{Backend, OfflineBackend};
use crate::types::{AdapterProfile, ColorSpaceMode, GpuPowerPreference};

use context::GpuContext;
use pipeline::{create_program, SharedLayouts};
use target::BoundStage;

pub use pipeline::GpuProgram;
pub use target::RenderTarget;

/// Separable Gaussian; run once along x and once along y.
const BLUR_WGSL: &str = r#"
@group(1) @binding(0) var<uniform> direction: vec2<f32>;
@group(1) @binding(1) var<uniform> radius: f32;

fn effect_main(frag_coord: vec2<f32>) -> vec4<f32> {
    let sigma = max(radius, 0.1) * 0.5;
    let taps = i32(ceil(min(radius, 64.0)));
    var total = content_eval(frag_coord);
    var weight_sum = 1.0;
    for (var i = 1; i <= taps; i = i + 1) {
        let offset_px = f32(i);
        let weight = exp(-(offset_px * offset_px) / (2.0 * sigma * sigma));
        total = total + content_eval(frag_coord + direction * offset_px) * weight;
        total = total + content_eval(frag_coord - direction * offset_px) * weight;
        weight_sum = weight_sum + 2.0 * weight;
    }
    return total / weight_sum;
}
"#;

pub(crate) struct GpuShared {
    pub gpu: GpuContext,
    pub layouts: SharedLayouts,
}

/// Renders effects off-screen on the first adapter wgpu offers.
pub struct GpuBackend {
    shared: Arc<GpuShared>,
    blur: Arc<GpuProgram>,
}

impl GpuBackend {
    pub fn new(color_space: ColorSpaceMode, power: GpuPowerPreference) -> Result<Self> {
        let gpu = GpuContext::new(color_space, power)?;
        let layouts = SharedLayouts::new(&gpu.device);
        let blur = create_program(&gpu, &layouts, BLUR_WGSL)
            .map_err(|message| anyhow!("built-in blur program failed to compile: {message}"))?;
        Ok(Self {
            shared: Arc::new(GpuShared { gpu, layouts }),
            blur: Arc::new(blur),
        })
    }

    pub fn adapter_profile(&self) -> &AdapterProfile {
        &self.shared.gpu.adapter_profile
    }

    /// Format of the textures a [`RenderTarget`] reads and writes.
    pub fn texture_format(&self) -> wgpu::TextureFormat {
        self.shared.gpu.format
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.shared.gpu.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.shared.gpu.queue
    }

    fn bind_stage(&self, program: &Arc<GpuProgram>, uniforms: &[Uniform]) -> ShaderResult<BoundStage> {
        let buffers = uniforms::marshal_uniforms(
            &program.slots,
            uniforms,
            self.shared.gpu.color_space,
            &program.source,
        )?;
        let device = &self.shared.gpu.device;
        let buffers: Vec<wgpu::Buffer> = buffers
            .iter()
            .zip(&program.slots)
            .map(|(contents, slot)| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(slot.name.as_str()),
                    contents,
                    usage: wgpu::BufferUsages::UNIFORM,
                })
            })
            .collect();
        let entries: Vec<wgpu::BindGroupEntry> = buffers
            .iter()
            .zip(&program.slots)
            .map(|(buffer, slot)| wgpu::BindGroupEntry {
                binding: slot.binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("effect uniforms"),
            layout: &program.uniform_layout,
            entries: &entries,
        });
        Ok(BoundStage {
            program: Arc::clone(program),
            uniforms: bind_group,
        })
    }

    fn extent(&self, width: f32, height: f32) -> (u32, u32) {
        let limit = self.shared.gpu.max_texture_dimension();
        let clamp = |value: f32| {
            if value.is_finite() {
                (value.round() as u32).clamp(1, limit)
            } else {
                1
            }
        };
        (clamp(width), clamp(height))
    }

    fn render_offline(&self, target: &RenderTarget, image: &RgbaImage) -> Result<RgbaImage> {
        let (width, height) = image.dimensions();
        let limit = self.shared.gpu.max_texture_dimension();
        if width == 0 || height == 0 || width > limit || height > limit {
            anyhow::bail!("image is {width}x{height}; the GPU supports 1..={limit} per side");
        }

        let device = &self.shared.gpu.device;
        let queue = &self.shared.gpu.queue;
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let input = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("offline input"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: self.shared.gpu.format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            image.as_raw(),
        );
        let output = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offline output"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.shared.gpu.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let input_view = input.create_view(&wgpu::TextureViewDescriptor::default());
        let output_view = output.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offline effect encoder"),
        });
        target.encode(&mut encoder, &input_view, &output_view, (width, height));
        queue.submit(Some(encoder.finish()));

        readback::read_rgba(&self.shared.gpu, &output, width, height)
    }
}

impl Backend for GpuBackend {
    type Program = Arc<GpuProgram>;
    type Target = RenderTarget;

    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn compile(&self, source: &str) -> Result<Self::Program, String> {
        let compiled = run_catching(|| create_program(&self.shared.gpu, &self.shared.layouts, source))
            .map_err(|err| err.to_string())??;
        tracing::debug!(uniforms = compiled.slots.len(), "compiled effect program");
        Ok(Arc::new(compiled))
    }

    fn bind(
        &self,
        program: &Self::Program,
        uniforms: &[Uniform],
        width: f32,
        height: f32,
    ) -> ShaderResult<Self::Target> {
        let stage = run_catching(|| self.bind_stage(program, uniforms))??;
        Ok(RenderTarget::new(
            Arc::clone(&self.shared),
            vec![stage],
            self.extent(width, height),
        ))
    }

    fn create_native(
        &self,
        effect: &NativeEffect,
        width: f32,
        height: f32,
    ) -> ShaderResult<Self::Target> {
        match effect {
            NativeEffect::Blur { radius } => {
                let radius = radius.max(MIN_BLUR_RADIUS);
                let horizontal = self.bind_stage(
                    &self.blur,
                    &[
                        Uniform::float("direction", [1.0, 0.0]),
                        Uniform::float("radius", [radius]),
                    ],
                )?;
                let vertical = self.bind_stage(
                    &self.blur,
                    &[
                        Uniform::float("direction", [0.0, 1.0]),
                        Uniform::float("radius", [radius]),
                    ],
                )?;
                Ok(RenderTarget::new(
                    Arc::clone(&self.shared),
                    vec![horizontal, vertical],
                    self.extent(width, height),
                ))
            }
        }
    }

    fn chain(&self, mut first: Self::Target, second: Self::Target) -> Self::Target {
        first.append(second);
        first
    }
}

impl OfflineBackend for GpuBackend {
    fn render_image(&self, target: &RenderTarget, image: &RgbaImage) -> ShaderResult<RgbaImage> {
        run_catching(|| self.render_offline(target, image))?
            .map_err(|err| ShaderError::processing("GPU rendering failed", format!("{err:#}")))
    }
}
