use std::borrow::Cow;
use std::sync::Arc;

use crate::compile::{validate_program, UniformSlot, FRAGMENT_ENTRY, VERTEX_ENTRY};

use super::context::GpuContext;

/// Layouts and sampler shared by every program of one backend.
pub(crate) struct SharedLayouts {
    pub content_layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
}

impl SharedLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let content_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("content layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("content sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            content_layout,
            sampler,
        }
    }
}

/// A compiled effect program: the cacheable part of a render effect.
pub struct GpuProgram {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) uniform_layout: wgpu::BindGroupLayout,
    pub(crate) slots: Vec<UniformSlot>,
    pub(crate) source: Arc<str>,
}

impl GpuProgram {
    /// Uniforms the program declares, ordered by binding.
    pub fn uniform_slots(&self) -> &[UniformSlot] {
        &self.slots
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for GpuProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuProgram")
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// Validates, wraps and compiles `source` into a render pipeline targeting
/// the context's texture format.
///
/// wgpu validation errors are captured in an error scope and returned as the
/// compiler message instead of reaching the device's uncaptured handler.
pub(crate) fn create_program(
    gpu: &GpuContext,
    layouts: &SharedLayouts,
    source: &str,
) -> Result<GpuProgram, String> {
    let validated = validate_program(source)?;
    let device = &gpu.device;

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("effect program"),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(validated.wrapped)),
    });

    let uniform_entries: Vec<_> = validated
        .slots
        .iter()
        .map(|slot| wgpu::BindGroupLayoutEntry {
            binding: slot.binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        })
        .collect();
    let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("effect uniform layout"),
        entries: &uniform_entries,
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("effect pipeline layout"),
        bind_group_layouts: &[&layouts.content_layout, &uniform_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("effect pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some(VERTEX_ENTRY),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format: gpu.format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    });

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(err.to_string());
    }

    Ok(GpuProgram {
        pipeline,
        uniform_layout,
        slots: validated.slots,
        source: Arc::from(source),
    })
}
