use std::sync::Arc;

use super::pipeline::GpuProgram;
use super::GpuShared;

/// A compiled program with one set of uniforms bound.
pub(crate) struct BoundStage {
    pub program: Arc<GpuProgram>,
    pub uniforms: wgpu::BindGroup,
}

/// A drawable effect: one or more bound stages applied in order.
///
/// Each stage samples the previous stage's output as `content`; the first
/// stage samples the caller's input and the last writes the caller's output.
/// Intermediate results ping-pong between two scratch textures.
pub struct RenderTarget {
    shared: Arc<GpuShared>,
    stages: Vec<BoundStage>,
    size: (u32, u32),
}

impl RenderTarget {
    pub(crate) fn new(shared: Arc<GpuShared>, stages: Vec<BoundStage>, size: (u32, u32)) -> Self {
        Self {
            shared,
            stages,
            size,
        }
    }

    pub(crate) fn append(&mut self, other: RenderTarget) {
        self.stages.extend(other.stages);
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Size the effect's uniforms were built for.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Records every stage into `encoder`.
    ///
    /// `input` must be a sampled texture view and `output` a render
    /// attachment, both in the backend's texture format and sized `extent`.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
        extent: (u32, u32),
    ) {
        let device = &self.shared.gpu.device;
        let scratch: Vec<wgpu::TextureView> = (0..self.stages.len().saturating_sub(1).min(2))
            .map(|index| {
                device
                    .create_texture(&wgpu::TextureDescriptor {
                        label: Some(if index == 0 { "effect scratch a" } else { "effect scratch b" }),
                        size: wgpu::Extent3d {
                            width: extent.0.max(1),
                            height: extent.1.max(1),
                            depth_or_array_layers: 1,
                        },
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format: self.shared.gpu.format,
                        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                            | wgpu::TextureUsages::TEXTURE_BINDING,
                        view_formats: &[],
                    })
                    .create_view(&wgpu::TextureViewDescriptor::default())
            })
            .collect();

        let mut source = input;
        for (index, stage) in self.stages.iter().enumerate() {
            let destination = if index + 1 == self.stages.len() {
                output
            } else {
                &scratch[index % 2]
            };

            let content = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("content bind group"),
                layout: &self.shared.layouts.content_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.shared.layouts.sampler),
                    },
                ],
            });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("effect pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: destination,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&stage.program.pipeline);
            pass.set_bind_group(0, &content, &[]);
            pass.set_bind_group(1, &stage.uniforms, &[]);
            pass.draw(0..3, 0..1);
            drop(pass);

            source = destination;
        }
    }
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("stages", &self.stages.len())
            .field("size", &self.size)
            .finish()
    }
}
