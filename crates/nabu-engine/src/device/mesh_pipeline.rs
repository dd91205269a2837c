use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::SceneFrame;
use crate::scene::IDENTITY;

use super::wgpu_backend::{WgpuBackend, WgpuFrame};

// ── vertex layout ─────────────────────────────────────────────────────────

/// Vertex layout drawn by the built-in mesh pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub const STRIDE: u32 = std::mem::size_of::<MeshVertex>() as u32;

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DrawUniform {
    mvp: [[f32; 4]; 4],
}

const UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniform>() as u64;

// ── pipeline ──────────────────────────────────────────────────────────────

/// Textured-mesh pipeline: one uniform slot per draw (dynamic offset), one
/// bind group per texture.
///
/// Layouts are fixed at device creation so textures can build their bind
/// group at upload time; the pipeline itself is built per surface format.
pub(crate) struct MeshPipeline {
    draw_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    sampler: wgpu::Sampler,
    white: wgpu::BindGroup,
    uniform_stride: u64,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
}

impl MeshPipeline {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("nabu mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nabu mesh draw bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nabu mesh texture bgl"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nabu mesh pipeline layout"),
            bind_group_layouts: &[&draw_layout, &texture_layout],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("nabu mesh sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let align = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = UNIFORM_SIZE.div_ceil(align) * align;

        // Untextured draws sample a 1x1 white texel.
        let white_view = upload_white(device, queue).create_view(&wgpu::TextureViewDescriptor::default());
        let white = bind_texture(device, &texture_layout, &sampler, &white_view, "nabu white");

        Self {
            draw_layout,
            texture_layout,
            pipeline_layout,
            shader,
            sampler,
            white,
            uniform_stride,
            pipeline_format: None,
            pipeline: None,
        }
    }

    /// Bind group for a texture uploaded through the backend.
    pub(crate) fn texture_bind_group(
        &self,
        device: &wgpu::Device,
        view: &wgpu::TextureView,
        label: &str,
    ) -> wgpu::BindGroup {
        bind_texture(device, &self.texture_layout, &self.sampler, view, label)
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        if self.pipeline_format == Some(format) && self.pipeline.is_some() {
            return;
        }

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("nabu mesh pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
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
            multiview_mask: None,
            cache: None,
        });

        log::debug!("mesh pipeline built for {format:?}");
        self.pipeline_format = Some(format);
        self.pipeline = Some(pipeline);
    }

    /// Clears the frame and draws every resolved mesh into it.
    pub(crate) fn encode(&mut self, device: &wgpu::Device, frame: &mut WgpuFrame, scene: &SceneFrame<'_, WgpuBackend>) {
        let view_projection = scene.camera.map_or(IDENTITY, |(_, c)| c.view_projection);
        let draws = scene.draws;
        let format = frame.format;
        self.ensure_pipeline(device, format);

        // One stride-aligned uniform slot per draw.
        let draw_bind_group = if draws.is_empty() {
            None
        } else {
            let stride = self.uniform_stride as usize;
            let mut bytes = vec![0u8; stride * draws.len()];
            for (i, draw) in draws.iter().enumerate() {
                let uniform = DrawUniform {
                    mvp: mul(view_projection, draw.transform),
                };
                bytes[i * stride..i * stride + UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&uniform));
            }

            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("nabu draw uniforms"),
                contents: &bytes,
                usage: wgpu::BufferUsages::UNIFORM,
            });

            Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("nabu draw bind group"),
                layout: &self.draw_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(UNIFORM_SIZE),
                    }),
                }],
            }))
        };

        let [r, g, b, a] = scene.clear_color.map(f64::from);
        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("nabu scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let (Some(pipeline), Some(draw_bind_group)) = (self.pipeline.as_ref(), draw_bind_group.as_ref()) else {
            return;
        };

        rpass.set_pipeline(pipeline);
        for (i, draw) in draws.iter().enumerate() {
            let offset = (i as u64 * self.uniform_stride) as u32;
            rpass.set_bind_group(0, draw_bind_group, &[offset]);
            rpass.set_bind_group(1, draw.texture.map_or(&self.white, |t| &t.bind_group), &[]);
            rpass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));

            match &draw.mesh.index_buffer {
                Some(ibo) => {
                    rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..draw.mesh.index_count, 0, 0..1);
                }
                None => rpass.draw(0..draw.mesh.vertex_count, 0..1),
            }
        }
    }
}

// ── helpers ───────────────────────────────────────────────────────────────

/// Column-major `a * b`.
fn mul(a: [[f32; 4]; 4], b: [[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let mut out = [[0.0; 4]; 4];
    for (c, col) in out.iter_mut().enumerate() {
        for (r, cell) in col.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[k][r] * b[c][k]).sum();
        }
    }
    out
}

fn upload_white(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::Texture {
    device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("nabu white texel"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &[255, 255, 255, 255],
    )
}

fn bind_texture(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    view: &wgpu::TextureView,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
