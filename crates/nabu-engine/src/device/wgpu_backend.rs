use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::registry::WindowId;
use crate::render::{Acquired, BackendError, RenderBackend, SceneFrame};
use crate::resource::{MeshDesc, TextureDesc, TextureFormat};
use crate::window::Extent;

use super::GpuInit;
use super::mesh_pipeline::{MeshPipeline, MeshVertex};
use super::surface::{choose_alpha_mode, choose_surface_format, configure, recover};

/// Uploaded texture plus the bind group the mesh pipeline samples it through.
pub struct WgpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub(crate) bind_group: wgpu::BindGroup,
}

pub struct WgpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    /// `None` for non-indexed meshes.
    pub index_buffer: Option<wgpu::Buffer>,
    pub vertex_count: u32,
    pub index_count: u32,
}

/// Window surface.
///
/// Holds its own reference to the window; `surface` is declared first so it
/// is dropped before the window it presents to.
pub struct WgpuSurface {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    size: Extent,
    window: Arc<Window>,
}

impl WgpuSurface {
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> Extent {
        self.size
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

/// One acquired swapchain image. Must be presented promptly; holding it
/// blocks the next acquire.
pub struct WgpuFrame {
    pub(crate) surface_texture: wgpu::SurfaceTexture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) encoder: wgpu::CommandEncoder,
    pub(crate) format: wgpu::TextureFormat,
}

/// `RenderBackend` over wgpu.
///
/// The adapter is chosen without a surface (the backend is created before
/// any window reaches the render thread); each new surface is checked
/// against it instead.
pub struct WgpuBackend {
    init: GpuInit,
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    meshes: MeshPipeline,
}

impl WgpuBackend {
    /// Blocks on adapter and device acquisition.
    pub fn new(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new_async(init))
    }

    pub async fn new_async(init: GpuInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("nabu device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        log::info!("wgpu adapter: {:?}", adapter.get_info());

        let meshes = MeshPipeline::new(&device, &queue);

        Ok(Self {
            init,
            instance,
            adapter,
            device,
            queue,
            meshes,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

fn texture_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Rgba8Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::R8Unorm => wgpu::TextureFormat::R8Unorm,
    }
}

impl RenderBackend for WgpuBackend {
    type Texture = WgpuTexture;
    type Mesh = WgpuMesh;
    type Surface = WgpuSurface;
    type Frame = WgpuFrame;
    type WindowTarget = Arc<Window>;

    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<WgpuTexture, BackendError> {
        desc.check(pixels)?;

        let limit = self.device.limits().max_texture_dimension_2d;
        if desc.width > limit || desc.height > limit {
            return Err(BackendError::invalid("texture", format!(
                "{}: {}x{} exceeds device limit {limit}",
                desc.label, desc.width, desc.height
            )));
        }

        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&desc.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(desc.format),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: desc.bytes_per_row(),
                rows_per_image: Some(desc.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.meshes.texture_bind_group(&self.device, &view, &desc.label);

        Ok(WgpuTexture {
            texture,
            view,
            bind_group,
        })
    }

    fn create_mesh(&mut self, desc: &MeshDesc, vertices: &[u8], indices: &[u32]) -> Result<WgpuMesh, BackendError> {
        desc.check(vertices, indices)?;

        if desc.vertex_stride != MeshVertex::STRIDE {
            return Err(BackendError::invalid("mesh", format!(
                "{}: vertex stride {} does not match MeshVertex ({})",
                desc.label,
                desc.vertex_stride,
                MeshVertex::STRIDE
            )));
        }

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&desc.label),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = (!indices.is_empty()).then(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&desc.label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        Ok(WgpuMesh {
            vertex_buffer,
            index_buffer,
            vertex_count: desc.vertex_count,
            index_count: desc.index_count,
        })
    }

    fn create_surface(&mut self, window: WindowId, target: Arc<Window>, size: Extent) -> Result<WgpuSurface, BackendError> {
        let surface_err = |reason: String| BackendError::Surface { window, reason };

        let surface = self
            .instance
            .create_surface(Arc::clone(&target))
            .map_err(|e| surface_err(e.to_string()))?;

        if !self.adapter.is_surface_supported(&surface) {
            return Err(surface_err("adapter cannot present to this surface".to_owned()));
        }

        let caps = surface.get_capabilities(&self.adapter);
        let format = choose_surface_format(&caps, self.init.prefer_srgb)
            .ok_or_else(|| surface_err("no supported surface formats".to_owned()))?;

        let mut config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: self.init.present_mode,
            alpha_mode: choose_alpha_mode(&caps, self.init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: self.init.desired_maximum_frame_latency,
        };
        configure(&surface, &self.device, &mut config, size);

        log::info!("{window}: surface {format:?} {size}");

        Ok(WgpuSurface {
            surface,
            config,
            size,
            window: target,
        })
    }

    fn resize_surface(&mut self, surface: &mut WgpuSurface, size: Extent) {
        surface.size = size;
        configure(&surface.surface, &self.device, &mut surface.config, size);
    }

    fn reconfigure_surface(&mut self, surface: &mut WgpuSurface) {
        configure(&surface.surface, &self.device, &mut surface.config, surface.size);
    }

    fn acquire_frame(&mut self, surface: &mut WgpuSurface) -> Result<Acquired<WgpuFrame>, BackendError> {
        if surface.size.is_zero() {
            return Ok(Acquired::Skipped);
        }

        let surface_texture = match surface.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                return recover(&surface.surface, &self.device, &mut surface.config, surface.size, e)
                    .map_err(|e| BackendError::Fatal(e.to_string()));
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("nabu frame encoder"),
            });

        Ok(Acquired::Frame(WgpuFrame {
            surface_texture,
            view,
            encoder,
            format: surface.config.format,
        }))
    }

    fn encode_frame(&mut self, frame: &mut WgpuFrame, scene: &SceneFrame<'_, Self>) {
        self.meshes.encode(&self.device, frame, scene);
    }

    fn present_frame(&mut self, _surface: &mut WgpuSurface, frame: WgpuFrame) {
        let WgpuFrame {
            surface_texture,
            view,
            encoder,
            ..
        } = frame;

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }
}
