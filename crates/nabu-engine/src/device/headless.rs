use std::sync::Arc;

use parking_lot::Mutex;

use crate::registry::{CameraId, SceneId, WindowId};
use crate::render::{Acquired, BackendError, RenderBackend, SceneFrame};
use crate::resource::{MeshDesc, TextureDesc};
use crate::window::Extent;

/// Texture kept in memory.
#[derive(Debug, Clone)]
pub struct HeadlessTexture {
    pub desc: TextureDesc,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct HeadlessMesh {
    pub desc: MeshDesc,
    pub vertices: Vec<u8>,
    pub indices: Vec<u32>,
}

/// One draw as the backend received it, resolved to resource labels.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedDraw {
    pub mesh: String,
    pub texture: Option<String>,
    pub transform: [[f32; 4]; 4],
}

/// Snapshot of an encoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedFrame {
    pub window: WindowId,
    pub size: Extent,
    pub scene: Option<SceneId>,
    pub camera: Option<CameraId>,
    pub clear_color: [f32; 4],
    pub draws: Vec<PresentedDraw>,
}

/// Surface that records what would have been shown.
#[derive(Debug)]
pub struct HeadlessSurface {
    window: WindowId,
    size: Extent,
    reconfigures: u32,
}

impl HeadlessSurface {
    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn size(&self) -> Extent {
        self.size
    }

    pub fn reconfigures(&self) -> u32 {
        self.reconfigures
    }
}

#[derive(Debug, Default)]
struct ProbeLog {
    textures_created: u64,
    meshes_created: u64,
    surfaces_created: u64,
    frames: Vec<PresentedFrame>,
}

/// Observation point into a `HeadlessBackend` that may live on another
/// thread. Cloned before the backend is moved to the render thread.
#[derive(Debug, Clone, Default)]
pub struct HeadlessProbe {
    log: Arc<Mutex<ProbeLog>>,
}

impl HeadlessProbe {
    pub fn textures_created(&self) -> u64 {
        self.log.lock().textures_created
    }

    pub fn meshes_created(&self) -> u64 {
        self.log.lock().meshes_created
    }

    pub fn surfaces_created(&self) -> u64 {
        self.log.lock().surfaces_created
    }

    pub fn frames_presented(&self) -> usize {
        self.log.lock().frames.len()
    }

    /// Latest presented frame of `window`.
    pub fn last_frame(&self, window: WindowId) -> Option<PresentedFrame> {
        self.log.lock().frames.iter().rev().find(|f| f.window == window).cloned()
    }

    /// Drains the recorded frames.
    pub fn take_frames(&self) -> Vec<PresentedFrame> {
        std::mem::take(&mut self.log.lock().frames)
    }
}

/// Backend without a GPU.
///
/// Validates payloads the way a real backend would, keeps them in memory and
/// records every presented frame. Used by tests and by hosts that only need
/// the command pipeline.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    probe: HeadlessProbe,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> HeadlessProbe {
        self.probe.clone()
    }
}

/// Frame under construction.
#[derive(Debug)]
pub struct HeadlessFrame {
    record: Option<PresentedFrame>,
}

impl RenderBackend for HeadlessBackend {
    type Texture = HeadlessTexture;
    type Mesh = HeadlessMesh;
    type Surface = HeadlessSurface;
    type Frame = HeadlessFrame;
    type WindowTarget = ();

    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<HeadlessTexture, BackendError> {
        desc.check(pixels)?;
        self.probe.log.lock().textures_created += 1;
        Ok(HeadlessTexture {
            desc: desc.clone(),
            pixels: pixels.to_vec(),
        })
    }

    fn create_mesh(&mut self, desc: &MeshDesc, vertices: &[u8], indices: &[u32]) -> Result<HeadlessMesh, BackendError> {
        desc.check(vertices, indices)?;
        self.probe.log.lock().meshes_created += 1;
        Ok(HeadlessMesh {
            desc: desc.clone(),
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        })
    }

    fn create_surface(&mut self, window: WindowId, _target: (), size: Extent) -> Result<HeadlessSurface, BackendError> {
        self.probe.log.lock().surfaces_created += 1;
        Ok(HeadlessSurface {
            window,
            size,
            reconfigures: 0,
        })
    }

    fn resize_surface(&mut self, surface: &mut HeadlessSurface, size: Extent) {
        surface.size = size;
        if !size.is_zero() {
            surface.reconfigures += 1;
        }
    }

    fn reconfigure_surface(&mut self, surface: &mut HeadlessSurface) {
        surface.reconfigures += 1;
    }

    fn acquire_frame(&mut self, surface: &mut HeadlessSurface) -> Result<Acquired<HeadlessFrame>, BackendError> {
        if surface.size.is_zero() {
            return Ok(Acquired::Skipped);
        }
        Ok(Acquired::Frame(HeadlessFrame { record: None }))
    }

    fn encode_frame(&mut self, frame: &mut HeadlessFrame, scene: &SceneFrame<'_, Self>) {
        frame.record = Some(PresentedFrame {
            window: scene.window,
            size: scene.size,
            scene: scene.scene,
            camera: scene.camera.map(|(id, _)| id),
            clear_color: scene.clear_color,
            draws: scene
                .draws
                .iter()
                .map(|d| PresentedDraw {
                    mesh: d.mesh.desc.label.clone(),
                    texture: d.texture.map(|t| t.desc.label.clone()),
                    transform: d.transform,
                })
                .collect(),
        });
    }

    fn present_frame(&mut self, _surface: &mut HeadlessSurface, frame: HeadlessFrame) {
        if let Some(record) = frame.record {
            self.probe.log.lock().frames.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::TextureFormat;

    #[test]
    fn rejects_short_pixel_payload() {
        let mut backend = HeadlessBackend::new();
        let desc = TextureDesc::new("short", 2, 2, TextureFormat::Rgba8Srgb);

        let err = backend.create_texture(&desc, &[0; 15]).unwrap_err();
        assert!(matches!(err, BackendError::Invalid { what: "texture", .. }));
        assert_eq!(backend.probe().textures_created(), 0);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut backend = HeadlessBackend::new();
        let desc = MeshDesc::of::<[f32; 2]>("tri", 3, 3);
        let vertices = [0u8; 24];

        assert!(backend.create_mesh(&desc, &vertices, &[0, 1, 3]).is_err());
        assert!(backend.create_mesh(&desc, &vertices, &[0, 1, 2]).is_ok());
    }

    #[test]
    fn zero_sized_surface_skips_frames() {
        let mut backend = HeadlessBackend::new();
        let mut surface = backend.create_surface(WindowId(1), (), Extent::new(0, 0)).unwrap();

        assert!(matches!(backend.acquire_frame(&mut surface), Ok(Acquired::Skipped)));

        backend.resize_surface(&mut surface, Extent::new(4, 4));
        assert!(matches!(backend.acquire_frame(&mut surface), Ok(Acquired::Frame(_))));
        assert_eq!(surface.reconfigures(), 1);
    }
}
