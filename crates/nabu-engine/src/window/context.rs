use crate::registry::{CameraId, SceneId};
use crate::render::RenderBackend;

use super::Extent;

/// Which scene (and through which camera) a window presents.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SceneBinding {
    pub scene: SceneId,
    pub camera: CameraId,
}

/// Render-thread state of one window: its surface and scene binding.
pub struct WindowContext<B: RenderBackend> {
    surface: B::Surface,
    size: Extent,
    binding: Option<SceneBinding>,
    frames_presented: u64,
    frames_skipped: u64,
}

impl<B: RenderBackend> WindowContext<B> {
    pub fn new(surface: B::Surface, size: Extent) -> Self {
        Self {
            surface,
            size,
            binding: None,
            frames_presented: 0,
            frames_skipped: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> Extent {
        self.size
    }

    #[inline]
    pub fn surface(&self) -> &B::Surface {
        &self.surface
    }

    #[inline]
    pub fn binding(&self) -> Option<SceneBinding> {
        self.binding
    }

    #[inline]
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    #[inline]
    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    pub fn bind(&mut self, scene: SceneId, camera: CameraId) {
        self.binding = Some(SceneBinding { scene, camera });
    }

    pub fn unbind(&mut self) {
        self.binding = None;
    }

    pub(crate) fn resize(&mut self, backend: &mut B, size: Extent) {
        self.size = size;
        backend.resize_surface(&mut self.surface, size);
    }

    pub(crate) fn reconfigure(&mut self, backend: &mut B) {
        backend.reconfigure_surface(&mut self.surface);
    }

    pub(crate) fn surface_mut(&mut self) -> &mut B::Surface {
        &mut self.surface
    }

    pub(crate) fn record_presented(&mut self) {
        self.frames_presented += 1;
    }

    pub(crate) fn record_skipped(&mut self) {
        self.frames_skipped += 1;
    }
}
