use std::collections::HashMap;

use crate::handle::{MeshHandle, TextureHandle};
use crate::registry::CameraId;

pub const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// One mesh instance in a scene's draw list.
///
/// Carries handles only; they are resolved (and stale ones skipped) when
/// the frame is built.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshHandle,
    /// `TextureHandle::NULL` draws untextured.
    pub texture: TextureHandle,
    pub transform: [[f32; 4]; 4],
}

impl DrawItem {
    pub fn new(mesh: MeshHandle) -> Self {
        Self {
            mesh,
            texture: TextureHandle::NULL,
            transform: IDENTITY,
        }
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = texture;
        self
    }

    pub fn with_transform(mut self, transform: [[f32; 4]; 4]) -> Self {
        self.transform = transform;
        self
    }
}

/// Camera as the render thread sees it: a precomputed view-projection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub view_projection: [[f32; 4]; 4],
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            view_projection: IDENTITY,
        }
    }
}

/// Render-thread state of one scene.
#[derive(Debug)]
pub struct SceneRenderer {
    clear_color: [f32; 4],
    draws: Vec<DrawItem>,
    cameras: HashMap<CameraId, Camera>,
    submissions: u64,
}

impl SceneRenderer {
    pub fn new(clear_color: [f32; 4]) -> Self {
        Self {
            clear_color,
            draws: Vec::new(),
            cameras: HashMap::new(),
            submissions: 0,
        }
    }

    #[inline]
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    #[inline]
    pub fn draws(&self) -> &[DrawItem] {
        &self.draws
    }

    /// Replaces the draw list. Until the next submit, every frame redraws it.
    pub fn submit(&mut self, draws: Vec<DrawItem>) {
        self.draws = draws;
        self.submissions += 1;
    }

    /// Number of draw lists submitted so far.
    #[inline]
    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.get(&id)
    }

    pub fn set_camera(&mut self, id: CameraId, camera: Camera) {
        self.cameras.insert(id, camera);
    }

    pub fn remove_camera(&mut self, id: CameraId) -> Option<Camera> {
        self.cameras.remove(&id)
    }
}
