use crate::context::ProcessContext;
use crate::registry::{CameraId, SceneId, WindowId};
use crate::render::RenderBackend;

use super::{Extent, WindowCmd};

/// Main-thread producer API for window commands.
pub struct WindowCommands<'a, B: RenderBackend> {
    ctx: &'a ProcessContext<B>,
}

impl<'a, B: RenderBackend> WindowCommands<'a, B> {
    pub(crate) fn new(ctx: &'a ProcessContext<B>) -> Self {
        Self { ctx }
    }

    /// Hands `target` to the render thread, which builds the window's surface.
    pub fn create(&self, window: WindowId, target: B::WindowTarget, size: Extent) {
        self.push(WindowCmd::Create { window, target, size });
    }

    pub fn destroy(&self, window: WindowId) {
        self.push(WindowCmd::Destroy { window });
    }

    pub fn resize(&self, window: WindowId, size: Extent) {
        self.push(WindowCmd::Resize { window, size });
    }

    /// Forces a surface reconfigure (display change, format change).
    pub fn surface_outdated(&self, window: WindowId) {
        self.push(WindowCmd::SurfaceOutdated { window });
    }

    /// Presents `scene` through `camera` in `window`. `SceneId::NULL` clears.
    pub fn set_scene(&self, window: WindowId, scene: SceneId, camera: CameraId) {
        self.push(WindowCmd::SetScene { window, scene, camera });
    }

    pub fn clear_scene(&self, window: WindowId) {
        self.set_scene(window, SceneId::NULL, CameraId::NULL);
    }

    fn push(&self, cmd: WindowCmd<B::WindowTarget>) {
        self.ctx.window_list().append(cmd);
    }
}
