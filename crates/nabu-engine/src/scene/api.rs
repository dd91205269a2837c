use crate::context::ProcessContext;
use crate::registry::{CameraId, SceneId};
use crate::render::RenderBackend;

use super::{Camera, DrawItem, SceneCmd};

/// Main-thread producer API for scene commands.
pub struct SceneCommands<'a, B: RenderBackend> {
    ctx: &'a ProcessContext<B>,
}

impl<'a, B: RenderBackend> SceneCommands<'a, B> {
    pub(crate) fn new(ctx: &'a ProcessContext<B>) -> Self {
        Self { ctx }
    }

    pub fn create(&self, scene: SceneId) {
        self.push(SceneCmd::Create { scene });
    }

    pub fn destroy(&self, scene: SceneId) {
        self.push(SceneCmd::Destroy { scene });
    }

    /// Replaces the scene's draw list for the upcoming frames.
    pub fn submit(&self, scene: SceneId, draws: Vec<DrawItem>) {
        self.push(SceneCmd::Submit { scene, draws });
    }

    pub fn set_camera(&self, scene: SceneId, camera_id: CameraId, camera: Camera) {
        self.push(SceneCmd::SetCamera { scene, camera_id, camera });
    }

    pub fn remove_camera(&self, scene: SceneId, camera_id: CameraId) {
        self.push(SceneCmd::RemoveCamera { scene, camera_id });
    }

    pub fn set_clear_color(&self, scene: SceneId, color: [f32; 4]) {
        self.push(SceneCmd::SetClearColor { scene, color });
    }

    fn push(&self, cmd: SceneCmd) {
        self.ctx.scene_list().append(cmd);
    }
}
